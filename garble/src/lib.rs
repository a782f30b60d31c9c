//! Garbled boolean circuits.
//!
//! A [`GarbleOps`] scheme is bound to one [`circuit::Circuit`] and garbles,
//! evaluates and audits it. Schemes are built with [`create_circuit`] or
//! [`build_scheme`]; every secret of a garbling is derived from one seed
//! [`Block`](crypto_core::Block), so an auditor holding the seed or both
//! keys of every input can replay it.

pub mod errors;
pub mod factory;
pub mod gc;
pub mod hash;
pub mod scheme;
pub mod session;
pub mod translate;
pub mod wires;

pub use errors::GarbleError;
pub use factory::{
    build_scheme, create_circuit, create_circuit_from_tag, create_circuit_with, CircuitType, GarbleConfig,
    SchemeKind,
};
pub use gc::{translation_from_bytes, GarbledBundle, GarbledTables, TranslationTable, WireKeyPair};
pub use hash::KeyMode;
pub use scheme::{
    FourToTwoScheme, FreeXorScheme, GarbleOps, HalfGatesScheme, RowReductionScheme, StandardScheme,
};
pub use session::GarblingSession;
pub use translate::{translate, verify_translation_table};
