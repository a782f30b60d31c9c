//! The garbling schemes and the interface they share.

mod four_to_two;
mod free_xor;
mod half_gates;
mod rekey;
mod row_reduction;
mod standard;

pub use four_to_two::FourToTwoScheme;
pub use free_xor::{
    FourRows, FreeXorFamily, FreeXorScheme, GateContext, NonLinearGarbler,
};
pub use half_gates::{HalfGates, HalfGatesScheme};
pub use row_reduction::{RowReductionScheme, ThreeRows};
pub use standard::StandardScheme;

use crate::{
    factory::CircuitType,
    gc::{GarbledBundle, GarbledTables, TranslationTable, WireKeyPair},
    translate::{check_translation_table, translate, verify_translation_table},
    wires::WireStore,
    GarbleError,
};
use circuit::{Circuit, Gate};
use crypto_core::Block;
use tracing::warn;

/// A garbling scheme bound to one circuit.
///
/// Implementations hold no mutable state, so one instance may serve many
/// threads at once; every call allocates its own wire storage.
pub trait GarbleOps: Send + Sync {
    fn circuit(&self) -> &Circuit;

    fn circuit_type(&self) -> CircuitType;

    /// Number of 16-byte rows in the garbled tables.
    fn table_rows(&self) -> usize;

    /// Number of signal-mask bytes after the rows.
    fn mask_bytes(&self) -> usize {
        0
    }

    fn table_size_bytes(&self) -> usize {
        self.table_rows() * Block::LEN + self.mask_bytes()
    }

    /// Garble the circuit with every secret derived from `seed`.
    fn garble(&self, seed: Block) -> Result<GarbledBundle, GarbleError>;

    /// Evaluate the tables on one key per input wire, returning one key per
    /// output wire.
    fn evaluate(&self, tables: &GarbledTables, inputs: &[Block]) -> Result<Vec<Block>, GarbleError>;

    /// Replay the garbling with both keys of every input wire and compare
    /// every row. Returns the output key pairs the tables commit to.
    fn internal_verify(
        &self,
        tables: &GarbledTables,
        inputs: &[WireKeyPair],
    ) -> Result<Vec<WireKeyPair>, GarbleError>;

    /// True if the tables are a correct garbling for `inputs` and `tt`
    /// decodes their outputs.
    fn verify(&self, tables: &GarbledTables, tt: &TranslationTable, inputs: &[WireKeyPair]) -> bool {
        match self.internal_verify(tables, inputs) {
            Ok(outputs) => {
                let ok = verify_translation_table(tt, &outputs);
                if !ok {
                    warn!(circuit_type = %self.circuit_type(), "translation table rejected");
                }
                ok
            }
            Err(e) => {
                warn!(circuit_type = %self.circuit_type(), error = %e, "verification failed");
                false
            }
        }
    }

    /// Like [`GarbleOps::verify`], and also require the tables to commit to
    /// the output pairs the garbler claims.
    fn verify_with_outputs(
        &self,
        tables: &GarbledTables,
        tt: &TranslationTable,
        inputs: &[WireKeyPair],
        claimed_outputs: &[WireKeyPair],
    ) -> Result<(), GarbleError> {
        let outputs = self.internal_verify(tables, inputs).map_err(|e| {
            warn!(circuit_type = %self.circuit_type(), error = %e, "verification failed");
            e
        })?;
        if outputs.len() != claimed_outputs.len() {
            return Err(GarbleError::OutputMismatch {
                output: outputs.len().min(claimed_outputs.len()),
            });
        }
        if let Some(j) = outputs
            .iter()
            .zip(claimed_outputs.iter())
            .position(|(derived, claimed)| derived != claimed)
        {
            warn!(circuit_type = %self.circuit_type(), output = j, "output keys differ from the claimed ones");
            return Err(GarbleError::OutputMismatch { output: j });
        }
        check_translation_table(tt, &outputs)
    }

    /// Decode one output key per output wire.
    fn translate(&self, tt: &TranslationTable, keys: &[Block]) -> Result<Vec<bool>, GarbleError> {
        translate(tt, keys)
    }
}

/// Output bit of each signal row `2·sa + sb`, given the signal bits of the
/// two `key0`s.
#[inline]
pub(crate) fn signal_row_bits(gate: &Gate, a0_signal: bool, b0_signal: bool) -> [bool; 4] {
    std::array::from_fn(|r| {
        let sa = r >> 1 == 1;
        let sb = r & 1 == 1;
        gate.eval(sa ^ a0_signal, sb ^ b0_signal)
    })
}

/// Write an odd-parity truth table as `((a ^ α) & (b ^ β)) ^ γ`.
///
/// The lone row `(a*, b*)` whose output differs from the other three gives
/// `α = !a*` and `β = !b*`; `γ` is the output of the other three rows.
/// Returns `None` for tables with an even number of ones.
pub(crate) fn and_form(truth_table: u8) -> Option<(bool, bool, bool)> {
    let m = odd_row(truth_table)?;
    let gamma = truth_table.count_ones() == 3;
    Some((m >> 1 == 0, m & 1 == 0, gamma))
}

/// The row index `2a + b` whose output differs from the other three.
pub(crate) fn odd_row(truth_table: u8) -> Option<usize> {
    let tt = truth_table & 0xf;
    let bits: [bool; 4] = std::array::from_fn(|r| (tt >> (3 - r)) & 1 == 1);
    match tt.count_ones() {
        1 => bits.iter().position(|b| *b),
        3 => bits.iter().position(|b| !*b),
        _ => None,
    }
}

/// Recover the global offset from audited Free-XOR input pairs.
pub(crate) fn derive_delta(inputs: &[WireKeyPair]) -> Result<Block, GarbleError> {
    let first = inputs
        .first()
        .ok_or(GarbleError::InconsistentInputKeys { input: 0 })?;
    let delta = first.key0 ^ first.key1;
    if !delta.lsb() {
        return Err(GarbleError::InconsistentInputKeys { input: 0 });
    }
    match inputs.iter().position(|p| p.key0 ^ p.key1 != delta) {
        Some(input) => Err(GarbleError::InconsistentInputKeys { input }),
        None => Ok(delta),
    }
}

pub(crate) fn check_input_len<T>(circ: &Circuit, inputs: &[T]) -> Result<(), GarbleError> {
    if inputs.len() != circ.number_of_inputs() {
        return Err(GarbleError::InputLength {
            expected: circ.number_of_inputs(),
            actual: inputs.len(),
        });
    }
    Ok(())
}

pub(crate) fn check_tables(tables: &GarbledTables, rows: usize, masks: usize) -> Result<(), GarbleError> {
    if tables.rows.len() != rows || tables.masks.len() != masks {
        return Err(GarbleError::TableLength {
            expected: rows * Block::LEN + masks,
            actual: tables.size_bytes(),
        });
    }
    Ok(())
}

/// A zeroed buffer of `n` items, or [`GarbleError::AllocationFailure`].
pub(crate) fn alloc<T: Copy>(n: usize, fill: T, wires: usize) -> Result<Vec<T>, GarbleError> {
    let mut v = Vec::new();
    v.try_reserve_exact(n)
        .map_err(|_| GarbleError::AllocationFailure { wires, rows: n })?;
    v.resize(n, fill);
    Ok(v)
}

/// A wire store with the circuit inputs already placed.
pub(crate) fn load_inputs<T: Copy>(circ: &Circuit, inputs: &[T]) -> Result<WireStore<T>, GarbleError> {
    check_input_len(circ, inputs)?;
    let mut wires = WireStore::new(circ.last_wire_index)?;
    for (w, v) in circ.input_indices.iter().zip(inputs.iter()) {
        wires.set(*w, *v)?;
    }
    Ok(wires)
}

pub(crate) fn collect_outputs<T: Copy>(circ: &Circuit, wires: &WireStore<T>) -> Result<Vec<T>, GarbleError> {
    circ.output_indices.iter().map(|w| wires.get(*w)).collect()
}
