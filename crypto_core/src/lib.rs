pub mod aes128;
pub mod block;
pub mod hash_aes;
pub mod rand_aes;
pub mod utils;

pub use crate::{
    aes128::Aes128,
    block::Block,
    hash_aes::{AesHash, AES_HASH},
    rand_aes::AesRng,
};
