//! Correlation-robust hash functions based on fixed-key AES.

use crate::{aes128::Aes128, block::Block};
use once_cell::sync::Lazy;

/// The public AES key shared by every fixed-key garbling.
pub const FIXED_KEY: [u8; 16] = [
    0xf3, 0x1d, 0xec, 0x62, 0xa0, 0xcd, 0xaa, 0xae, 0x09, 0x31, 0xe6, 0x5c, 0xea, 0x32, 0x9c, 0x24,
];

pub struct AesHash {
    aes: Aes128,
}

pub static AES_HASH: Lazy<AesHash> = Lazy::new(|| AesHash::new(Block::new(FIXED_KEY)));

impl AesHash {
    /// Initialize the hash function using `key`.
    #[inline]
    pub fn new(key: Block) -> Self {
        AesHash {
            aes: Aes128::new(key),
        }
    }

    /// The raw permutation `π(x)`.
    #[inline]
    pub fn encrypt(&self, x: Block) -> Block {
        self.aes.encrypt(x)
    }

    /// `π` applied to `N` blocks in one batch.
    #[inline]
    pub fn encrypt_many<const N: usize>(&self, x: [Block; N]) -> [Block; N] {
        self.aes.encrypt_many(x)
    }

    /// Correlation-robust hash function for 128-bit inputs (cf.
    /// <https://eprint.iacr.org/2019/074>, §7.2).
    ///
    /// The function computes `π(x) ⊕ x`.
    #[inline]
    pub fn cr_hash(&self, x: Block) -> Block {
        self.aes.encrypt(x) ^ x
    }

    /// Batched [`AesHash::cr_hash`].
    #[inline]
    pub fn cr_hash_many<const N: usize>(&self, x: [Block; N]) -> [Block; N] {
        let mut y = self.aes.encrypt_many(x);
        for (y, x) in y.iter_mut().zip(x.iter()) {
            *y ^= *x;
        }
        y
    }
}
