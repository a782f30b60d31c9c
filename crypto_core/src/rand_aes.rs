//! AES-based random number generator.

use crate::{aes128::Aes128, Block};
use rand::{CryptoRng, Error, Rng, RngCore, SeedableRng};
use rand_core::block::{BlockRng, BlockRngCore};

/// Random number generator running AES in counter mode from a 128-bit seed.
#[derive(Clone)]
pub struct AesRng(BlockRng<AesRngCore>);

impl RngCore for AesRng {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }
    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }
    #[inline]
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }
    #[inline]
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.0.try_fill_bytes(dest)
    }
}

impl SeedableRng for AesRng {
    type Seed = <AesRngCore as SeedableRng>::Seed;

    #[inline]
    fn from_seed(seed: Self::Seed) -> Self {
        AesRng(BlockRng::<AesRngCore>::from_seed(seed))
    }
    #[inline]
    fn from_rng<R: RngCore>(rng: R) -> Result<Self, Error> {
        BlockRng::<AesRngCore>::from_rng(rng).map(AesRng)
    }
}

impl CryptoRng for AesRng {}

impl AesRng {
    /// Create a new generator seeded from `rand::random`.
    #[inline]
    pub fn new() -> Self {
        let seed = rand::random::<Block>();
        AesRng::from_seed(seed)
    }

    /// Create a new generator seeded from this one.
    #[inline]
    pub fn fork(&mut self) -> Self {
        let seed = self.gen_block();
        AesRng::from_seed(seed)
    }

    #[inline]
    pub fn gen_block(&mut self) -> Block {
        self.gen::<Block>()
    }

    pub fn gen_blocks(&mut self, num: usize) -> Vec<Block> {
        (0..num).map(|_| self.gen_block()).collect()
    }
}

impl Default for AesRng {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// The core of `AesRng`, used with `BlockRng`.
#[derive(Clone)]
pub struct AesRngCore {
    aes: Aes128,
    counter: u128,
}

impl BlockRngCore for AesRngCore {
    type Item = u32;
    type Results = [u32; 32];

    // Eight counter blocks per refill.
    #[inline]
    fn generate(&mut self, results: &mut Self::Results) {
        let mut blocks = [Block::ZERO; 8];
        for b in blocks.iter_mut() {
            *b = Block::from(self.counter);
            self.counter = self.counter.wrapping_add(1);
        }
        let blocks = self.aes.encrypt8(blocks);
        for (words, block) in results.chunks_exact_mut(4).zip(blocks.iter()) {
            for (word, bytes) in words.iter_mut().zip(block.as_ref().chunks_exact(4)) {
                *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            }
        }
    }
}

impl SeedableRng for AesRngCore {
    type Seed = Block;

    #[inline]
    fn from_seed(seed: Self::Seed) -> Self {
        AesRngCore {
            aes: Aes128::new(seed),
            counter: 0,
        }
    }
}

impl CryptoRng for AesRngCore {}

impl From<AesRngCore> for AesRng {
    #[inline]
    fn from(core: AesRngCore) -> Self {
        AesRng(BlockRng::new(core))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate() {
        let mut rng = AesRng::new();
        let a = rng.gen::<[Block; 8]>();
        let b = rng.gen::<[Block; 8]>();
        assert_ne!(a, b);
    }

    #[test]
    fn same_seed_same_stream() {
        let seed = rand::random::<Block>();
        let x = AesRng::from_seed(seed).gen_blocks(10);
        let y = AesRng::from_seed(seed).gen_blocks(10);
        assert_eq!(x, y);

        let z = AesRng::from_seed(seed ^ Block::from(1u128)).gen_blocks(10);
        assert_ne!(x, z);
    }

    #[test]
    fn stream_is_counter_mode() {
        let seed = rand::random::<Block>();
        let mut rng = AesRng::from_seed(seed);
        let aes = Aes128::new(seed);
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        assert_eq!(Block::try_from_slice(&bytes[..16]), Some(aes.encrypt(Block::from(0u128))));
        assert_eq!(Block::try_from_slice(&bytes[16..]), Some(aes.encrypt(Block::from(1u128))));
    }
}
