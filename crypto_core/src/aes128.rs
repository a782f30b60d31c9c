//! AES-128 encryption under an arbitrary key, with batched variants.
//!
//! The batched calls hand all blocks to the cipher at once so that the
//! AES-NI backend can pipeline them. They are semantically identical to
//! encrypting one block at a time.

use crate::Block;
use aes::cipher::{consts::U16, generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes128Enc;

/// Number of blocks encrypted together by [`Aes128::encrypt_blocks`].
pub const AES_BATCH: usize = 8;

/// AES-128, encryption only.
#[derive(Clone)]
pub struct Aes128(Aes128Enc);

impl Aes128 {
    /// Run the key schedule for `key`.
    #[inline]
    pub fn new(key: Block) -> Self {
        let key: [u8; 16] = key.into();
        Aes128(Aes128Enc::new(&GenericArray::from(key)))
    }

    #[inline]
    pub fn encrypt(&self, block: Block) -> Block {
        let mut ctxt = GenericArray::from(block);
        self.0.encrypt_block(&mut ctxt);
        Block::from(ctxt)
    }

    /// Encrypt `N` blocks in one batch.
    #[inline]
    pub fn encrypt_many<const N: usize>(&self, blocks: [Block; N]) -> [Block; N] {
        let mut ctxt = blocks.map(GenericArray::<u8, U16>::from);
        self.0.encrypt_blocks(&mut ctxt);
        ctxt.map(Block::from)
    }

    #[inline]
    pub fn encrypt2(&self, blocks: [Block; 2]) -> [Block; 2] {
        self.encrypt_many(blocks)
    }

    #[inline]
    pub fn encrypt4(&self, blocks: [Block; 4]) -> [Block; 4] {
        self.encrypt_many(blocks)
    }

    #[inline]
    pub fn encrypt8(&self, blocks: [Block; 8]) -> [Block; 8] {
        self.encrypt_many(blocks)
    }

    /// Encrypt a slice of blocks in place, [`AES_BATCH`] blocks at a time.
    pub fn encrypt_blocks(&self, blocks: &mut [Block]) {
        let mut buf = [GenericArray::<u8, U16>::default(); AES_BATCH];
        for chunk in blocks.chunks_mut(AES_BATCH) {
            let buf = &mut buf[..chunk.len()];
            for (b, x) in buf.iter_mut().zip(chunk.iter()) {
                *b = GenericArray::from(*x);
            }
            self.0.encrypt_blocks(buf);
            for (x, b) in chunk.iter_mut().zip(buf.iter()) {
                *x = Block::from(*b);
            }
        }
    }

    /// Encrypt `NM` blocks under each of `NK` keys.
    ///
    /// `blocks[k]` is encrypted under `keys[k]`. This is the shape used when
    /// every wire key is itself an AES key: 4 key schedules and 8
    /// encryptions per garbled gate.
    #[inline]
    pub fn para_encrypt<const NK: usize, const NM: usize>(
        keys: [Block; NK],
        blocks: [[Block; NM]; NK],
    ) -> [[Block; NM]; NK] {
        let mut out = [[Block::ZERO; NM]; NK];
        for ((o, key), blks) in out.iter_mut().zip(keys.iter()).zip(blocks.iter()) {
            *o = Aes128::new(*key).encrypt_many(*blks);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_from_hex(s: &str) -> Block {
        let bytes = hex::decode(s).unwrap();
        Block::try_from_slice(&bytes).unwrap()
    }

    #[test]
    fn aes_known_answer() {
        // FIPS-197, appendix C.1.
        let key = block_from_hex("000102030405060708090a0b0c0d0e0f");
        let pt = block_from_hex("00112233445566778899aabbccddeeff");
        let ct = block_from_hex("69c4e0d86a7b0430d8cdb78070b4c55a");
        assert_eq!(Aes128::new(key).encrypt(pt), ct);
    }

    #[test]
    fn batched_matches_single() {
        let aes = Aes128::new(rand::random::<Block>());
        let blocks = rand::random::<[Block; 8]>();
        let single: Vec<Block> = blocks.iter().map(|b| aes.encrypt(*b)).collect();

        assert_eq!(aes.encrypt8(blocks).to_vec(), single);
        assert_eq!(aes.encrypt4([blocks[0], blocks[1], blocks[2], blocks[3]]).to_vec(), single[..4]);
        assert_eq!(aes.encrypt2([blocks[0], blocks[1]]).to_vec(), single[..2]);

        let mut v: Vec<Block> = (0..19).map(|_| rand::random::<Block>()).collect();
        let expected: Vec<Block> = v.iter().map(|b| aes.encrypt(*b)).collect();
        aes.encrypt_blocks(&mut v);
        assert_eq!(v, expected);
    }

    #[test]
    fn para_encrypt_matches_single() {
        let keys = rand::random::<[Block; 4]>();
        let blocks = rand::random::<[[Block; 2]; 4]>();
        let out = Aes128::para_encrypt(keys, blocks);
        for k in 0..4 {
            let aes = Aes128::new(keys[k]);
            assert_eq!(out[k][0], aes.encrypt(blocks[k][0]));
            assert_eq!(out[k][1], aes.encrypt(blocks[k][1]));
        }
    }
}
