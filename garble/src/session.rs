//! Per-call derivation of every secret a garbling needs from one seed.

use crate::gc::WireKeyPair;
use crypto_core::{Aes128, Block};

/// Domains keep the derived values of different roles apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
enum Domain {
    Delta = 0,
    Input = 1,
    Gate = 2,
    Signal = 3,
}

#[inline]
fn label(domain: Domain, index: usize) -> Block {
    Block::from(index as u128 | (domain as u128) << 120)
}

/// Holds the seed cipher and the global offset of one garbling.
///
/// Everything is a pure function of the seed: garbling twice with the same
/// seed gives byte-identical tables and keys, which is what lets an auditor
/// regenerate a circuit from a revealed seed.
#[derive(Clone)]
pub struct GarblingSession {
    aes: Aes128,
    delta: Block,
}

impl GarblingSession {
    pub fn new(seed: Block) -> Self {
        let aes = Aes128::new(seed);
        let delta = aes
            .encrypt(aes.encrypt(label(Domain::Delta, 0)))
            .with_lsb(true);
        GarblingSession { aes, delta }
    }

    /// The global Free-XOR offset. Its LSB is always 1.
    #[inline]
    pub fn delta(&self) -> Block {
        self.delta
    }

    #[inline]
    fn derive(&self, domain: Domain, index: usize) -> Block {
        self.aes.encrypt(label(domain, index))
    }

    #[inline]
    fn independent_pair(&self, domain: Domain, index: usize) -> WireKeyPair {
        let [key0, key1] = self
            .aes
            .encrypt2([label(domain, 2 * index), label(domain, 2 * index + 1)]);
        WireKeyPair::new(key0, key1.with_lsb(!key0.lsb()))
    }

    /// `key0` of input wire `i` under Free-XOR.
    #[inline]
    pub fn input_key(&self, i: usize) -> Block {
        self.derive(Domain::Input, 2 * i)
    }

    /// Independent keys of input wire `i`, with opposite signal bits.
    #[inline]
    pub fn input_pair(&self, i: usize) -> WireKeyPair {
        self.independent_pair(Domain::Input, i)
    }

    /// `key0` of all `n` input wires under Free-XOR, paired with `delta`.
    pub fn free_xor_input_pairs(&self, n: usize) -> Vec<WireKeyPair> {
        let mut keys: Vec<Block> = (0..n).map(|i| label(Domain::Input, 2 * i)).collect();
        self.aes.encrypt_blocks(&mut keys);
        keys.into_iter()
            .map(|k| WireKeyPair::from_delta(k, self.delta))
            .collect()
    }

    /// Independent pairs of all `n` input wires.
    pub fn input_pairs(&self, n: usize) -> Vec<WireKeyPair> {
        let mut keys: Vec<Block> = (0..2 * n).map(|i| label(Domain::Input, i)).collect();
        self.aes.encrypt_blocks(&mut keys);
        keys.chunks_exact(2)
            .map(|k| WireKeyPair::new(k[0], k[1].with_lsb(!k[0].lsb())))
            .collect()
    }

    /// `key0` of the output of gate `i` under Free-XOR.
    #[inline]
    pub fn gate_key(&self, i: usize) -> Block {
        self.derive(Domain::Gate, 2 * i)
    }

    /// Independent keys of the output of gate `i`.
    #[inline]
    pub fn gate_pair(&self, i: usize) -> WireKeyPair {
        self.independent_pair(Domain::Gate, i)
    }

    /// Random signal bit of `key0` on the output of gate `i`.
    #[inline]
    pub fn signal_bit(&self, i: usize) -> bool {
        self.derive(Domain::Signal, i).lsb()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_per_seed() {
        let seed = rand::random::<Block>();
        let s1 = GarblingSession::new(seed);
        let s2 = GarblingSession::new(seed);
        assert_eq!(s1.delta(), s2.delta());
        assert_eq!(s1.input_pair(3), s2.input_pair(3));
        assert_eq!(s1.gate_key(9), s2.gate_key(9));

        let other = GarblingSession::new(rand::random::<Block>());
        assert_ne!(s1.delta(), other.delta());
    }

    #[test]
    fn delta_and_pairs() {
        let s = GarblingSession::new(rand::random::<Block>());
        assert!(s.delta().lsb());
        for i in 0..10 {
            assert!(s.input_pair(i).is_permuted());
            assert!(s.gate_pair(i).is_permuted());
        }
    }

    #[test]
    fn batched_inputs_match_single() {
        let s = GarblingSession::new(rand::random::<Block>());
        let pairs = s.input_pairs(11);
        let fx = s.free_xor_input_pairs(11);
        for i in 0..11 {
            assert_eq!(pairs[i], s.input_pair(i));
            assert_eq!(fx[i].key0, s.input_key(i));
            assert_eq!(fx[i].key0 ^ fx[i].key1, s.delta());
        }
    }

    #[test]
    fn domains_are_separate() {
        let s = GarblingSession::new(Block::ZERO);
        assert_ne!(s.input_key(0), s.gate_key(0));
        assert_ne!(s.input_pair(0), s.gate_pair(0));
    }
}
