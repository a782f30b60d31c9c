//! Garbled tables, key pairs and the bundle produced by one garbling.

use crate::GarbleError;
use crypto_core::{
    utils::{pack_bits, unpack_bits},
    Block,
};
use serde::{Deserialize, Serialize};

/// The two keys of a wire. `key0` encodes `0`, `key1` encodes `1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireKeyPair {
    pub key0: Block,
    pub key1: Block,
}

impl WireKeyPair {
    #[inline]
    pub fn new(key0: Block, key1: Block) -> Self {
        Self { key0, key1 }
    }

    /// A Free-XOR pair: `key1 = key0 ^ delta`.
    #[inline]
    pub fn from_delta(key0: Block, delta: Block) -> Self {
        Self {
            key0,
            key1: key0 ^ delta,
        }
    }

    /// The key encoding `bit`.
    #[inline]
    pub fn key(&self, bit: bool) -> Block {
        if bit {
            self.key1
        } else {
            self.key0
        }
    }

    /// Exchange the meaning of the two keys.
    #[inline]
    pub fn swap(self) -> Self {
        Self {
            key0: self.key1,
            key1: self.key0,
        }
    }

    /// The keys ordered by signal bit: `[0]` has LSB 0, `[1]` has LSB 1.
    #[inline]
    pub fn by_signal(&self) -> [Block; 2] {
        if self.key0.lsb() {
            [self.key1, self.key0]
        } else {
            [self.key0, self.key1]
        }
    }

    /// True if the two signal bits differ.
    #[inline]
    pub fn is_permuted(&self) -> bool {
        self.key0.lsb() != self.key1.lsb()
    }
}

/// Maps each output key's signal bit to its plaintext value.
pub type TranslationTable = Vec<bool>;

/// The garbled tables of a circuit, in gate order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarbledTables {
    /// Ciphertext rows.
    pub rows: Vec<Block>,
    /// Signal masks, one byte per gate for schemes that need them.
    pub masks: Vec<u8>,
}

impl GarbledTables {
    pub fn new(rows: Vec<Block>, masks: Vec<u8>) -> Self {
        Self { rows, masks }
    }

    /// Size of the serialized tables in bytes.
    pub fn size_bytes(&self) -> usize {
        self.rows.len() * Block::LEN + self.masks.len()
    }

    /// Serialize as all rows followed by all mask bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.size_bytes());
        for row in self.rows.iter() {
            bytes.extend_from_slice(row.as_ref());
        }
        bytes.extend_from_slice(&self.masks);
        bytes
    }

    /// Inverse of [`GarbledTables::to_bytes`] for a scheme with `nrows` rows
    /// and `nmasks` mask bytes.
    pub fn from_bytes(bytes: &[u8], nrows: usize, nmasks: usize) -> Result<Self, GarbleError> {
        let row_bytes = nrows.checked_mul(Block::LEN);
        let expected = row_bytes
            .and_then(|n| n.checked_add(nmasks))
            .unwrap_or(usize::MAX);
        let row_bytes = match row_bytes {
            Some(n) if bytes.len() == expected => n,
            _ => {
                return Err(GarbleError::TableLength {
                    expected,
                    actual: bytes.len(),
                })
            }
        };
        let (rows, masks) = bytes.split_at(row_bytes);
        let rows = rows
            .chunks_exact(Block::LEN)
            .filter_map(Block::try_from_slice)
            .collect();
        Ok(Self {
            rows,
            masks: masks.to_vec(),
        })
    }
}

/// Everything one call to `garble` produces.
///
/// The tables go to the evaluator; the key pairs stay with the garbler and
/// feed oblivious transfer; the translation table goes to whoever decodes
/// the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarbledBundle {
    pub tables: GarbledTables,
    /// Both keys of every input wire, in input order.
    pub input_keys: Vec<WireKeyPair>,
    /// Both keys of every output wire, in output order.
    pub output_keys: Vec<WireKeyPair>,
    pub translation_table: TranslationTable,
}

impl GarbledBundle {
    /// Select one key per input wire for the plaintext `inputs`.
    pub fn encode(&self, inputs: &[bool]) -> Result<Vec<Block>, GarbleError> {
        if inputs.len() != self.input_keys.len() {
            return Err(GarbleError::InputLength {
                expected: self.input_keys.len(),
                actual: inputs.len(),
            });
        }
        Ok(self
            .input_keys
            .iter()
            .zip(inputs.iter())
            .map(|(pair, bit)| pair.key(*bit))
            .collect())
    }

    /// The translation table packed 8 entries per byte.
    pub fn translation_bytes(&self) -> Vec<u8> {
        pack_bits(&self.translation_table)
    }
}

/// Inverse of [`GarbledBundle::translation_bytes`].
pub fn translation_from_bytes(bytes: &[u8], noutputs: usize) -> TranslationTable {
    unpack_bits(bytes, noutputs)
}
