//! Decoding output keys to plaintext bits.

use crate::{
    gc::{TranslationTable, WireKeyPair},
    GarbleError,
};
use crypto_core::Block;

/// The translation table of the given output pairs: the signal bit of each `key0`.
pub fn translation_table(outputs: &[WireKeyPair]) -> TranslationTable {
    outputs.iter().map(|pair| pair.key0.lsb()).collect()
}

/// Decode one output key per wire: `signal(keys[i]) ^ tt[i]`.
pub fn translate(tt: &[bool], keys: &[Block]) -> Result<Vec<bool>, GarbleError> {
    if tt.len() != keys.len() {
        return Err(GarbleError::InputLength {
            expected: tt.len(),
            actual: keys.len(),
        });
    }
    Ok(keys
        .iter()
        .zip(tt.iter())
        .map(|(key, t)| key.lsb() ^ t)
        .collect())
}

/// Check that every `key0` decodes to `false` and every `key1` to `true`.
pub fn check_translation_table(tt: &[bool], outputs: &[WireKeyPair]) -> Result<(), GarbleError> {
    if tt.len() != outputs.len() {
        return Err(GarbleError::TranslationMismatch {
            output: tt.len().min(outputs.len()),
        });
    }
    for (i, (pair, t)) in outputs.iter().zip(tt.iter()).enumerate() {
        if pair.key0.lsb() != *t || pair.key1.lsb() == *t {
            return Err(GarbleError::TranslationMismatch { output: i });
        }
    }
    Ok(())
}

pub fn verify_translation_table(tt: &[bool], outputs: &[WireKeyPair]) -> bool {
    check_translation_table(tt, outputs).is_ok()
}
