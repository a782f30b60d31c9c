//! Output rekeying for the Free-XOR family.
//!
//! Each output wire passes through an identity gate that maps its Free-XOR
//! pair onto an independent pair, so handing out both output keys does not
//! reveal `delta`. Output `j` of `m` uses pad tweak `2·numberOfGates + j` and
//! two rows, indexed by the signal bit of the incoming key. The fresh key of
//! value `v` is `H(K_v, 2·numberOfGates + m + j)`, with the LSB of the second
//! key forced opposite to the first, so an auditor holding the incoming pair
//! can rebuild both rows.

use crate::{
    gc::WireKeyPair,
    hash::{half_pad, half_pads, KeyMode},
    GarbleError,
};
use crypto_core::Block;

/// Rows used to rekey `outputs` wires.
pub(crate) fn rows(outputs: usize) -> Option<usize> {
    outputs.checked_mul(2)
}

#[inline]
fn tweak(number_of_gates: usize, j: usize) -> usize {
    2 * number_of_gates + j
}

/// The fresh pair of output `j` and its two rows.
fn rekey_output(
    mode: KeyMode,
    number_of_gates: usize,
    noutputs: usize,
    j: usize,
    pair: &WireKeyPair,
) -> (WireKeyPair, [Block; 2]) {
    let t = tweak(number_of_gates, j);
    let t_fresh = tweak(number_of_gates, noutputs + j);
    let [s0, s1] = pair.by_signal();
    let [o0, o1, p0, p1] = half_pads(mode, [pair.key0, pair.key1, s0, s1], [t_fresh, t_fresh, t, t]);
    let fresh = WireKeyPair::new(o0, o1.with_lsb(!o0.lsb()));
    // key with signal bit s carries value s ^ signal(key0)
    let sig0 = pair.key0.lsb();
    let row = [p0 ^ fresh.key(sig0), p1 ^ fresh.key(!sig0)];
    (fresh, row)
}

pub(crate) fn garble(
    mode: KeyMode,
    number_of_gates: usize,
    outputs: &[WireKeyPair],
    rows: &mut [Block],
) -> Vec<WireKeyPair> {
    outputs
        .iter()
        .zip(rows.chunks_exact_mut(2))
        .enumerate()
        .map(|(j, (pair, row))| {
            let (fresh, table) = rekey_output(mode, number_of_gates, outputs.len(), j, pair);
            row.copy_from_slice(&table);
            fresh
        })
        .collect()
}

pub(crate) fn evaluate(mode: KeyMode, number_of_gates: usize, keys: &[Block], rows: &[Block]) -> Vec<Block> {
    keys.iter()
        .zip(rows.chunks_exact(2))
        .enumerate()
        .map(|(j, (key, row))| half_pad(mode, *key, tweak(number_of_gates, j)) ^ row[key.lsb() as usize])
        .collect()
}

/// Rebuild the rows from the incoming pairs and compare them.
pub(crate) fn verify(
    mode: KeyMode,
    number_of_gates: usize,
    outputs: &[WireKeyPair],
    rows: &[Block],
) -> Result<Vec<WireKeyPair>, GarbleError> {
    outputs
        .iter()
        .zip(rows.chunks_exact(2))
        .enumerate()
        .map(|(j, (pair, row))| {
            let (fresh, expected) = rekey_output(mode, number_of_gates, outputs.len(), j, pair);
            if let Some(r) = (0..2).find(|r| row[*r] != expected[*r]) {
                return Err(GarbleError::VerificationMismatch {
                    gate: number_of_gates + j,
                    row: r,
                });
            }
            Ok(fresh)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::{FreeXorScheme, GarbleOps, HalfGatesScheme, RowReductionScheme};
    use circuit::Circuit;

    fn adder4() -> Circuit {
        Circuit::load("../circuit/circuit_files/scapi/adder4.txt").unwrap()
    }

    #[test]
    fn rekeyed_outputs_are_independent() {
        let circ = adder4();
        let scheme = HalfGatesScheme::new(circ.clone(), KeyMode::FixedKey, true).unwrap();
        let plain = HalfGatesScheme::new(circ.clone(), KeyMode::FixedKey, false).unwrap();
        assert_eq!(scheme.table_rows(), plain.table_rows() + 2 * circ.number_of_outputs());

        let gc = scheme.garble(Block::from(5u128)).unwrap();
        let delta = gc.input_keys[0].key0 ^ gc.input_keys[0].key1;
        for pair in gc.output_keys.iter() {
            assert!(pair.is_permuted());
            assert_ne!(pair.key0 ^ pair.key1, delta);
        }
        let offsets: Vec<Block> = gc.output_keys.iter().map(|p| p.key0 ^ p.key1).collect();
        assert_ne!(offsets[0], offsets[1]);

        let inputs: Vec<bool> = (0..8).map(|i| i % 3 == 0).collect();
        let out = scheme.evaluate(&gc.tables, &gc.encode(&inputs).unwrap()).unwrap();
        assert_eq!(
            scheme.translate(&gc.translation_table, &out).unwrap(),
            circ.eval(&inputs).unwrap()
        );
        assert_eq!(
            scheme.internal_verify(&gc.tables, &gc.input_keys).unwrap(),
            gc.output_keys
        );
    }

    #[test]
    fn every_family_member_rekeys() {
        let circ = adder4();
        for mode in [KeyMode::FixedKey, KeyMode::NoFixedKey] {
            let schemes: Vec<Box<dyn GarbleOps>> = vec![
                Box::new(FreeXorScheme::new(circ.clone(), mode, true).unwrap()),
                Box::new(HalfGatesScheme::new(circ.clone(), mode, true).unwrap()),
            ];
            for scheme in schemes {
                let gc = scheme.garble(rand::random::<Block>()).unwrap();
                let inputs = vec![true; 8];
                let out = scheme.evaluate(&gc.tables, &gc.encode(&inputs).unwrap()).unwrap();
                assert_eq!(
                    scheme.translate(&gc.translation_table, &out).unwrap(),
                    circ.eval(&inputs).unwrap()
                );
                assert!(scheme.verify(&gc.tables, &gc.translation_table, &gc.input_keys));
            }
        }
        let rr = RowReductionScheme::new(circ, KeyMode::FixedKey, true).unwrap();
        let gc = rr.garble(Block::ONES).unwrap();
        assert!(rr
            .verify_with_outputs(&gc.tables, &gc.translation_table, &gc.input_keys, &gc.output_keys)
            .is_ok());
    }

    #[test]
    fn tampered_rekey_rows_are_caught() {
        let circ = adder4();
        let gates = circ.number_of_gates();
        let outputs = circ.number_of_outputs();
        for mode in [KeyMode::FixedKey, KeyMode::NoFixedKey] {
            let scheme = FreeXorScheme::new(circ.clone(), mode, true).unwrap();
            let gc = scheme.garble(Block::from(9u128)).unwrap();
            let first = gc.tables.rows.len() - 2 * outputs;
            for row in first..gc.tables.rows.len() {
                for bit in [0, 8, 64, 127] {
                    let mut tables = gc.tables.clone();
                    tables.rows[row] = tables.rows[row] ^ Block::from(1u128 << bit);
                    assert!(
                        !scheme.verify(&tables, &gc.translation_table, &gc.input_keys),
                        "row {} bit {}",
                        row,
                        bit
                    );
                    let k = row - first;
                    assert!(matches!(
                        scheme.internal_verify(&tables, &gc.input_keys),
                        Err(GarbleError::VerificationMismatch { gate: g, row: r })
                            if g == gates + k / 2 && r == k % 2
                    ));
                }
            }
        }
    }
}
