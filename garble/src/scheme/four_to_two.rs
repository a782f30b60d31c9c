//! Four-to-two garbling: independent key pairs keyed directly into AES, with
//! no global offset and no fixed-key assumption.
//!
//! An XOR gate costs one row and gets its own offset. A non-linear gate is
//! reduced from four rows to two: the three rows of the majority value share
//! one output key, the lone row gets the other, and a 4-bit mask fixes up
//! the signal bits.

use super::{alloc, and_form, check_tables, collect_outputs, load_inputs, odd_row, signal_row_bits, GarbleOps};
use crate::{
    factory::CircuitType,
    gc::{GarbledBundle, GarbledTables, WireKeyPair},
    hash::second_input,
    session::GarblingSession,
    translate::translation_table,
    GarbleError,
};
use circuit::{Circuit, Gate, GateKind};
use crypto_core::{Aes128, Block};
use tracing::debug;

#[inline]
fn tweak(gate: usize, row: usize) -> Block {
    Block::from(gate as u128 | (row as u128) << 96)
}

/// Garbled XOR: returns the row and the output pair.
fn garble_xor(index: usize, a: &WireKeyPair, b: &WireKeyPair) -> (Block, WireKeyPair) {
    let sa0 = a.key0.lsb();
    let sb0 = b.key0.lsb();
    let [[c0], [c1], [d0], [d1]] = Aes128::para_encrypt(
        [a.key0, a.key1, b.key0, b.key1],
        [
            [tweak(index, sa0 as usize)],
            [tweak(index, !sa0 as usize)],
            [second_input(tweak(index, sb0 as usize))],
            [second_input(tweak(index, !sb0 as usize))],
        ],
    );
    let offset = c0 ^ c1;
    let row = d0 ^ d1 ^ offset;
    let out0 = (if sb0 { c1 ^ d1 } else { c0 ^ d0 }).with_lsb(sa0 ^ sb0);
    (row, WireKeyPair::new(out0, out0 ^ offset.with_lsb(true)))
}

fn evaluate_xor(index: usize, a: Block, b: Block, row: Block) -> Block {
    let (sa, sb) = (a.lsb(), b.lsb());
    let [[x], [y]] = Aes128::para_encrypt(
        [a, b],
        [[tweak(index, sa as usize)], [second_input(tweak(index, sb as usize))]],
    );
    (x ^ y ^ row.select(sb)).with_lsb(sa ^ sb)
}

/// The per-row material of a non-linear gate, indexed by signal row.
struct AndGate {
    e: [Block; 4],
    bits: [bool; 4],
    /// The row whose output differs from the other three.
    lone: usize,
}

impl AndGate {
    fn expand(index: usize, gate: &Gate, a: &WireKeyPair, b: &WireKeyPair) -> Result<Self, GarbleError> {
        let [a0, a1] = a.by_signal();
        let [b0, b1] = b.by_signal();
        let t: [Block; 4] = std::array::from_fn(|r| tweak(index, r));
        let u = t.map(second_input);
        let [ea0, ea1, eb0, eb1] = Aes128::para_encrypt(
            [a0, a1, b0, b1],
            [[t[0], t[1]], [t[2], t[3]], [u[0], u[2]], [u[1], u[3]]],
        );
        let (ea, eb) = ([ea0, ea1], [eb0, eb1]);
        let e = std::array::from_fn(|r| ea[r >> 1][r & 1] ^ eb[r & 1][r >> 1]);

        let bits = signal_row_bits(gate, a.key0.lsb(), b.key0.lsb());
        let packed = bits.iter().fold(0u8, |acc, v| acc << 1 | *v as u8);
        let lone = odd_row(packed).ok_or(GarbleError::UnsupportedGate {
            gate: index,
            truth_table: gate.truth_table,
        })?;
        Ok(AndGate { e, bits, lone })
    }

    #[inline]
    fn g(&self, r: usize) -> Block {
        self.e[r].with_lsb(false)
    }

    /// `[T1, T2]`: T1 cancels the first input's signal along the column
    /// without the lone row, T2 does the same along the row without it.
    fn rows(&self) -> [Block; 2] {
        let c = 1 - (self.lone & 1);
        let c_ = 1 - (self.lone >> 1);
        [self.g(c) ^ self.g(2 | c), self.g(c_ << 1) ^ self.g((c_ << 1) | 1)]
    }

    /// A row carrying the majority value, diagonal to the lone row.
    fn majority_row(&self) -> usize {
        3 - self.lone
    }

    fn mask(&self, sigma: bool) -> u8 {
        (0..4).fold(0u8, |acc, r| {
            acc | (((self.e[r].lsb() ^ sigma ^ self.bits[r]) as u8) << r)
        })
    }

    fn output(&self, sigma: bool) -> WireKeyPair {
        let [t1, t2] = self.rows();
        let k = |r: usize| self.g(r) ^ t1.select(r >> 1 == 1) ^ t2.select(r & 1 == 1);
        let lone_key = k(self.lone);
        let majority_key = k(self.majority_row());
        let (k0, k1) = if self.bits[self.lone] {
            (majority_key, lone_key)
        } else {
            (lone_key, majority_key)
        };
        WireKeyPair::new(k0.with_lsb(sigma), k1.with_lsb(!sigma))
    }
}

fn evaluate_and(index: usize, a: Block, b: Block, rows: &[Block], mask: u8) -> Block {
    let (sa, sb) = (a.lsb(), b.lsb());
    let r = 2 * sa as usize + sb as usize;
    let t = tweak(index, r);
    let [[x], [y]] = Aes128::para_encrypt([a, b], [[t], [second_input(t)]]);
    let e = x ^ y;
    let k = e.with_lsb(false) ^ rows[0].select(sa) ^ rows[1].select(sb);
    k.with_lsb(e.lsb() ^ ((mask >> r) & 1 == 1))
}

pub struct FourToTwoScheme {
    circ: Circuit,
    table_rows: usize,
    mask_bytes: usize,
}

impl FourToTwoScheme {
    /// Only XOR, XNOR, NOT and odd-parity gates can be garbled.
    pub fn new(circ: Circuit) -> Result<Self, GarbleError> {
        if let Some((gate, g)) = circ
            .gates
            .iter()
            .enumerate()
            .find(|(_, g)| g.kind() == GateKind::NonLinear && and_form(g.truth_table).is_none())
        {
            return Err(GarbleError::UnsupportedGate {
                gate,
                truth_table: g.truth_table,
            });
        }
        let mask_bytes = circ.num_of_non_xor_gates();
        let table_rows = mask_bytes
            .checked_mul(2)
            .and_then(|n| n.checked_add(circ.num_of_xor_gates))
            .ok_or(GarbleError::AllocationFailure {
                wires: circ.last_wire_index as usize + 1,
                rows: usize::MAX,
            })?;
        Ok(FourToTwoScheme {
            circ,
            table_rows,
            mask_bytes,
        })
    }
}

impl GarbleOps for FourToTwoScheme {
    fn circuit(&self) -> &Circuit {
        &self.circ
    }

    fn circuit_type(&self) -> CircuitType {
        CircuitType::NoFixedKeyFourToTwo
    }

    fn table_rows(&self) -> usize {
        self.table_rows
    }

    fn mask_bytes(&self) -> usize {
        self.mask_bytes
    }

    fn garble(&self, seed: Block) -> Result<GarbledBundle, GarbleError> {
        debug!(
            circuit_type = %self.circuit_type(),
            gates = self.circ.number_of_gates(),
            rows = self.table_rows,
            masks = self.mask_bytes,
            "garbling"
        );
        let session = GarblingSession::new(seed);
        let input_keys = session.input_pairs(self.circ.number_of_inputs());
        let mut wires = load_inputs(&self.circ, &input_keys)?;
        let mut rows = alloc(self.table_rows, Block::ZERO, wires.len())?;
        let mut masks = alloc(self.mask_bytes, 0u8, wires.len())?;

        let (mut off, mut m) = (0, 0);
        for (i, gate) in self.circ.gates.iter().enumerate() {
            let a = wires.get(gate.input0)?;
            let out = match gate.kind() {
                GateKind::Not => a.swap(),
                kind @ (GateKind::Xor | GateKind::Xnor) => {
                    let b = wires.get(gate.input1)?;
                    let (row, out) = garble_xor(i, &a, &b);
                    rows[off] = row;
                    off += 1;
                    if kind == GateKind::Xnor {
                        out.swap()
                    } else {
                        out
                    }
                }
                GateKind::NonLinear => {
                    let b = wires.get(gate.input1)?;
                    let and = AndGate::expand(i, gate, &a, &b)?;
                    let sigma = session.signal_bit(i);
                    rows[off..off + 2].copy_from_slice(&and.rows());
                    masks[m] = and.mask(sigma);
                    off += 2;
                    m += 1;
                    and.output(sigma)
                }
            };
            wires.set(gate.output, out)?;
        }

        let output_keys = collect_outputs(&self.circ, &wires)?;
        Ok(GarbledBundle {
            tables: GarbledTables::new(rows, masks),
            translation_table: translation_table(&output_keys),
            input_keys,
            output_keys,
        })
    }

    fn evaluate(&self, tables: &GarbledTables, inputs: &[Block]) -> Result<Vec<Block>, GarbleError> {
        debug!(circuit_type = %self.circuit_type(), gates = self.circ.number_of_gates(), "evaluating");
        let mut wires = load_inputs(&self.circ, inputs)?;
        check_tables(tables, self.table_rows, self.mask_bytes)?;

        let (mut off, mut m) = (0, 0);
        for (i, gate) in self.circ.gates.iter().enumerate() {
            let a = wires.get(gate.input0)?;
            let out = match gate.kind() {
                GateKind::Not => a,
                GateKind::Xor | GateKind::Xnor => {
                    let b = wires.get(gate.input1)?;
                    let out = evaluate_xor(i, a, b, tables.rows[off]);
                    off += 1;
                    out
                }
                GateKind::NonLinear => {
                    let b = wires.get(gate.input1)?;
                    let out = evaluate_and(i, a, b, &tables.rows[off..off + 2], tables.masks[m]);
                    off += 2;
                    m += 1;
                    out
                }
            };
            wires.set(gate.output, out)?;
        }
        collect_outputs(&self.circ, &wires)
    }

    fn internal_verify(
        &self,
        tables: &GarbledTables,
        inputs: &[WireKeyPair],
    ) -> Result<Vec<WireKeyPair>, GarbleError> {
        debug!(circuit_type = %self.circuit_type(), gates = self.circ.number_of_gates(), "verifying");
        check_tables(tables, self.table_rows, self.mask_bytes)?;
        if let Some(input) = inputs.iter().position(|p| !p.is_permuted()) {
            return Err(GarbleError::InconsistentInputKeys { input });
        }
        let mut wires = load_inputs(&self.circ, inputs)?;

        let (mut off, mut m) = (0, 0);
        for (i, gate) in self.circ.gates.iter().enumerate() {
            let a = wires.get(gate.input0)?;
            let out = match gate.kind() {
                GateKind::Not => a.swap(),
                kind @ (GateKind::Xor | GateKind::Xnor) => {
                    let b = wires.get(gate.input1)?;
                    let (row, out) = garble_xor(i, &a, &b);
                    if tables.rows[off] != row {
                        return Err(GarbleError::VerificationMismatch { gate: i, row: 0 });
                    }
                    off += 1;
                    if kind == GateKind::Xnor {
                        out.swap()
                    } else {
                        out
                    }
                }
                GateKind::NonLinear => {
                    let b = wires.get(gate.input1)?;
                    let and = AndGate::expand(i, gate, &a, &b)?;
                    if let Some(row) = and
                        .rows()
                        .iter()
                        .zip(tables.rows[off..off + 2].iter())
                        .position(|(x, y)| x != y)
                    {
                        return Err(GarbleError::VerificationMismatch { gate: i, row });
                    }
                    let mask = tables.masks[m];
                    let r = and.majority_row();
                    let sigma = and.e[r].lsb() ^ ((mask >> r) & 1 == 1) ^ and.bits[r];
                    if and.mask(sigma) != mask {
                        return Err(GarbleError::VerificationMismatch { gate: i, row: 2 });
                    }
                    off += 2;
                    m += 1;
                    and.output(sigma)
                }
            };
            wires.set(gate.output, out)?;
        }
        collect_outputs(&self.circ, &wires)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use circuit::{AND_GATE, XOR_GATE, XOR_NOT_GATE};

    fn two_input(tt: u8) -> Circuit {
        Circuit::new(vec![vec![0], vec![1]], vec![2], vec![Gate::new(0, 1, 2, tt)]).unwrap()
    }

    #[test]
    fn supported_tables_round_trip() {
        let tables = (0u8..16).filter(|tt| tt.count_ones() % 2 == 1 || *tt == XOR_GATE || *tt == XOR_NOT_GATE);
        for tt in tables {
            let scheme = FourToTwoScheme::new(two_input(tt)).unwrap();
            let gc = scheme.garble(rand::random::<Block>()).unwrap();
            assert_eq!(gc.tables.size_bytes(), scheme.table_size_bytes());
            for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
                let out = scheme.evaluate(&gc.tables, &gc.encode(&[a, b]).unwrap()).unwrap();
                assert_eq!(out[0], gc.output_keys[0].key(Gate::new(0, 1, 2, tt).eval(a, b)), "tt {:04b}", tt);
            }
            assert!(gc.output_keys[0].is_permuted());
            assert!(scheme.verify(&gc.tables, &gc.translation_table, &gc.input_keys));
        }
    }

    #[test]
    fn table_cost() {
        let gates = vec![
            Gate::new(0, 1, 2, XOR_GATE),
            Gate::new(0, 1, 3, AND_GATE),
            Gate::new(2, 3, 4, XOR_NOT_GATE),
            Gate::not(4, 5),
        ];
        let circ = Circuit::new(vec![vec![0], vec![1]], vec![5], gates).unwrap();
        let scheme = FourToTwoScheme::new(circ).unwrap();
        assert_eq!(scheme.table_rows(), 4);
        assert_eq!(scheme.mask_bytes(), 1);
        assert_eq!(scheme.table_size_bytes(), 65);
    }

    #[test]
    fn gates_reading_one_wire_twice() {
        let gates = vec![Gate::new(0, 0, 1, XOR_GATE), Gate::new(0, 0, 2, AND_GATE)];
        let circ = Circuit::new(vec![vec![0]], vec![1, 2], gates).unwrap();
        let scheme = FourToTwoScheme::new(circ).unwrap();
        let gc = scheme.garble(Block::from(21u128)).unwrap();
        for pair in gc.output_keys.iter() {
            assert!(pair.is_permuted());
            assert_ne!(pair.key0.with_lsb(false), Block::ZERO);
            for row in gc.tables.rows.iter() {
                assert!(*row != pair.key0 && *row != pair.key1);
            }
        }
        for x in [false, true] {
            let out = scheme.evaluate(&gc.tables, &gc.encode(&[x]).unwrap()).unwrap();
            assert_eq!(scheme.translate(&gc.translation_table, &out).unwrap(), vec![false, x]);
        }
        assert!(scheme.verify(&gc.tables, &gc.translation_table, &gc.input_keys));
    }

    #[test]
    fn even_tables_are_rejected() {
        assert!(matches!(
            FourToTwoScheme::new(two_input(0b0011)),
            Err(GarbleError::UnsupportedGate { gate: 0, truth_table: 3 })
        ));
    }

    #[test]
    fn mask_flip_is_caught() {
        let scheme = FourToTwoScheme::new(two_input(AND_GATE)).unwrap();
        let gc = scheme.garble(Block::from(1u128)).unwrap();
        for bit in 0..8 {
            let mut tables = gc.tables.clone();
            tables.masks[0] ^= 1 << bit;
            assert!(scheme.internal_verify(&tables, &gc.input_keys).is_err(), "bit {}", bit);
        }
    }
}
