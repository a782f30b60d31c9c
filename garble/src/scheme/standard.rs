//! The textbook garbling: independent keys on every wire and four encrypted
//! rows per gate, XOR included. NOT gates are free: they swap the meaning
//! of the two keys.

use super::{alloc, check_tables, collect_outputs, load_inputs, signal_row_bits, GarbleOps};
use crate::{
    factory::CircuitType,
    gc::{GarbledBundle, GarbledTables, WireKeyPair},
    hash::{row_pad, row_pads, KeyMode},
    session::GarblingSession,
    translate::translation_table,
    GarbleError,
};
use circuit::{Circuit, GateKind, ONE_GATE};
use crypto_core::Block;
use tracing::debug;

const MODE: KeyMode = KeyMode::FixedKey;

pub struct StandardScheme {
    circ: Circuit,
    table_rows: usize,
}

impl StandardScheme {
    /// Constant gates carry no information about their second key, so they
    /// are rejected.
    pub fn new(circ: Circuit) -> Result<Self, GarbleError> {
        if let Some((gate, g)) = circ
            .gates
            .iter()
            .enumerate()
            .find(|(_, g)| !g.is_not() && (g.truth_table == 0 || g.truth_table == ONE_GATE))
        {
            return Err(GarbleError::UnsupportedGate {
                gate,
                truth_table: g.truth_table,
            });
        }
        let encrypted = circ.number_of_gates() - circ.num_of_not_gates;
        let table_rows = encrypted
            .checked_mul(4)
            .ok_or(GarbleError::AllocationFailure {
                wires: circ.last_wire_index as usize + 1,
                rows: usize::MAX,
            })?;
        Ok(StandardScheme { circ, table_rows })
    }
}

impl GarbleOps for StandardScheme {
    fn circuit(&self) -> &Circuit {
        &self.circ
    }

    fn circuit_type(&self) -> CircuitType {
        CircuitType::FixedKeyStandard
    }

    fn table_rows(&self) -> usize {
        self.table_rows
    }

    fn garble(&self, seed: Block) -> Result<GarbledBundle, GarbleError> {
        debug!(
            circuit_type = %self.circuit_type(),
            gates = self.circ.number_of_gates(),
            rows = self.table_rows,
            "garbling"
        );
        let session = GarblingSession::new(seed);
        let input_keys = session.input_pairs(self.circ.number_of_inputs());
        let mut wires = load_inputs(&self.circ, &input_keys)?;
        let mut rows = alloc(self.table_rows, Block::ZERO, wires.len())?;

        let mut off = 0;
        for (i, gate) in self.circ.gates.iter().enumerate() {
            let a = wires.get(gate.input0)?;
            if gate.kind() == GateKind::Not {
                wires.set(gate.output, a.swap())?;
                continue;
            }
            let b = wires.get(gate.input1)?;
            let out = session.gate_pair(i);
            let pads = row_pads(MODE, a.by_signal(), b.by_signal(), i);
            let bits = signal_row_bits(gate, a.key0.lsb(), b.key0.lsb());
            for r in 0..4 {
                rows[off + r] = pads[r] ^ out.key(bits[r]);
            }
            off += 4;
            wires.set(gate.output, out)?;
        }

        let output_keys = collect_outputs(&self.circ, &wires)?;
        Ok(GarbledBundle {
            tables: GarbledTables::new(rows, Vec::new()),
            translation_table: translation_table(&output_keys),
            input_keys,
            output_keys,
        })
    }

    fn evaluate(&self, tables: &GarbledTables, inputs: &[Block]) -> Result<Vec<Block>, GarbleError> {
        debug!(circuit_type = %self.circuit_type(), gates = self.circ.number_of_gates(), "evaluating");
        let mut wires = load_inputs(&self.circ, inputs)?;
        check_tables(tables, self.table_rows, 0)?;

        let mut off = 0;
        for (i, gate) in self.circ.gates.iter().enumerate() {
            let a = wires.get(gate.input0)?;
            if gate.kind() == GateKind::Not {
                wires.set(gate.output, a)?;
                continue;
            }
            let b = wires.get(gate.input1)?;
            let r = 2 * a.lsb() as usize + b.lsb() as usize;
            let out = row_pad(MODE, a, b, i, r) ^ tables.rows[off + r];
            off += 4;
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
        check_tables(tables, self.table_rows, 0)?;
        if let Some(input) = inputs.iter().position(|p| !p.is_permuted()) {
            return Err(GarbleError::InconsistentInputKeys { input });
        }
        let mut wires = load_inputs(&self.circ, inputs)?;

        let mut off = 0;
        for (i, gate) in self.circ.gates.iter().enumerate() {
            let a = wires.get(gate.input0)?;
            if gate.kind() == GateKind::Not {
                wires.set(gate.output, a.swap())?;
                continue;
            }
            let b = wires.get(gate.input1)?;
            let pads = row_pads(MODE, a.by_signal(), b.by_signal(), i);
            let bits = signal_row_bits(gate, a.key0.lsb(), b.key0.lsb());
            let plain: [Block; 4] = std::array::from_fn(|r| tables.rows[off + r] ^ pads[r]);

            // Each key is read from the first row carrying its value.
            let unsupported = || GarbleError::UnsupportedGate {
                gate: i,
                truth_table: gate.truth_table,
            };
            let r0 = bits.iter().position(|v| !*v).ok_or_else(unsupported)?;
            let r1 = bits.iter().position(|v| *v).ok_or_else(unsupported)?;
            let out = WireKeyPair::new(plain[r0], plain[r1]);
            if let Some(row) = (0..4).find(|r| plain[*r] != out.key(bits[*r])) {
                return Err(GarbleError::VerificationMismatch { gate: i, row });
            }
            if !out.is_permuted() {
                return Err(GarbleError::VerificationMismatch { gate: i, row: r1 });
            }
            off += 4;
            wires.set(gate.output, out)?;
        }
        collect_outputs(&self.circ, &wires)
    }
}
