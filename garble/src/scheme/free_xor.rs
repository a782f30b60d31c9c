//! The Free-XOR family: one global offset `delta`, XOR gates cost nothing,
//! and only the non-linear gates are encrypted. The schemes of the family
//! differ only in how they garble a non-linear gate, which is what
//! [`NonLinearGarbler`] captures.

use super::{
    alloc, check_tables, collect_outputs, derive_delta, load_inputs, rekey, signal_row_bits, GarbleOps,
};
use crate::{
    factory::{CircuitType, SchemeKind},
    gc::{GarbledBundle, GarbledTables, WireKeyPair},
    hash::{row_pad, row_pads, KeyMode},
    session::GarblingSession,
    translate::translation_table,
    GarbleError,
};
use circuit::{Circuit, Gate, GateKind};
use crypto_core::Block;
use std::marker::PhantomData;
use tracing::debug;

/// What a non-linear gate garbler sees of its gate.
#[derive(Clone, Copy, Debug)]
pub struct GateContext {
    /// Position of the gate in the circuit, used as its tweak.
    pub index: usize,
    pub gate: Gate,
    pub mode: KeyMode,
    pub number_of_gates: usize,
}

/// Garbling of a single non-linear gate inside a Free-XOR circuit.
///
/// `a0`, `b0` and the returned key are the `key0`s of the wires; the
/// matching `key1` is always `key0 ^ delta`.
pub trait NonLinearGarbler: Send + Sync {
    /// Rows written per non-linear gate.
    const ROWS: usize;
    const SCHEME: SchemeKind;

    /// Whether a non-linear truth table can be garbled at all.
    fn supports(gate: &Gate) -> bool;

    fn garble_gate(
        ctx: &GateContext,
        session: &GarblingSession,
        a0: Block,
        b0: Block,
        rows: &mut [Block],
    ) -> Result<Block, GarbleError>;

    /// Output key from one key per input. `rows` holds exactly [`Self::ROWS`] rows.
    fn evaluate_gate(ctx: &GateContext, a: Block, b: Block, rows: &[Block]) -> Block;

    /// Check `rows` against the input keys and return the output `key0`.
    fn verify_gate(
        ctx: &GateContext,
        delta: Block,
        a0: Block,
        b0: Block,
        rows: &[Block],
    ) -> Result<Block, GarbleError>;
}

/// A Free-XOR circuit garbled with `G` at its non-linear gates.
pub struct FreeXorFamily<G> {
    circ: Circuit,
    mode: KeyMode,
    circuit_type: CircuitType,
    non_xor_outputs: bool,
    gate_rows: usize,
    table_rows: usize,
    _garbler: PhantomData<G>,
}

/// Four encrypted rows per non-linear gate.
pub type FreeXorScheme = FreeXorFamily<FourRows>;

impl<G: NonLinearGarbler> FreeXorFamily<G> {
    /// Bind the scheme to `circ`. With `non_xor_outputs` every output wire is
    /// rekeyed to an independent pair so revealed outputs do not leak `delta`.
    pub fn new(circ: Circuit, mode: KeyMode, non_xor_outputs: bool) -> Result<Self, GarbleError> {
        let circuit_type = CircuitType::new(mode, G::SCHEME)?;
        if let Some((gate, g)) = circ
            .gates
            .iter()
            .enumerate()
            .find(|(_, g)| g.kind() == GateKind::NonLinear && !G::supports(g))
        {
            return Err(GarbleError::UnsupportedGate {
                gate,
                truth_table: g.truth_table,
            });
        }

        let overflow = || GarbleError::AllocationFailure {
            wires: circ.last_wire_index as usize + 1,
            rows: usize::MAX,
        };
        let gate_rows = G::ROWS
            .checked_mul(circ.num_of_non_xor_gates())
            .ok_or_else(overflow)?;
        let rekey_rows = if non_xor_outputs {
            rekey::rows(circ.number_of_outputs()).ok_or_else(overflow)?
        } else {
            0
        };
        let table_rows = gate_rows.checked_add(rekey_rows).ok_or_else(overflow)?;

        Ok(FreeXorFamily {
            circ,
            mode,
            circuit_type,
            non_xor_outputs,
            gate_rows,
            table_rows,
            _garbler: PhantomData,
        })
    }

    #[inline]
    fn context(&self, index: usize, gate: Gate) -> GateContext {
        GateContext {
            index,
            gate,
            mode: self.mode,
            number_of_gates: self.circ.number_of_gates(),
        }
    }
}

impl<G: NonLinearGarbler> GarbleOps for FreeXorFamily<G> {
    fn circuit(&self) -> &Circuit {
        &self.circ
    }

    fn circuit_type(&self) -> CircuitType {
        self.circuit_type
    }

    fn table_rows(&self) -> usize {
        self.table_rows
    }

    fn garble(&self, seed: Block) -> Result<GarbledBundle, GarbleError> {
        debug!(
            circuit_type = %self.circuit_type,
            gates = self.circ.number_of_gates(),
            rows = self.table_rows,
            "garbling"
        );
        let session = GarblingSession::new(seed);
        let delta = session.delta();
        let input_keys = session.free_xor_input_pairs(self.circ.number_of_inputs());
        let zeros: Vec<Block> = input_keys.iter().map(|p| p.key0).collect();

        let mut wires = load_inputs(&self.circ, &zeros)?;
        // The constant wire carries 1, so its key1 is the zero block.
        wires.set_constant_wire(delta);
        let mut rows = alloc(self.table_rows, Block::ZERO, wires.len())?;

        let mut off = 0;
        for (i, gate) in self.circ.gates.iter().enumerate() {
            let a0 = wires.get(gate.input0)?;
            let b0 = wires.get(gate.input1)?;
            let out0 = match gate.kind() {
                GateKind::Not | GateKind::Xor => a0 ^ b0,
                GateKind::Xnor => a0 ^ b0 ^ delta,
                GateKind::NonLinear => {
                    let ctx = self.context(i, *gate);
                    let out0 = G::garble_gate(&ctx, &session, a0, b0, &mut rows[off..off + G::ROWS])?;
                    off += G::ROWS;
                    out0
                }
            };
            wires.set(gate.output, out0)?;
        }

        let mut output_keys: Vec<WireKeyPair> = collect_outputs(&self.circ, &wires)?
            .into_iter()
            .map(|k0| WireKeyPair::from_delta(k0, delta))
            .collect();
        if self.non_xor_outputs {
            output_keys = rekey::garble(
                self.mode,
                self.circ.number_of_gates(),
                &output_keys,
                &mut rows[self.gate_rows..],
            );
        }

        Ok(GarbledBundle {
            tables: GarbledTables::new(rows, Vec::new()),
            translation_table: translation_table(&output_keys),
            input_keys,
            output_keys,
        })
    }

    fn evaluate(&self, tables: &GarbledTables, inputs: &[Block]) -> Result<Vec<Block>, GarbleError> {
        debug!(circuit_type = %self.circuit_type, gates = self.circ.number_of_gates(), "evaluating");
        let mut wires = load_inputs(&self.circ, inputs)?;
        check_tables(tables, self.table_rows, 0)?;
        wires.set_constant_wire(Block::ZERO);

        let mut off = 0;
        for (i, gate) in self.circ.gates.iter().enumerate() {
            let a = wires.get(gate.input0)?;
            let b = wires.get(gate.input1)?;
            let out = match gate.kind() {
                GateKind::Not | GateKind::Xor | GateKind::Xnor => a ^ b,
                GateKind::NonLinear => {
                    let ctx = self.context(i, *gate);
                    let out = G::evaluate_gate(&ctx, a, b, &tables.rows[off..off + G::ROWS]);
                    off += G::ROWS;
                    out
                }
            };
            wires.set(gate.output, out)?;
        }

        let outputs = collect_outputs(&self.circ, &wires)?;
        if self.non_xor_outputs {
            return Ok(rekey::evaluate(
                self.mode,
                self.circ.number_of_gates(),
                &outputs,
                &tables.rows[self.gate_rows..],
            ));
        }
        Ok(outputs)
    }

    fn internal_verify(
        &self,
        tables: &GarbledTables,
        inputs: &[WireKeyPair],
    ) -> Result<Vec<WireKeyPair>, GarbleError> {
        debug!(circuit_type = %self.circuit_type, gates = self.circ.number_of_gates(), "verifying");
        check_tables(tables, self.table_rows, 0)?;
        let delta = derive_delta(inputs)?;
        let zeros: Vec<Block> = inputs.iter().map(|p| p.key0).collect();
        let mut wires = load_inputs(&self.circ, &zeros)?;
        wires.set_constant_wire(delta);

        let mut off = 0;
        for (i, gate) in self.circ.gates.iter().enumerate() {
            let a0 = wires.get(gate.input0)?;
            let b0 = wires.get(gate.input1)?;
            let out0 = match gate.kind() {
                GateKind::Not | GateKind::Xor => a0 ^ b0,
                GateKind::Xnor => a0 ^ b0 ^ delta,
                GateKind::NonLinear => {
                    let ctx = self.context(i, *gate);
                    let out0 = G::verify_gate(&ctx, delta, a0, b0, &tables.rows[off..off + G::ROWS])?;
                    off += G::ROWS;
                    out0
                }
            };
            wires.set(gate.output, out0)?;
        }

        let output_keys: Vec<WireKeyPair> = collect_outputs(&self.circ, &wires)?
            .into_iter()
            .map(|k0| WireKeyPair::from_delta(k0, delta))
            .collect();
        if self.non_xor_outputs {
            return rekey::verify(
                self.mode,
                self.circ.number_of_gates(),
                &output_keys,
                &tables.rows[self.gate_rows..],
            );
        }
        Ok(output_keys)
    }
}

/// Classic point-and-permute: four rows per non-linear gate, output `key0`
/// drawn from the seed.
#[derive(Clone, Copy, Debug, Default)]
pub struct FourRows;

impl NonLinearGarbler for FourRows {
    const ROWS: usize = 4;
    const SCHEME: SchemeKind = SchemeKind::FreeXor;

    fn supports(_gate: &Gate) -> bool {
        true
    }

    fn garble_gate(
        ctx: &GateContext,
        session: &GarblingSession,
        a0: Block,
        b0: Block,
        rows: &mut [Block],
    ) -> Result<Block, GarbleError> {
        let delta = session.delta();
        let out0 = session.gate_key(ctx.index);
        let a = WireKeyPair::from_delta(a0, delta);
        let b = WireKeyPair::from_delta(b0, delta);
        let pads = row_pads(ctx.mode, a.by_signal(), b.by_signal(), ctx.index);
        let bits = signal_row_bits(&ctx.gate, a0.lsb(), b0.lsb());
        for (r, row) in rows.iter_mut().enumerate() {
            *row = pads[r] ^ out0 ^ delta.select(bits[r]);
        }
        Ok(out0)
    }

    fn evaluate_gate(ctx: &GateContext, a: Block, b: Block, rows: &[Block]) -> Block {
        let r = 2 * a.lsb() as usize + b.lsb() as usize;
        row_pad(ctx.mode, a, b, ctx.index, r) ^ rows[r]
    }

    fn verify_gate(
        ctx: &GateContext,
        delta: Block,
        a0: Block,
        b0: Block,
        rows: &[Block],
    ) -> Result<Block, GarbleError> {
        let a = WireKeyPair::from_delta(a0, delta);
        let b = WireKeyPair::from_delta(b0, delta);
        let pads = row_pads(ctx.mode, a.by_signal(), b.by_signal(), ctx.index);
        let bits = signal_row_bits(&ctx.gate, a0.lsb(), b0.lsb());
        let out0 = rows[0] ^ pads[0] ^ delta.select(bits[0]);
        for r in 1..4 {
            if rows[r] ^ pads[r] != out0 ^ delta.select(bits[r]) {
                return Err(GarbleError::VerificationMismatch {
                    gate: ctx.index,
                    row: r,
                });
            }
        }
        Ok(out0)
    }
}
