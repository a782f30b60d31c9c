//! Half gates: an AND gate split into a generator half and an evaluator
//! half, two rows per gate. Any gate with an odd number of ones in its truth
//! table is an AND gate after relabeling its inputs and output.

use super::{
    and_form,
    free_xor::{FreeXorFamily, GateContext, NonLinearGarbler},
};
use crate::{
    factory::SchemeKind,
    hash::half_pads,
    session::GarblingSession,
    GarbleError,
};
use circuit::Gate;
use crypto_core::Block;

#[derive(Clone, Copy, Debug, Default)]
pub struct HalfGates;

pub type HalfGatesScheme = FreeXorFamily<HalfGates>;

#[inline]
fn tweaks(ctx: &GateContext) -> (usize, usize) {
    (ctx.index, ctx.index + ctx.number_of_gates)
}

/// Rows `[TG, TE]` and output `key0` of a gate. Everything follows from
/// the input keys and `delta`, so the verifier calls this as well.
fn garble_half_gate(
    ctx: &GateContext,
    delta: Block,
    a0: Block,
    b0: Block,
) -> Result<([Block; 2], Block), GarbleError> {
    let (alpha, beta, gamma) =
        and_form(ctx.gate.truth_table).ok_or(GarbleError::UnsupportedGate {
            gate: ctx.index,
            truth_table: ctx.gate.truth_table,
        })?;
    let a0 = a0 ^ delta.select(alpha);
    let b0 = b0 ^ delta.select(beta);
    let (j, k) = tweaks(ctx);
    let [ha0, ha1, hb0, hb1] = half_pads(ctx.mode, [a0, a0 ^ delta, b0, b0 ^ delta], [j, j, k, k]);
    let pa = a0.lsb();
    let pb = b0.lsb();

    // generator half
    let tg = ha0 ^ ha1 ^ delta.select(pb);
    let wg0 = ha0 ^ tg.select(pa);
    // evaluator half
    let te = hb0 ^ hb1 ^ a0;
    let we0 = hb0 ^ (te ^ a0).select(pb);

    Ok(([tg, te], wg0 ^ we0 ^ delta.select(gamma)))
}

impl NonLinearGarbler for HalfGates {
    const ROWS: usize = 2;
    const SCHEME: SchemeKind = SchemeKind::HalfGates;

    fn supports(gate: &Gate) -> bool {
        and_form(gate.truth_table).is_some()
    }

    fn garble_gate(
        ctx: &GateContext,
        session: &GarblingSession,
        a0: Block,
        b0: Block,
        rows: &mut [Block],
    ) -> Result<Block, GarbleError> {
        let (table, out0) = garble_half_gate(ctx, session.delta(), a0, b0)?;
        rows.copy_from_slice(&table);
        Ok(out0)
    }

    fn evaluate_gate(ctx: &GateContext, a: Block, b: Block, rows: &[Block]) -> Block {
        let (j, k) = tweaks(ctx);
        let [ha, hb] = half_pads(ctx.mode, [a, b], [j, k]);
        let wg = ha ^ rows[0].select(a.lsb());
        let we = hb ^ (rows[1] ^ a).select(b.lsb());
        wg ^ we
    }

    fn verify_gate(
        ctx: &GateContext,
        delta: Block,
        a0: Block,
        b0: Block,
        rows: &[Block],
    ) -> Result<Block, GarbleError> {
        let (table, out0) = garble_half_gate(ctx, delta, a0, b0)?;
        match table.iter().zip(rows.iter()).position(|(x, y)| x != y) {
            Some(row) => Err(GarbleError::VerificationMismatch { gate: ctx.index, row }),
            None => Ok(out0),
        }
    }
}
