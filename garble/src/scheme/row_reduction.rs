//! Garbled row reduction: the output key of signal row 0 is chosen to be
//! that row's pad, so row 0 never has to be sent.

use super::{
    free_xor::{FreeXorFamily, GateContext, NonLinearGarbler},
    signal_row_bits,
};
use crate::{
    factory::SchemeKind,
    gc::WireKeyPair,
    hash::{row_pad, row_pads},
    session::GarblingSession,
    GarbleError,
};
use circuit::Gate;
use crypto_core::Block;

#[derive(Clone, Copy, Debug, Default)]
pub struct ThreeRows;

pub type RowReductionScheme = FreeXorFamily<ThreeRows>;

impl ThreeRows {
    /// Output `key0` and the pads of a gate.
    #[inline]
    fn pads(ctx: &GateContext, delta: Block, a0: Block, b0: Block) -> (Block, [Block; 4], [bool; 4]) {
        let a = WireKeyPair::from_delta(a0, delta);
        let b = WireKeyPair::from_delta(b0, delta);
        let pads = row_pads(ctx.mode, a.by_signal(), b.by_signal(), ctx.index);
        let bits = signal_row_bits(&ctx.gate, a0.lsb(), b0.lsb());
        let out0 = pads[0] ^ delta.select(bits[0]);
        (out0, pads, bits)
    }
}

impl NonLinearGarbler for ThreeRows {
    const ROWS: usize = 3;
    const SCHEME: SchemeKind = SchemeKind::RowReduction;

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
        let (out0, pads, bits) = Self::pads(ctx, delta, a0, b0);
        for r in 1..4 {
            rows[r - 1] = pads[r] ^ out0 ^ delta.select(bits[r]);
        }
        Ok(out0)
    }

    fn evaluate_gate(ctx: &GateContext, a: Block, b: Block, rows: &[Block]) -> Block {
        let r = 2 * a.lsb() as usize + b.lsb() as usize;
        let pad = row_pad(ctx.mode, a, b, ctx.index, r);
        if r == 0 {
            pad
        } else {
            pad ^ rows[r - 1]
        }
    }

    fn verify_gate(
        ctx: &GateContext,
        delta: Block,
        a0: Block,
        b0: Block,
        rows: &[Block],
    ) -> Result<Block, GarbleError> {
        let (out0, pads, bits) = Self::pads(ctx, delta, a0, b0);
        for r in 1..4 {
            if rows[r - 1] != pads[r] ^ out0 ^ delta.select(bits[r]) {
                return Err(GarbleError::VerificationMismatch {
                    gate: ctx.index,
                    row: r - 1,
                });
            }
        }
        Ok(out0)
    }
}
