//! Gate pads: the hashes of input keys that mask every garbled row.
//!
//! In fixed-key mode the pads come from the public permutation in
//! [`AES_HASH`]. In no-fixed-key mode every wire key is used as an AES key
//! of its own, which drops the assumption that fixed-key AES behaves like a
//! random permutation.

use crypto_core::{Aes128, Block, AES_HASH};
use serde::{Deserialize, Serialize};
use std::array::from_fn;

/// Where the pads get their AES key from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyMode {
    FixedKey,
    NoFixedKey,
}

/// Tweak of signal row `row` of gate `gate`.
#[inline]
pub fn row_tweak(gate: usize, row: usize) -> Block {
    Block::from(gate as u128 | (row as u128) << 64)
}

/// The tweak the second input key encrypts under no fixed key. The two keys
/// of a gate may be equal, e.g. `g(x, x)`, and their pads must not cancel.
#[inline]
pub fn second_input(t: Block) -> Block {
    t ^ Block::from(1u128 << 127)
}

/// Pad of one row of a four-row gate, for input keys `a` and `b`.
///
/// Fixed key: `π(2a ⊕ 4b ⊕ T) ⊕ a ⊕ b`. No fixed key: `AES_a(T) ⊕ AES_b(T')`,
/// where `T'` is `T` with its top bit flipped.
#[inline]
pub fn row_pad(mode: KeyMode, a: Block, b: Block, gate: usize, row: usize) -> Block {
    let t = row_tweak(gate, row);
    match mode {
        KeyMode::FixedKey => {
            let k = a.lane_shl(1) ^ b.lane_shl(2) ^ t;
            AES_HASH.encrypt(k) ^ a ^ b
        }
        KeyMode::NoFixedKey => {
            let [[x], [y]] = Aes128::para_encrypt([a, b], [[t], [second_input(t)]]);
            x ^ y
        }
    }
}

/// Pads of all four signal rows of a gate.
///
/// `a[s]` and `b[s]` are the input keys with signal bit `s`; the result is
/// indexed by `2·sa + sb`.
#[inline]
pub fn row_pads(mode: KeyMode, a: [Block; 2], b: [Block; 2], gate: usize) -> [Block; 4] {
    let t: [Block; 4] = from_fn(|r| row_tweak(gate, r));
    match mode {
        KeyMode::FixedKey => {
            let k: [Block; 4] = from_fn(|r| a[r >> 1].lane_shl(1) ^ b[r & 1].lane_shl(2) ^ t[r]);
            let e = AES_HASH.encrypt_many(k);
            from_fn(|r| e[r] ^ a[r >> 1] ^ b[r & 1])
        }
        KeyMode::NoFixedKey => {
            // a[sa] encrypts the two rows it appears in, same for b[sb].
            let u = t.map(second_input);
            let [ea0, ea1, eb0, eb1] = Aes128::para_encrypt(
                [a[0], a[1], b[0], b[1]],
                [[t[0], t[1]], [t[2], t[3]], [u[0], u[2]], [u[1], u[3]]],
            );
            let ea = [ea0, ea1];
            let eb = [eb0, eb1];
            from_fn(|r| ea[r >> 1][r & 1] ^ eb[r & 1][r >> 1])
        }
    }
}

/// Single-key pad used by half gates and by the output rekey layer.
///
/// Fixed key: `π(2k ⊕ t) ⊕ 2k ⊕ t`. No fixed key: `AES_k(t)`.
#[inline]
pub fn half_pad(mode: KeyMode, k: Block, tweak: usize) -> Block {
    let t = Block::from(tweak as u128);
    match mode {
        KeyMode::FixedKey => AES_HASH.cr_hash(k.lane_shl(1) ^ t),
        KeyMode::NoFixedKey => Aes128::new(k).encrypt(t),
    }
}

/// Batched [`half_pad`].
#[inline]
pub fn half_pads<const N: usize>(mode: KeyMode, keys: [Block; N], tweaks: [usize; N]) -> [Block; N] {
    let t: [Block; N] = tweaks.map(|t| Block::from(t as u128));
    match mode {
        KeyMode::FixedKey => AES_HASH.cr_hash_many(from_fn(|i| keys[i].lane_shl(1) ^ t[i])),
        KeyMode::NoFixedKey => Aes128::para_encrypt(keys, t.map(|t| [t])).map(|[x]| x),
    }
}
