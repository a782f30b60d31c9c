//! A 128-bit block, the unit every wire key, pad and ciphertext row is made of.

use cipher::{consts::U16, generic_array::GenericArray};
use core::ops::{BitAnd, BitAndAssign, BitXor, BitXorAssign};
use rand::{
    distributions::{Distribution, Standard},
    Rng,
};
use serde::{Deserialize, Serialize};

/// A block of 128 bits, stored little-endian.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block([u8; 16]);

/// `SELECT_MASK[b] & x` is `x` when `b == 1` and zero otherwise.
pub const SELECT_MASK: [Block; 2] = [Block::ZERO, Block::ONES];

impl Block {
    /// The length of a block in bytes
    pub const LEN: usize = 16;
    /// A zero block
    pub const ZERO: Self = Self([0; 16]);
    /// A block with all bits set to 1
    pub const ONES: Self = Self([0xff; 16]);

    #[inline]
    pub fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 16] {
        self.0
    }

    /// Build a block from the first 16 bytes of `bytes`.
    #[inline]
    pub fn try_from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; 16] = bytes.get(..16)?.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Returns the least significant bit of the block. This is the signal bit
    /// of a wire key.
    #[inline]
    pub fn lsb(&self) -> bool {
        self.0[0] & 1 == 1
    }

    /// Sets the least significant bit to `bit`.
    #[inline]
    pub fn set_lsb(&mut self, bit: bool) {
        self.0[0] = (self.0[0] & 0xfe) | bit as u8;
    }

    /// Returns a copy of the block whose least significant bit is `bit`.
    #[inline]
    pub fn with_lsb(mut self, bit: bool) -> Self {
        self.set_lsb(bit);
        self
    }

    /// Returns `self` if `bit` is set, zero otherwise.
    #[inline]
    pub fn select(self, bit: bool) -> Self {
        SELECT_MASK[bit as usize] & self
    }

    /// Shifts both 64-bit lanes left by `n` bits independently.
    ///
    /// The bits shifted out of the low lane do not carry into the high lane.
    /// `x.lane_shl(1)` is the `2·x` and `x.lane_shl(2)` the `4·x` used when
    /// keying the fixed-key hash.
    #[inline]
    pub fn lane_shl(self, n: u32) -> Self {
        let [lo, hi] = self.lanes();
        Self::from_lanes([lo << n, hi << n])
    }

    #[inline]
    fn lanes(self) -> [u64; 2] {
        let mut lo = [0u8; 8];
        let mut hi = [0u8; 8];
        lo.copy_from_slice(&self.0[..8]);
        hi.copy_from_slice(&self.0[8..]);
        [u64::from_le_bytes(lo), u64::from_le_bytes(hi)]
    }

    #[inline]
    fn from_lanes(lanes: [u64; 2]) -> Self {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&lanes[0].to_le_bytes());
        bytes[8..].copy_from_slice(&lanes[1].to_le_bytes());
        Self(bytes)
    }
}

impl From<u128> for Block {
    #[inline]
    fn from(m: u128) -> Self {
        Self(m.to_le_bytes())
    }
}

impl From<Block> for u128 {
    #[inline]
    fn from(b: Block) -> Self {
        u128::from_le_bytes(b.0)
    }
}

impl From<[u8; 16]> for Block {
    #[inline]
    fn from(bytes: [u8; 16]) -> Self {
        Block::new(bytes)
    }
}

impl From<Block> for [u8; 16] {
    #[inline]
    fn from(b: Block) -> Self {
        b.0
    }
}

impl From<Block> for GenericArray<u8, U16> {
    #[inline]
    fn from(b: Block) -> Self {
        b.0.into()
    }
}

impl From<GenericArray<u8, U16>> for Block {
    #[inline]
    fn from(b: GenericArray<u8, U16>) -> Self {
        Block::new(b.into())
    }
}

impl AsRef<[u8]> for Block {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl AsMut<[u8]> for Block {
    #[inline]
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl BitXor for Block {
    type Output = Self;

    #[inline]
    fn bitxor(self, other: Self) -> Self::Output {
        Self(std::array::from_fn(|i| self.0[i] ^ other.0[i]))
    }
}

impl BitXorAssign for Block {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Self) {
        *self = *self ^ rhs;
    }
}

impl BitAnd for Block {
    type Output = Self;

    #[inline]
    fn bitand(self, other: Self) -> Self::Output {
        Self(std::array::from_fn(|i| self.0[i] & other.0[i]))
    }
}

impl BitAndAssign for Block {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        *self = *self & rhs;
    }
}

impl Distribution<Block> for Standard {
    #[inline]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Block {
        Block(rng.gen())
    }
}
