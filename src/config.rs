//======================================================================
// src/config.rs
// Speed/area configuration: unroll factor and streaming bus width.
// Neither knob changes algorithmic output.
//======================================================================

use cfg_if::cfg_if;
use core::ops::BitXor;

/// Unroll factor for the permutation: how many consecutive rounds are
/// evaluated per step. All factors produce identical output; they only
/// trade step count against per-step work.
pub trait Unrolling: Sized + Clone {
    const UROL: usize;
}

/// One round per step.
#[derive(Clone, Debug, Default)]
pub struct Unroll1;
impl Unrolling for Unroll1 {
    const UROL: usize = 1;
}

/// Two rounds per step.
#[derive(Clone, Debug, Default)]
pub struct Unroll2;
impl Unrolling for Unroll2 {
    const UROL: usize = 2;
}

/// Four rounds per step.
#[derive(Clone, Debug, Default)]
pub struct Unroll4;
impl Unrolling for Unroll4 {
    const UROL: usize = 4;
}

cfg_if! {
    if #[cfg(feature = "unroll4")] {
        /// Unroll factor selected at build time via cargo features.
        pub type DefaultUnroll = Unroll4;
    } else if #[cfg(feature = "unroll2")] {
        /// Unroll factor selected at build time via cargo features.
        pub type DefaultUnroll = Unroll2;
    } else {
        /// Unroll factor selected at build time via cargo features.
        pub type DefaultUnroll = Unroll1;
    }
}

/// A word on the streaming data bus. Implemented for `u32` and `u64`.
///
/// Stream byte order is little-endian: the first byte of the stream is
/// the least significant byte of the word, and bit `i` of a valid-byte
/// mask refers to byte `i` in that order.
pub trait BusWord: Copy + Eq + BitXor<Output = Self> {
    /// Bus width in bits.
    const BITS: usize;
    /// Bus width in bytes.
    const BYTES: usize;
    /// Valid-byte mask with every lane set.
    const FULL_MASK: u8;
    /// Transfers needed for a 64-bit lane.
    const W64: usize;
    /// Transfers needed for a 128-bit rate block.
    const W128: usize;

    fn from_stream_bytes(bytes: &[u8]) -> Self;
    fn write_stream_bytes(self, out: &mut [u8]);
}

impl BusWord for u32 {
    const BITS: usize = 32;
    const BYTES: usize = 4;
    const FULL_MASK: u8 = 0x0F;
    const W64: usize = 2;
    const W128: usize = 4;

    #[inline]
    fn from_stream_bytes(bytes: &[u8]) -> Self {
        u32::from_le_bytes(bytes.try_into().unwrap())
    }

    #[inline]
    fn write_stream_bytes(self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_le_bytes());
    }
}

impl BusWord for u64 {
    const BITS: usize = 64;
    const BYTES: usize = 8;
    const FULL_MASK: u8 = 0xFF;
    const W64: usize = 1;
    const W128: usize = 2;

    #[inline]
    fn from_stream_bytes(bytes: &[u8]) -> Self {
        u64::from_le_bytes(bytes.try_into().unwrap())
    }

    #[inline]
    fn write_stream_bytes(self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_le_bytes());
    }
}
