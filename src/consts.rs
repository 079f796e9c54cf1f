//======================================================================
// src/consts.rs
// Algorithm constants for Ascon-AEAD128 (NIST SP 800-232).
//======================================================================

/// Number of 64-bit lanes in the permutation state.
pub const STATE_WORDS: usize = 5;

/// The internal state size in bytes.
pub const STATE_BYTES: usize = STATE_WORDS * 8;

/// Rate portion of the state (S0 || S1) in bytes.
pub const RATE_BYTES: usize = 16;

pub const KEY_BYTES: usize = 16;
pub const NONCE_BYTES: usize = 16;
pub const TAG_BYTES: usize = 16;

/// Initialization vector occupying lane S0 before the first permutation.
pub const IV: u64 = 0x0000_1000_808C_0001;

/// Rounds for initialization and finalization.
pub const ROUNDS_INIT: usize = 12;

/// Rounds between data blocks.
pub const ROUNDS_DATA: usize = 8;

/// Domain separation bit, XORed into S4 once AD absorption is over.
pub const DOMAIN_SEP: u64 = 1 << 63;

/// Round constants (RC). An N-round run uses the last N entries:
/// round r of N takes `RC[16 - N + r]`.
pub const RC: [u64; 16] = [
    0x3C, 0x2D, 0x1E, 0x0F, 0xF0, 0xE1, 0xD2, 0xC3, 0xB4, 0xA5, 0x96, 0x87, 0x78, 0x69, 0x5A,
    0x4B,
];
