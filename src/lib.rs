//======================================================================
// src/lib.rs
// Crate entry point. Declares modules and the public API surface.
//======================================================================
#![no_std]

//! Ascon-AEAD128 (NIST SP 800-232) authenticated encryption.
//!
//! The crate exposes the cipher two ways: [`AsconAead128`] implements
//! the RustCrypto [`aead`] traits for one-shot seal/open, and
//! [`stream::AsconEngine`] streams the same computation word by word
//! over a 32- or 64-bit bus with valid-byte masks, the way a hardware
//! core is fed.

// --- Module declarations ---
mod backends;
mod pad;

pub mod config;
pub mod consts;
pub mod core;
pub mod stream;

pub use crate::config::{BusWord, DefaultUnroll, Unroll1, Unroll2, Unroll4, Unrolling};
pub use crate::core::AsconAead128;

// Re-export the aead crate for downstream users.
pub use aead;

// --- Convenience Type Aliases for Users ---

/// Streaming engine over a 32-bit bus.
pub type AsconEngine32 = stream::AsconEngine<u32>;

/// Streaming engine over a 64-bit bus.
pub type AsconEngine64 = stream::AsconEngine<u64>;
