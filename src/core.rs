//======================================================================
// src/core.rs
// Ascon-AEAD128 phase operators and the detached AEAD implementation.
//======================================================================

use crate::backends;
use crate::config::{DefaultUnroll, Unrolling};
use crate::consts::{
    DOMAIN_SEP, IV, KEY_BYTES, RATE_BYTES, ROUNDS_DATA, ROUNDS_INIT, STATE_WORDS, TAG_BYTES,
};
use aead::{
    consts::{U0, U16},
    generic_array::GenericArray,
    AeadCore, AeadInPlace, Key, KeyInit, KeySizeUser, Nonce, Tag,
};
use core::marker::PhantomData;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[inline(always)]
fn le64(bytes: &[u8]) -> u64 {
    u64::from_le_bytes(bytes.try_into().unwrap())
}

/// Load the key halves as little-endian lanes.
#[inline(always)]
pub(crate) fn key_lanes(key: &[u8; KEY_BYTES]) -> (u64, u64) {
    (le64(&key[..8]), le64(&key[8..]))
}

/// Build the initial state IV || K || N and run the 12-round
/// permutation, then XOR the key into the last two lanes.
pub(crate) fn initialize<U: Unrolling>(key: &[u8; KEY_BYTES], nonce: &[u8]) -> [u64; STATE_WORDS] {
    let (kh, kl) = key_lanes(key);
    let mut state = [IV, kh, kl, le64(&nonce[..8]), le64(&nonce[8..16])];
    backends::permute::<U>(&mut state, ROUNDS_INIT);
    state[3] ^= kh;
    state[4] ^= kl;
    state
}

/// Absorb associated data in 16-byte blocks with 10* padding, then
/// flip the domain separation bit.
///
/// Empty AD absorbs nothing; the domain separation XOR still fires, so
/// "no AD" and "AD ending on a block boundary" stay distinct.
pub(crate) fn absorb_ad<U: Unrolling>(state: &mut [u64; STATE_WORDS], ad: &[u8]) {
    if !ad.is_empty() {
        let mut chunks = ad.chunks_exact(RATE_BYTES);
        for block in chunks.by_ref() {
            state[0] ^= le64(&block[..8]);
            state[1] ^= le64(&block[8..]);
            backends::permute::<U>(state, ROUNDS_DATA);
        }
        let rem = chunks.remainder();
        let mut block = [0u8; RATE_BYTES];
        block[..rem.len()].copy_from_slice(rem);
        block[rem.len()] = 0x01;
        state[0] ^= le64(&block[..8]);
        state[1] ^= le64(&block[8..]);
        backends::permute::<U>(state, ROUNDS_DATA);
    }
    state[4] ^= DOMAIN_SEP;
}

/// Encrypt the buffer in place. Full blocks are absorbed, emitted and
/// permuted; the final partial block (possibly empty) absorbs its 10*
/// trailer and is emitted truncated, with no trailing permutation.
pub(crate) fn encrypt_blocks<U: Unrolling>(state: &mut [u64; STATE_WORDS], buffer: &mut [u8]) {
    let mut chunks = buffer.chunks_exact_mut(RATE_BYTES);
    for block in chunks.by_ref() {
        state[0] ^= le64(&block[..8]);
        state[1] ^= le64(&block[8..]);
        block[..8].copy_from_slice(&state[0].to_le_bytes());
        block[8..].copy_from_slice(&state[1].to_le_bytes());
        backends::permute::<U>(state, ROUNDS_DATA);
    }
    let rem = chunks.into_remainder();
    let mut block = [0u8; RATE_BYTES];
    block[..rem.len()].copy_from_slice(rem);
    block[rem.len()] = 0x01;
    state[0] ^= le64(&block[..8]);
    state[1] ^= le64(&block[8..]);
    block[..8].copy_from_slice(&state[0].to_le_bytes());
    block[8..].copy_from_slice(&state[1].to_le_bytes());
    let n = rem.len();
    rem.copy_from_slice(&block[..n]);
}

/// Decrypt the buffer in place. Full ciphertext blocks replace the
/// rate after the plaintext is extracted; the final partial block
/// updates the rate byte-wise so padding absorption matches the
/// encrypt side.
pub(crate) fn decrypt_blocks<U: Unrolling>(state: &mut [u64; STATE_WORDS], buffer: &mut [u8]) {
    let mut chunks = buffer.chunks_exact_mut(RATE_BYTES);
    for block in chunks.by_ref() {
        let c0 = le64(&block[..8]);
        let c1 = le64(&block[8..]);
        block[..8].copy_from_slice(&(state[0] ^ c0).to_le_bytes());
        block[8..].copy_from_slice(&(state[1] ^ c1).to_le_bytes());
        state[0] = c0;
        state[1] = c1;
        backends::permute::<U>(state, ROUNDS_DATA);
    }
    let rem = chunks.into_remainder();
    let mut rate = [0u8; RATE_BYTES];
    rate[..8].copy_from_slice(&state[0].to_le_bytes());
    rate[8..].copy_from_slice(&state[1].to_le_bytes());
    for (i, byte) in rem.iter_mut().enumerate() {
        let c = *byte;
        *byte ^= rate[i];
        rate[i] = c;
    }
    rate[rem.len()] ^= 0x01;
    state[0] = le64(&rate[..8]);
    state[1] = le64(&rate[8..]);
}

/// XOR the key into lanes 2-3, permute 12 rounds and squeeze the tag
/// out of the last two lanes.
pub(crate) fn finalize<U: Unrolling>(
    state: &mut [u64; STATE_WORDS],
    key: &[u8; KEY_BYTES],
) -> [u8; TAG_BYTES] {
    let (kh, kl) = key_lanes(key);
    state[2] ^= kh;
    state[3] ^= kl;
    backends::permute::<U>(state, ROUNDS_INIT);
    let mut tag = [0u8; TAG_BYTES];
    tag[..8].copy_from_slice(&(state[3] ^ kh).to_le_bytes());
    tag[8..].copy_from_slice(&(state[4] ^ kl).to_le_bytes());
    tag
}

/// Constant-time tag comparison.
pub(crate) fn ct_compare(a: &[u8], b: &[u8]) -> bool {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).fold(0, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Ascon-AEAD128 with a 128-bit key, 128-bit nonce and 128-bit tag.
///
/// The unroll parameter only changes how many permutation rounds are
/// composed per step; every choice produces identical output.
#[derive(Clone, ZeroizeOnDrop)]
pub struct AsconAead128<U: Unrolling = DefaultUnroll> {
    key: [u8; KEY_BYTES],
    _unroll: PhantomData<U>,
}

impl<U: Unrolling> KeySizeUser for AsconAead128<U> {
    type KeySize = U16;
}

impl<U: Unrolling> KeyInit for AsconAead128<U> {
    fn new(key: &Key<Self>) -> Self {
        Self {
            key: (*key).into(),
            _unroll: PhantomData,
        }
    }
}

impl<U: Unrolling> AeadCore for AsconAead128<U> {
    type NonceSize = U16;
    type TagSize = U16;
    type CiphertextOverhead = U0;
}

impl<U: Unrolling> AeadInPlace for AsconAead128<U> {
    fn encrypt_in_place_detached(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        buffer: &mut [u8],
    ) -> aead::Result<Tag<Self>> {
        let mut state = initialize::<U>(&self.key, nonce.as_slice());
        absorb_ad::<U>(&mut state, associated_data);
        encrypt_blocks::<U>(&mut state, buffer);
        let tag = finalize::<U>(&mut state, &self.key);
        state.zeroize();
        Ok(GenericArray::clone_from_slice(&tag))
    }

    fn decrypt_in_place_detached(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        buffer: &mut [u8],
        tag: &Tag<Self>,
    ) -> aead::Result<()> {
        let mut state = initialize::<U>(&self.key, nonce.as_slice());
        absorb_ad::<U>(&mut state, associated_data);
        decrypt_blocks::<U>(&mut state, buffer);
        let computed = finalize::<U>(&mut state, &self.key);
        state.zeroize();

        if ct_compare(&computed, tag.as_slice()) {
            Ok(())
        } else {
            // Never hand back plaintext under a bad tag.
            buffer.zeroize();
            Err(aead::Error)
        }
    }
}
