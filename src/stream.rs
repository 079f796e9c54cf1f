//======================================================================
// src/stream.rs
// Word-streaming controller. Drives the AEAD phases over a 32- or
// 64-bit data bus with valid-byte masks and end-of-type/end-of-input
// markers, buffering partial rate blocks between permutations.
//======================================================================

use crate::backends;
use crate::config::{BusWord, DefaultUnroll, Unrolling};
use crate::consts::{
    DOMAIN_SEP, KEY_BYTES, NONCE_BYTES, RATE_BYTES, ROUNDS_DATA, STATE_WORDS, TAG_BYTES,
};
use crate::core::{finalize, initialize};
use crate::pad::{pad, pad2};
use core::marker::PhantomData;
use zeroize::ZeroizeOnDrop;

/// Direction of the operation, latched at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Encrypt,
    Decrypt,
}

/// What a streamed word carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordKind {
    Nonce,
    Ad,
    Msg,
    Tag,
}

/// One input transfer.
///
/// Non-final words must be fully valid; the final word of a stream may
/// be partially valid, with the mask contiguous from byte 0. An empty
/// stream is signaled by `end_of_input` on the last word of the
/// previous stream, never by a zero-valid word.
#[derive(Clone, Copy, Debug)]
pub struct WordIn<W: BusWord> {
    pub data: W,
    pub valid_bytes: u8,
    pub kind: WordKind,
    pub end_of_type: bool,
    pub end_of_input: bool,
}

/// One output transfer: message words as they stream, tag words after
/// finalization (encrypt only).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WordOut<W: BusWord> {
    pub data: W,
    pub valid_bytes: u8,
    pub kind: WordKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    LoadKey,
    LoadNonce,
    AbsorbAd,
    ProcessMsg,
    EmitTag,
    VerifyTag,
    Done,
}

/// Streaming Ascon-AEAD128 engine over a `W`-wide bus.
///
/// The caller feeds the 128-bit key as a preamble with
/// [`load_key_word`](Self::load_key_word), then pushes nonce, AD,
/// message and (decrypt) tag words in order. Message output words come
/// back from [`push`](Self::push); encrypt tag words are drained with
/// [`read_tag_word`](Self::read_tag_word).
///
/// During decryption the plaintext streams out before the tag has been
/// checked, so callers must buffer it until [`auth`](Self::auth)
/// reports a verdict and discard it on failure.
#[derive(Clone, ZeroizeOnDrop)]
pub struct AsconEngine<W: BusWord, U: Unrolling = DefaultUnroll> {
    state: [u64; STATE_WORDS],
    key: [u8; KEY_BYTES],
    nonce: [u8; NONCE_BYTES],
    tag: [u8; TAG_BYTES],
    #[zeroize(skip)]
    mode: Mode,
    #[zeroize(skip)]
    phase: Phase,
    /// Bytes accumulated of the key, nonce or tag stream.
    loaded: usize,
    /// Byte offset inside the current rate block.
    offset: usize,
    /// OR-accumulated tag difference (decrypt).
    tag_diff: u8,
    /// Tag bytes emitted so far (encrypt).
    emitted: usize,
    #[zeroize(skip)]
    auth: Option<bool>,
    #[zeroize(skip)]
    _word: PhantomData<W>,
    #[zeroize(skip)]
    _unroll: PhantomData<U>,
}

impl<W: BusWord, U: Unrolling> AsconEngine<W, U> {
    pub fn new(mode: Mode) -> Self {
        Self {
            state: [0; STATE_WORDS],
            key: [0; KEY_BYTES],
            nonce: [0; NONCE_BYTES],
            tag: [0; TAG_BYTES],
            mode,
            phase: Phase::LoadKey,
            loaded: 0,
            offset: 0,
            tag_diff: 0,
            emitted: 0,
            auth: None,
            _word: PhantomData,
            _unroll: PhantomData,
        }
    }

    /// Load the next fully valid key word of the 128-bit preamble.
    ///
    /// # Panics
    ///
    /// Panics when called after the key has been fully loaded.
    pub fn load_key_word(&mut self, word: W) {
        assert!(
            self.phase == Phase::LoadKey,
            "key words are only accepted before the nonce"
        );
        let at = self.loaded;
        word.write_stream_bytes(&mut self.key[at..at + W::BYTES]);
        self.loaded += W::BYTES;
        if self.loaded == KEY_BYTES {
            self.loaded = 0;
            self.phase = Phase::LoadNonce;
        }
    }

    /// Push one input word and collect the output word it produces, if
    /// any. Message words answer immediately; nonce, AD and tag words
    /// produce no output.
    ///
    /// # Panics
    ///
    /// Panics on marker discipline violations: a word kind the current
    /// phase does not accept, a non-contiguous or oversized valid mask,
    /// a partially valid non-final word, `end_of_input` without
    /// `end_of_type`, or a stream that ends at the wrong length.
    pub fn push(&mut self, word: WordIn<W>) -> Option<WordOut<W>> {
        assert!(
            word.valid_bytes <= W::FULL_MASK
                && word.valid_bytes & word.valid_bytes.wrapping_add(1) == 0,
            "valid_bytes mask must be contiguous from byte 0"
        );
        assert!(
            !word.end_of_input || word.end_of_type,
            "end_of_input implies end_of_type"
        );
        match (self.phase, word.kind) {
            (Phase::LoadNonce, WordKind::Nonce) => {
                self.load_nonce_word(word);
                None
            }
            (Phase::AbsorbAd, WordKind::Ad) => {
                self.absorb_ad_word(word);
                None
            }
            (Phase::AbsorbAd, WordKind::Msg) => {
                // No AD words arrived: only the domain bit fires.
                self.state[4] ^= DOMAIN_SEP;
                self.phase = Phase::ProcessMsg;
                Some(self.process_msg_word(word))
            }
            (Phase::ProcessMsg, WordKind::Msg) => Some(self.process_msg_word(word)),
            (Phase::VerifyTag, WordKind::Tag) => {
                self.verify_tag_word(word);
                None
            }
            (phase, kind) => panic!("{kind:?} word not accepted in {phase:?}"),
        }
    }

    /// Drain the next tag word after an encryption has finalized.
    /// Returns `None` before finalization and once all tag words are
    /// out.
    pub fn read_tag_word(&mut self) -> Option<WordOut<W>> {
        if self.phase != Phase::EmitTag {
            return None;
        }
        let at = self.emitted;
        let data = W::from_stream_bytes(&self.tag[at..at + W::BYTES]);
        self.emitted += W::BYTES;
        if self.emitted == TAG_BYTES {
            self.phase = Phase::Done;
        }
        Some(WordOut {
            data,
            valid_bytes: W::FULL_MASK,
            kind: WordKind::Tag,
        })
    }

    /// Authentication verdict (decrypt): `None` until the supplied tag
    /// has been fully compared, then `Some(true)` iff it matched.
    pub fn auth(&self) -> Option<bool> {
        self.auth
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    fn load_nonce_word(&mut self, word: WordIn<W>) {
        assert_eq!(
            word.valid_bytes,
            W::FULL_MASK,
            "nonce words must be fully valid"
        );
        let at = self.loaded;
        word.data.write_stream_bytes(&mut self.nonce[at..at + W::BYTES]);
        self.loaded += W::BYTES;
        if self.loaded < NONCE_BYTES {
            assert!(!word.end_of_type, "nonce stream ends early");
            return;
        }
        assert!(word.end_of_type, "nonce stream must close with end_of_type");
        self.loaded = 0;
        self.state = initialize::<U>(&self.key, &self.nonce);
        if word.end_of_input {
            // Neither AD nor message follow: domain bit, then the
            // padding of an empty message, straight to the tag.
            self.state[4] ^= DOMAIN_SEP;
            self.rate_xor_byte(0, 0x01);
            self.enter_tag_phase();
        } else {
            self.phase = Phase::AbsorbAd;
        }
    }

    fn absorb_ad_word(&mut self, word: WordIn<W>) {
        self.check_stream_word(&word);
        let padded = pad::<W>(word.data, word.valid_bytes);
        self.rate_xor_word(self.offset, padded);
        self.offset += W::BYTES;
        if word.end_of_type {
            if word.valid_bytes == W::FULL_MASK {
                // The 10* trailer falls past this word, possibly into
                // a fresh block.
                if self.offset == RATE_BYTES {
                    backends::permute::<U>(&mut self.state, ROUNDS_DATA);
                    self.offset = 0;
                }
                self.rate_xor_byte(self.offset, 0x01);
            }
            backends::permute::<U>(&mut self.state, ROUNDS_DATA);
            self.offset = 0;
            self.state[4] ^= DOMAIN_SEP;
            if word.end_of_input {
                self.rate_xor_byte(0, 0x01);
                self.enter_tag_phase();
            } else {
                self.phase = Phase::ProcessMsg;
            }
        } else if self.offset == RATE_BYTES {
            backends::permute::<U>(&mut self.state, ROUNDS_DATA);
            self.offset = 0;
        }
    }

    fn process_msg_word(&mut self, word: WordIn<W>) -> WordOut<W> {
        self.check_stream_word(&word);
        let off = self.offset;
        let data = match self.mode {
            Mode::Encrypt => {
                let padded = pad::<W>(word.data, word.valid_bytes);
                self.rate_xor_word(off, padded);
                self.rate_word(off)
            }
            Mode::Decrypt => {
                let keystream = self.rate_word(off);
                let replacement = pad2::<W>(word.data, keystream, word.valid_bytes);
                self.rate_set_word(off, replacement);
                word.data ^ keystream
            }
        };
        self.offset += W::BYTES;
        if self.offset == RATE_BYTES {
            self.offset = 0;
            // A completed block is permuted unless it was the final,
            // padded one; a fully valid closing word means the block
            // held message bytes only and the trailer is still due.
            if !word.end_of_type || word.valid_bytes == W::FULL_MASK {
                backends::permute::<U>(&mut self.state, ROUNDS_DATA);
            }
        }
        if word.end_of_type {
            if word.valid_bytes == W::FULL_MASK {
                self.rate_xor_byte(self.offset, 0x01);
            }
            self.offset = 0;
            self.enter_tag_phase();
        }
        WordOut {
            data: mask_word::<W>(data, word.valid_bytes),
            valid_bytes: word.valid_bytes,
            kind: WordKind::Msg,
        }
    }

    fn verify_tag_word(&mut self, word: WordIn<W>) {
        assert_eq!(
            word.valid_bytes,
            W::FULL_MASK,
            "tag words must be fully valid"
        );
        let mut raw = [0u8; 8];
        word.data.write_stream_bytes(&mut raw[..W::BYTES]);
        let at = self.loaded;
        for i in 0..W::BYTES {
            self.tag_diff |= raw[i] ^ self.tag[at + i];
        }
        self.loaded += W::BYTES;
        if self.loaded < TAG_BYTES {
            assert!(!word.end_of_type, "tag stream ends early");
            return;
        }
        assert!(word.end_of_type, "tag stream must close with end_of_type");
        self.loaded = 0;
        self.auth = Some(self.tag_diff == 0);
        self.phase = Phase::Done;
    }

    fn check_stream_word(&self, word: &WordIn<W>) {
        if word.end_of_type {
            assert!(
                word.valid_bytes != 0,
                "a final word must carry at least one byte"
            );
        } else {
            assert_eq!(
                word.valid_bytes,
                W::FULL_MASK,
                "non-final words must be fully valid"
            );
        }
    }

    fn enter_tag_phase(&mut self) {
        self.tag = finalize::<U>(&mut self.state, &self.key);
        match self.mode {
            Mode::Encrypt => {
                self.emitted = 0;
                self.phase = Phase::EmitTag;
            }
            Mode::Decrypt => {
                self.tag_diff = 0;
                self.loaded = 0;
                self.phase = Phase::VerifyTag;
            }
        }
    }

    /// Read a bus word out of the rate at byte offset `off`.
    fn rate_word(&self, off: usize) -> W {
        let mut bytes = [0u8; 8];
        for (i, byte) in bytes.iter_mut().take(W::BYTES).enumerate() {
            let idx = off + i;
            *byte = (self.state[idx / 8] >> (8 * (idx % 8))) as u8;
        }
        W::from_stream_bytes(&bytes[..W::BYTES])
    }

    /// XOR a bus word into the rate at byte offset `off`.
    fn rate_xor_word(&mut self, off: usize, word: W) {
        let mut bytes = [0u8; 8];
        word.write_stream_bytes(&mut bytes[..W::BYTES]);
        for (i, byte) in bytes.iter().take(W::BYTES).enumerate() {
            let idx = off + i;
            self.state[idx / 8] ^= (*byte as u64) << (8 * (idx % 8));
        }
    }

    /// Overwrite the rate at byte offset `off` with a bus word.
    fn rate_set_word(&mut self, off: usize, word: W) {
        let mut bytes = [0u8; 8];
        word.write_stream_bytes(&mut bytes[..W::BYTES]);
        for (i, byte) in bytes.iter().take(W::BYTES).enumerate() {
            let idx = off + i;
            let shift = 8 * (idx % 8);
            self.state[idx / 8] &= !(0xFF << shift);
            self.state[idx / 8] |= (*byte as u64) << shift;
        }
    }

    fn rate_xor_byte(&mut self, idx: usize, byte: u8) {
        self.state[idx / 8] ^= (byte as u64) << (8 * (idx % 8));
    }
}

/// Zero the bytes of a word outside the valid mask.
fn mask_word<W: BusWord>(word: W, valid: u8) -> W {
    let mut bytes = [0u8; 8];
    word.write_stream_bytes(&mut bytes[..W::BYTES]);
    for (i, byte) in bytes.iter_mut().take(W::BYTES).enumerate() {
        if valid & (1 << i) == 0 {
            *byte = 0;
        }
    }
    W::from_stream_bytes(&bytes[..W::BYTES])
}
