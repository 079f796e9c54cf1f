use crate::config::Unrolling;
use crate::consts::{RC, STATE_WORDS};

/// One round of Ascon-p: constant addition, bit-sliced S-box, linear
/// diffusion. The round constant is folded into the `a2` pre-affine
/// term, so the whole round is straight-line over the five lanes.
#[inline(always)]
fn round(state: &mut [u64; STATE_WORDS], rc: u64) {
    // Pre-affine map, with the round constant XORed into a2.
    let a0 = state[0] ^ state[4];
    let a1 = state[1];
    let a2 = state[2] ^ state[1] ^ rc;
    let a3 = state[3];
    let a4 = state[4] ^ state[3];

    // chi: b_i = a_i ^ (!a_{i+1} & a_{i+2}), indices mod 5.
    let b0 = a0 ^ (!a1 & a2);
    let b1 = a1 ^ (!a2 & a3);
    let b2 = a2 ^ (!a3 & a4);
    let b3 = a3 ^ (!a4 & a0);
    let b4 = a4 ^ (!a0 & a1);

    // Post-affine map.
    let s0 = b0 ^ b4;
    let s1 = b1 ^ b0;
    let s2 = !b2;
    let s3 = b3 ^ b2;
    let s4 = b4;

    // Linear diffusion layer.
    state[0] = s0 ^ s0.rotate_right(19) ^ s0.rotate_right(28);
    state[1] = s1 ^ s1.rotate_right(61) ^ s1.rotate_right(39);
    state[2] = s2 ^ s2.rotate_right(1) ^ s2.rotate_right(6);
    state[3] = s3 ^ s3.rotate_right(10) ^ s3.rotate_right(17);
    state[4] = s4 ^ s4.rotate_right(7) ^ s4.rotate_right(41);
}

/// Apply `rounds` rounds of Ascon-p, stepping `U::UROL` rounds at a
/// time. Round r of an N-round run takes constant `RC[16 - N + r]`, so
/// unrolled steps still see their correct per-stage constants.
#[inline(always)]
pub(crate) fn permute<U: Unrolling>(state: &mut [u64; STATE_WORDS], rounds: usize) {
    debug_assert!(rounds <= 16 && rounds % U::UROL == 0);
    let base = 16 - rounds;
    let mut r = 0;
    while r < rounds {
        for stage in 0..U::UROL {
            round(state, RC[base + r + stage]);
        }
        r += U::UROL;
    }
}
