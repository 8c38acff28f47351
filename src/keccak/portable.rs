//! Portable scalar implementation of the Keccak-p[1600, 12] permutation.

use super::{ROUNDS, State, WORDS};

/// Round constants of Keccak-f[1600]; the 12-round variant uses the last 12.
const ROUND_CONSTANTS: [u64; 24] = [
    0x0000_0000_0000_0001,
    0x0000_0000_0000_8082,
    0x8000_0000_0000_808a,
    0x8000_0000_8000_8000,
    0x0000_0000_0000_808b,
    0x0000_0000_8000_0001,
    0x8000_0000_8000_8081,
    0x8000_0000_0000_8009,
    0x0000_0000_0000_008a,
    0x0000_0000_0000_0088,
    0x0000_0000_8000_8009,
    0x0000_0000_8000_000a,
    0x0000_0000_8000_808b,
    0x8000_0000_0000_008b,
    0x8000_0000_0000_8089,
    0x8000_0000_0000_8003,
    0x8000_0000_0000_8002,
    0x8000_0000_0000_0080,
    0x0000_0000_0000_800a,
    0x8000_0000_8000_000a,
    0x8000_0000_8000_8081,
    0x8000_0000_0000_8080,
    0x0000_0000_8000_0001,
    0x8000_0000_8000_8008,
];

/// Rotation offsets for the combined rho and pi steps, in pi traversal order.
const RHO: [u32; 24] = [
    1, 3, 6, 10, 15, 21, 28, 36, 45, 55, 2, 14, 27, 41, 56, 8, 25, 43, 62, 18, 39, 61, 20, 44,
];

/// Destination lane of each step of the pi traversal, starting from lane 1.
const PI: [usize; 24] = [
    10, 7, 11, 17, 18, 3, 5, 16, 8, 21, 24, 4, 15, 23, 19, 13, 12, 2, 20, 14, 22, 9, 6, 1,
];

#[inline(always)]
fn round(a: &mut [u64; WORDS], round_constant: u64) {
    // Theta.
    let mut c = [0u64; 5];
    for x in 0..5 {
        c[x] = a[x] ^ a[x + 5] ^ a[x + 10] ^ a[x + 15] ^ a[x + 20];
    }
    for x in 0..5 {
        let d = c[(x + 4) % 5] ^ c[(x + 1) % 5].rotate_left(1);
        for y in 0..5 {
            a[5 * y + x] ^= d;
        }
    }

    // Rho and pi.
    let mut last = a[1];
    for i in 0..24 {
        let j = PI[i];
        let tmp = a[j];
        a[j] = last.rotate_left(RHO[i]);
        last = tmp;
    }

    // Chi.
    for y in 0..5 {
        let row = [a[5 * y], a[5 * y + 1], a[5 * y + 2], a[5 * y + 3], a[5 * y + 4]];
        for x in 0..5 {
            a[5 * y + x] = row[x] ^ (!row[(x + 1) % 5] & row[(x + 2) % 5]);
        }
    }

    // Iota.
    a[0] ^= round_constant;
}

/// Portable implementation of Keccak-p[1600, 12].
pub(crate) fn keccak_p12(a: &mut [u64; WORDS]) {
    for &round_constant in &ROUND_CONSTANTS[24 - ROUNDS..] {
        round(a, round_constant);
    }
}

/// Keccak-p[1600, 12] over `N` states, round-interleaved.
pub(crate) fn keccak_p12_lanes<const N: usize>(states: &mut [State; N]) {
    for &round_constant in &ROUND_CONSTANTS[24 - ROUNDS..] {
        for state in states.iter_mut() {
            round(&mut state.0, round_constant);
        }
    }
}
