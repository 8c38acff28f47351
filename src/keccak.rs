//! # Keccak-p[1600, 12] permutation
//!
//! The permutation operates on a 1600-bit state as 25 64-bit lanes, little-endian, indexed
//! `x + 5 * y`. KangarooTwelve uses the reduced 12-round variant, i.e. the last 12 rounds of
//! Keccak-f[1600].

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Number of rounds applied by Keccak-p[1600, 12].
pub(crate) const ROUNDS: usize = 12;

/// Number of 64-bit words in the state.
pub(crate) const WORDS: usize = 25;

mod portable;

/// Keccak state: 25 u64 words (1600 bits).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct State(pub(crate) [u64; WORDS]);

impl State {
    /// Create a new, all-zero state.
    #[inline(always)]
    pub const fn new() -> Self {
        Self([0; WORDS])
    }

    /// XOR `data` into the state starting at byte `offset`.
    ///
    /// `offset + data.len()` must not exceed the state size.
    #[inline]
    pub(crate) fn xor_bytes(&mut self, offset: usize, data: &[u8]) {
        debug_assert!(offset + data.len() <= WORDS * 8);

        let mut pos = offset;
        let mut data = data;

        // Leading bytes up to a word boundary.
        while pos % 8 != 0 && !data.is_empty() {
            self.xor_byte(pos, data[0]);
            pos += 1;
            data = &data[1..];
        }

        // Whole words.
        let mut words = data.chunks_exact(8);
        for word in &mut words {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(word);
            self.0[pos / 8] ^= u64::from_le_bytes(bytes);
            pos += 8;
        }

        for &byte in words.remainder() {
            self.xor_byte(pos, byte);
            pos += 1;
        }
    }

    /// XOR a single byte into the state at byte position `pos`.
    #[inline(always)]
    pub(crate) fn xor_byte(&mut self, pos: usize, byte: u8) {
        self.0[pos / 8] ^= u64::from(byte) << (8 * (pos % 8));
    }

    /// Copy `out.len()` bytes of the state, starting at byte `offset`, into `out`.
    #[inline]
    pub(crate) fn extract_bytes(&self, offset: usize, out: &mut [u8]) {
        debug_assert!(offset + out.len() <= WORDS * 8);

        for (i, byte) in out.iter_mut().enumerate() {
            let pos = offset + i;
            *byte = (self.0[pos / 8] >> (8 * (pos % 8))) as u8;
        }
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply Keccak-p[1600, 12] to a single state.
#[inline(always)]
pub(crate) fn keccak_p12(state: &mut State) {
    portable::keccak_p12(&mut state.0);
}

/// Apply Keccak-p[1600, 12] to `N` independent states, advancing them round by round together
/// so the compiler can interleave (and vectorize) the lanes.
#[inline(always)]
pub(crate) fn keccak_p12_lanes<const N: usize>(states: &mut [State; N]) {
    portable::keccak_p12_lanes(states);
}
