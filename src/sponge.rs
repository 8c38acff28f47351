//! # TurboSHAKE128 sponge
//!
//! The sponge every node of the KangarooTwelve tree is hashed with: Keccak-p[1600, 12] with a
//! 168-byte rate, padded with a caller-chosen domain separation byte.
//!
//! # Sponge Construction
//!
//! - Rate: 168 bytes (1344 bits) - data absorbed per permutation
//! - Capacity: 32 bytes (256 bits) - security parameter
//! - Padding: domain byte at the current position, `0x80` at the end of the rate
//!
//! A [`Sponge`] absorbs until [`Sponge::finalize`] is called and squeezes afterwards; the two
//! phases never interleave.

use crate::RATE;
use crate::keccak::{State, keccak_p12};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Padding marker byte, XORed into the last byte of the rate.
pub(crate) const PADDING_MARKER: u8 = 0x80;

/// TurboSHAKE128 sponge context.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub(crate) struct Sponge {
    state: State,
    /// Byte position inside the current rate block.
    pos: usize,
    squeezing: bool,
}

impl Sponge {
    /// Create a new sponge in the absorbing phase.
    pub(crate) const fn new() -> Self {
        Self {
            state: State::new(),
            pos: 0,
            squeezing: false,
        }
    }

    /// Absorb more data.
    pub(crate) fn absorb(&mut self, data: &[u8]) {
        debug_assert!(!self.squeezing, "absorb after finalize");

        let mut data = data;
        while !data.is_empty() {
            // Copy as much as we can: either all remaining input, or until the block is full.
            let available = data.len().min(RATE - self.pos);
            self.state.xor_bytes(self.pos, &data[..available]);
            self.pos += available;
            data = &data[available..];

            // Full block, permute it.
            if self.pos == RATE {
                keccak_p12(&mut self.state);
                self.pos = 0;
            }
        }
    }

    /// Pad with the domain separation byte and switch to squeezing.
    pub(crate) fn finalize(&mut self, domain: u8) {
        debug_assert!(!self.squeezing, "finalize called twice");
        debug_assert!(domain != 0 && domain < 0x80);

        // Padding: domain separation at current position, padding marker at end of rate.
        self.state.xor_byte(self.pos, domain);
        self.state.xor_byte(RATE - 1, PADDING_MARKER);

        keccak_p12(&mut self.state);

        self.pos = 0;
        self.squeezing = true;
    }

    /// Fill `out` with the next squeezed bytes.
    pub(crate) fn squeeze(&mut self, out: &mut [u8]) {
        debug_assert!(self.squeezing, "squeeze before finalize");

        let mut out = out;
        while !out.is_empty() {
            if self.pos == RATE {
                keccak_p12(&mut self.state);
                self.pos = 0;
            }

            let available = out.len().min(RATE - self.pos);
            let (head, tail) = out.split_at_mut(available);
            self.state.extract_bytes(self.pos, head);
            self.pos += available;
            out = tail;
        }
    }

    /// Return to the initial absorbing state.
    pub(crate) fn reset(&mut self) {
        self.zeroize();
    }
}

impl Default for Sponge {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot TurboSHAKE128 of `data` with the given domain byte.
pub(crate) fn turboshake128(data: &[u8], domain: u8, out: &mut [u8]) {
    let mut sponge = Sponge::new();
    sponge.absorb(data);
    sponge.finalize(domain);
    sponge.squeeze(out);
}
