//! Chunk digest computation.
//!
//! Every chunk after the first is reduced to a [`ChainingValue`] with TurboSHAKE128 and the
//! chunk domain byte. Full chunks in a batch are hashed side by side, up to the configured
//! lane width, using one private permutation state per lane.

use crate::config::Lanes;
use crate::keccak::{State, keccak_p12_lanes};
use crate::sponge::{PADDING_MARKER, turboshake128};
use crate::{CHUNK_SIZE, CV_SIZE, RATE};

/// Domain separation byte for non-root chunks.
pub(crate) const DOMAIN_CHUNK: u8 = 0x0b;

/// Digest of one non-root chunk.
pub(crate) type ChainingValue = [u8; CV_SIZE];

/// Reduce a single chunk of at most [`CHUNK_SIZE`] bytes.
pub(crate) fn digest_chunk(chunk: &[u8]) -> ChainingValue {
    debug_assert!(!chunk.is_empty() && chunk.len() <= CHUNK_SIZE);

    let mut cv = [0u8; CV_SIZE];
    turboshake128(chunk, DOMAIN_CHUNK, &mut cv);
    cv
}

/// Reduce `N` full chunks at once, one permutation state per chunk.
fn digest_full_chunks<const N: usize>(chunks: &[u8]) -> [ChainingValue; N] {
    debug_assert_eq!(chunks.len(), N * CHUNK_SIZE);

    let lane = |i: usize| &chunks[i * CHUNK_SIZE..(i + 1) * CHUNK_SIZE];
    let mut states: [State; N] = core::array::from_fn(|_| State::new());

    // Absorb phase: whole rate blocks.
    let blocks = CHUNK_SIZE / RATE;
    for block in 0..blocks {
        for (i, state) in states.iter_mut().enumerate() {
            state.xor_bytes(0, &lane(i)[block * RATE..(block + 1) * RATE]);
        }
        keccak_p12_lanes(&mut states);
    }

    // Final partial block with padding.
    let tail = CHUNK_SIZE - blocks * RATE;
    for (i, state) in states.iter_mut().enumerate() {
        state.xor_bytes(0, &lane(i)[blocks * RATE..]);
        state.xor_byte(tail, DOMAIN_CHUNK);
        state.xor_byte(RATE - 1, PADDING_MARKER);
    }
    keccak_p12_lanes(&mut states);

    core::array::from_fn(|i| {
        let mut cv = [0u8; CV_SIZE];
        states[i].extract_bytes(0, &mut cv);
        cv
    })
}

/// Reduce a batch of consecutive chunks.
///
/// `data` holds the chunks back to back; only the last one may be shorter than
/// [`CHUNK_SIZE`]. The result holds one chaining value per chunk, in order, and does not
/// depend on `lanes`.
pub(crate) fn digest_batch(data: &[u8], lanes: Lanes) -> Vec<ChainingValue> {
    let mut digests = Vec::with_capacity(data.len().div_ceil(CHUNK_SIZE));
    let width = lanes.get();

    let mut rest = data;
    while !rest.is_empty() {
        let full = rest.len() / CHUNK_SIZE;

        let taken = if width >= 8 && full >= 8 {
            digests.extend(digest_full_chunks::<8>(&rest[..8 * CHUNK_SIZE]));
            8 * CHUNK_SIZE
        } else if width >= 4 && full >= 4 {
            digests.extend(digest_full_chunks::<4>(&rest[..4 * CHUNK_SIZE]));
            4 * CHUNK_SIZE
        } else if width >= 2 && full >= 2 {
            digests.extend(digest_full_chunks::<2>(&rest[..2 * CHUNK_SIZE]));
            2 * CHUNK_SIZE
        } else {
            let len = rest.len().min(CHUNK_SIZE);
            digests.push(digest_chunk(&rest[..len]));
            len
        };

        rest = &rest[taken..];
    }

    digests
}
