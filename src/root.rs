//! The final node of the tree.
//!
//! The root sponge absorbs chunk 0 as is, then the chaining values of chunks 1.. in index
//! order, and finally the chunk count. Chaining values may be handed in out of order; they are
//! parked in a reassembly buffer until every lower index has been absorbed.

use std::collections::BTreeMap;

use crate::sponge::Sponge;
use crate::worker::ChainingValue;

/// Domain separation byte for inputs that fit in a single chunk.
const DOMAIN_SHORT: u8 = 0x07;

/// Domain separation byte for the final node in tree mode.
const DOMAIN_TREE: u8 = 0x06;

/// Marker absorbed right after chunk 0 in tree mode.
const TREE_MARKER: [u8; 8] = [0x03, 0, 0, 0, 0, 0, 0, 0];

/// Terminator absorbed after the encoded chunk count.
const TREE_TERMINATOR: [u8; 2] = [0xff, 0xff];

/// Encode `x` as its big-endian bytes without leading zeros, followed by the number of those
/// bytes. Zero encodes as the single byte `0x00`.
///
/// Returns the buffer and the number of bytes used.
pub(crate) fn length_encode(x: u64) -> ([u8; 9], usize) {
    let mut encoded = [0u8; 9];
    let len = (u64::BITS - x.leading_zeros()).div_ceil(8) as usize;

    encoded[..len].copy_from_slice(&x.to_be_bytes()[8 - len..]);
    encoded[len] = len as u8;

    (encoded, len + 1)
}

pub(crate) struct RootAssembler {
    sponge: Sponge,
    /// Index of the next chaining value to absorb.
    next_index: u64,
    pending: BTreeMap<u64, ChainingValue>,
    tree: bool,
}

impl RootAssembler {
    pub(crate) fn new() -> Self {
        Self {
            sponge: Sponge::new(),
            next_index: 1,
            pending: BTreeMap::new(),
            tree: false,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.sponge.reset();
        self.next_index = 1;
        self.pending.clear();
        self.tree = false;
    }

    /// Absorb bytes of chunk 0.
    pub(crate) fn absorb_direct(&mut self, bytes: &[u8]) {
        debug_assert!(!self.tree, "chunk 0 already closed");
        self.sponge.absorb(bytes);
    }

    /// Close chunk 0: the input is known to span more than one chunk.
    pub(crate) fn enter_tree(&mut self) {
        debug_assert!(!self.tree);
        self.sponge.absorb(&TREE_MARKER);
        self.tree = true;
    }

    /// Hand in the chaining value of chunk `index`.
    pub(crate) fn absorb_digest(&mut self, index: u64, cv: ChainingValue) {
        debug_assert!(self.tree, "chaining value before chunk 0 was closed");
        debug_assert!(index >= self.next_index, "chunk {index} absorbed twice");

        if index != self.next_index {
            self.pending.insert(index, cv);
            return;
        }

        self.sponge.absorb(&cv);
        self.next_index += 1;

        while let Some(cv) = self.pending.remove(&self.next_index) {
            self.sponge.absorb(&cv);
            self.next_index += 1;
        }
    }

    /// Number of chaining values absorbed so far.
    pub(crate) fn absorbed(&self) -> u64 {
        self.next_index - 1
    }

    /// Number of chaining values waiting for a lower index.
    pub(crate) fn waiting(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn is_tree(&self) -> bool {
        self.tree
    }

    /// Finish a single-chunk input and return the sponge, ready to squeeze.
    pub(crate) fn finalize_short(&mut self) -> Sponge {
        debug_assert!(!self.tree);

        let mut sponge = core::mem::take(&mut self.sponge);
        sponge.finalize(DOMAIN_SHORT);
        sponge
    }

    /// Finish a tree input and return the sponge, ready to squeeze.
    ///
    /// Every chaining value must have been absorbed.
    pub(crate) fn finalize_tree(&mut self) -> Sponge {
        debug_assert!(self.tree);
        debug_assert!(self.pending.is_empty(), "gap in chaining values");

        let (count, len) = length_encode(self.absorbed());

        let mut sponge = core::mem::take(&mut self.sponge);
        sponge.absorb(&count[..len]);
        sponge.absorb(&TREE_TERMINATOR);
        sponge.finalize(DOMAIN_TREE);
        sponge
    }
}
