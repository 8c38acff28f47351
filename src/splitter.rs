//! Splitting the input stream into indexed chunks.

use crate::CHUNK_SIZE;
use zeroize::Zeroizing;

/// Cuts the byte stream into [`CHUNK_SIZE`] chunks numbered from 0.
///
/// A chunk is only emitted once at least one byte past its end has been fed: until then it
/// may still turn out to be the final chunk, which is handed out by [`ChunkSplitter::finish`].
pub(crate) struct ChunkSplitter {
    buffer: Zeroizing<Vec<u8>>,
    next_index: u64,
}

impl ChunkSplitter {
    pub(crate) fn new() -> Self {
        Self {
            buffer: Zeroizing::new(Vec::with_capacity(CHUNK_SIZE)),
            next_index: 0,
        }
    }

    /// Feed more bytes, calling `emit` for every chunk that became complete.
    ///
    /// Stops at the first error returned by `emit`.
    pub(crate) fn feed<E>(
        &mut self,
        mut data: &[u8],
        mut emit: impl FnMut(u64, &[u8]) -> Result<(), E>,
    ) -> Result<(), E> {
        while !data.is_empty() {
            if self.buffer.len() == CHUNK_SIZE {
                // More input follows, so the buffered chunk is not the last one.
                emit(self.next_index, self.buffer.as_slice())?;
                self.next_index += 1;
                self.buffer.clear();
            } else if self.buffer.is_empty() && data.len() > CHUNK_SIZE {
                // Hand out whole chunks straight from the caller's slice.
                let (chunk, rest) = data.split_at(CHUNK_SIZE);
                emit(self.next_index, chunk)?;
                self.next_index += 1;
                data = rest;
            } else {
                let available = data.len().min(CHUNK_SIZE - self.buffer.len());
                self.buffer.extend_from_slice(&data[..available]);
                data = &data[available..];
            }
        }

        Ok(())
    }

    /// The final chunk: its index and the (possibly empty) buffered bytes.
    pub(crate) fn finish(&self) -> (u64, &[u8]) {
        (self.next_index, self.buffer.as_slice())
    }

    pub(crate) fn reset(&mut self) {
        self.buffer.clear();
        self.next_index = 0;
    }
}
