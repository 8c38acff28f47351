//! # Streaming KangarooTwelve (KT128)
//!
//! [`Kt128`] absorbs a message through any number of writes and squeezes output through any
//! number of reads. Chunks after the first are reduced on a pool of worker threads while the
//! caller keeps writing; the output only depends on the message, the customization string
//! and the number of bytes read.
//!
//! # Usage
//!
//! ```
//! use kangaroo12::{Config, Kt128, kt128};
//!
//! let mut hasher = Kt128::new(Config::new().with_lanes(2).with_workers(2))?;
//! hasher.write(b"Hello, ")?;
//! hasher.write(b"World!")?;
//!
//! let mut digest = [0u8; 32];
//! hasher.read(&mut digest[..16])?;
//! hasher.read(&mut digest[16..])?;
//!
//! let mut oneshot = [0u8; 32];
//! kt128(b"Hello, World!", b"", &mut oneshot);
//! assert_eq!(digest, oneshot);
//! # Ok::<(), kangaroo12::Error>(())
//! ```

use std::convert::Infallible;
use std::io;

use tracing::debug;

use crate::config::{Config, Lanes};
use crate::root::{RootAssembler, length_encode};
use crate::scheduler::LaneScheduler;
use crate::splitter::ChunkSplitter;
use crate::sponge::Sponge;
use crate::worker::digest_chunk;
use crate::{CHUNK_SIZE, Error};

/// Streaming, multi-threaded KT128 hasher.
pub struct Kt128 {
    config: Config,
    lanes: Lanes,
    splitter: ChunkSplitter,
    scheduler: LaneScheduler,
    root: RootAssembler,
    /// Message bytes written since construction or the last reset.
    written: u64,
    phase: Phase,
}

/// Where a [`Kt128`] is in its life cycle.
enum Phase {
    Absorbing,
    /// Entered by the first read; writes are rejected from then on.
    Squeezing(Sponge),
    /// A write or the finalization failed part way; only a reset recovers.
    Failed,
}

impl Kt128 {
    /// Create a hasher, rejecting unsupported lane or worker counts.
    pub fn new(config: Config) -> Result<Self, Error> {
        let lanes = config.validate()?;
        Ok(Self::with_lanes(config, lanes))
    }

    fn with_lanes(config: Config, lanes: Lanes) -> Self {
        Self {
            lanes,
            splitter: ChunkSplitter::new(),
            scheduler: LaneScheduler::new(lanes, config.workers()),
            root: RootAssembler::new(),
            written: 0,
            phase: Phase::Absorbing,
            config,
        }
    }

    /// The configuration this hasher was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Absorb `data`. Always consumes all of it.
    ///
    /// Blocks while the workers are saturated. Fails with [`Error::AlreadyFinalized`] once
    /// output has been read. A worker failure poisons the hasher: every later write or read
    /// fails with [`Error::Poisoned`] until [`Kt128::reset`].
    pub fn write(&mut self, data: &[u8]) -> Result<usize, Error> {
        match self.phase {
            Phase::Absorbing => {}
            Phase::Squeezing(_) => return Err(Error::AlreadyFinalized),
            Phase::Failed => return Err(Error::Poisoned),
        }

        if let Err(err) = feed(&mut self.splitter, &mut self.scheduler, &mut self.root, data) {
            self.phase = Phase::Failed;
            return Err(err);
        }
        self.written += data.len() as u64;

        Ok(data.len())
    }

    /// Fill `out` with the next output bytes.
    ///
    /// The first call appends the customization string, waits for every chunk to be reduced
    /// and finalizes; later calls continue the same output stream. Always fills all of `out`.
    ///
    /// An error while finalizing leaves the hasher unusable until [`Kt128::reset`].
    pub fn read(&mut self, out: &mut [u8]) -> Result<usize, Error> {
        let mut sponge = self.take_output()?;
        sponge.squeeze(out);
        self.phase = Phase::Squeezing(sponge);
        Ok(out.len())
    }

    /// Finalize if that has not happened yet and move the squeezing sponge out.
    ///
    /// Leaves the hasher in the failed phase until the sponge is put back.
    pub(crate) fn take_output(&mut self) -> Result<Sponge, Error> {
        match core::mem::replace(&mut self.phase, Phase::Failed) {
            Phase::Squeezing(sponge) => Ok(sponge),
            Phase::Absorbing => self.finalize(),
            Phase::Failed => Err(Error::Poisoned),
        }
    }

    /// Discard all input and output and start over with the same configuration.
    pub fn reset(&mut self) {
        self.scheduler.reset();
        self.splitter.reset();
        self.root.reset();
        self.written = 0;
        self.phase = Phase::Absorbing;
    }

    /// Write size that ends on the next lane-batch boundary.
    ///
    /// Writes of this size keep every worker batch full; any size is correct.
    pub fn next_write_size(&self) -> usize {
        let chunk = CHUNK_SIZE as u64;
        let batch = chunk * self.lanes.get() as u64;

        let remaining = if self.written < chunk {
            chunk - self.written
        } else {
            batch - (self.written - chunk) % batch
        };

        remaining as usize
    }

    /// Largest useful write: one full batch for every worker.
    pub fn max_write_size(&self) -> usize {
        CHUNK_SIZE * self.lanes.get() * self.config.workers()
    }

    fn finalize(&mut self) -> Result<Sponge, Error> {
        let written = self.written;
        let Self {
            config,
            splitter,
            scheduler,
            root,
            ..
        } = self;

        let (suffix, suffix_len) = length_encode(config.context().len() as u64);
        feed(splitter, scheduler, root, config.context())?;
        feed(splitter, scheduler, root, &suffix[..suffix_len])?;

        let (index, tail) = splitter.finish();
        debug_assert!(!tail.is_empty());
        debug_assert_eq!(root.is_tree(), index > 0);

        let sponge = if index == 0 {
            root.absorb_direct(tail);
            root.finalize_short()
        } else {
            scheduler.submit(index, tail, root)?;
            scheduler.flush(root)?;
            root.finalize_tree()
        };

        debug!(
            chunks = index + 1,
            written,
            tree = index > 0,
            "kt128 finalized"
        );

        Ok(sponge)
    }
}

impl Default for Kt128 {
    fn default() -> Self {
        // The default configuration always validates.
        Self::with_lanes(Config::default(), Lanes::X1)
    }
}

/// Route chunk 0 to the root and every other chunk to the workers.
fn feed(
    splitter: &mut ChunkSplitter,
    scheduler: &mut LaneScheduler,
    root: &mut RootAssembler,
    data: &[u8],
) -> Result<(), Error> {
    splitter.feed(data, |index, chunk| {
        if index == 0 {
            root.absorb_direct(chunk);
            root.enter_tree();
            Ok(())
        } else {
            scheduler.submit(index, chunk, root)
        }
    })
}

/// Hash `message` with customization string `context` into `output` on the calling thread.
///
/// Produces the same bytes as [`Kt128`] with any configuration.
///
/// # Example
///
/// ```
/// use kangaroo12::kt128;
///
/// let mut digest = [0u8; 32];
/// kt128(b"", b"", &mut digest);
/// assert_eq!(digest[..4], [0x1a, 0xc2, 0xd4, 0x50]);
/// ```
pub fn kt128(message: &[u8], context: &[u8], output: &mut [u8]) {
    let mut splitter = ChunkSplitter::new();
    let mut root = RootAssembler::new();
    let (suffix, suffix_len) = length_encode(context.len() as u64);

    for part in [message, context, &suffix[..suffix_len]] {
        let Ok(()) = splitter.feed(part, |index, chunk| {
            if index == 0 {
                root.absorb_direct(chunk);
                root.enter_tree();
            } else {
                root.absorb_digest(index, digest_chunk(chunk));
            }
            Ok::<_, Infallible>(())
        });
    }

    let (index, tail) = splitter.finish();
    let mut sponge = if index == 0 {
        root.absorb_direct(tail);
        root.finalize_short()
    } else {
        root.absorb_digest(index, digest_chunk(tail));
        root.finalize_tree()
    };

    sponge.squeeze(output);
}

impl io::Write for Kt128 {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Kt128::write(self, buf).map_err(io::Error::other)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Output never ends: `read` always fills the whole buffer, so `read_to_end` does not return.
impl io::Read for Kt128 {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Kt128::read(self, buf).map_err(io::Error::other)
    }
}

#[cfg(test)]
mod tests;
