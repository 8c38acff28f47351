//! Parallel reduction of chunks.
//!
//! Chunks are packed into lane batches and each batch is hashed on a worker thread. At most
//! `2 * workers` batches are in flight at a time; submitting beyond that blocks the caller
//! until a batch completes. Completed batches come back in any order and are handed to the
//! [`RootAssembler`], which restores index order.

use std::sync::mpsc::{Receiver, Sender, channel};

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, trace};

use crate::config::Lanes;
use crate::root::RootAssembler;
use crate::worker::{ChainingValue, digest_batch};
use crate::{CHUNK_SIZE, Error};

/// Batches in flight per worker before submission blocks.
const BACKLOG_PER_WORKER: usize = 2;

/// A batch returned by a worker.
struct Completed {
    first_index: u64,
    digests: Vec<ChainingValue>,
    /// The batch bytes, handed back for reuse.
    data: Vec<u8>,
}

pub(crate) struct LaneScheduler {
    lanes: Lanes,
    workers: usize,
    /// Started on the first dispatch and kept across resets.
    pool: Option<ThreadPool>,
    sender: Sender<Completed>,
    receiver: Receiver<Completed>,
    /// Batch being filled and the index of its first chunk.
    batch: Vec<u8>,
    batch_first: u64,
    in_flight: usize,
    spare: Vec<Vec<u8>>,
    /// Makes every dispatch fail as if the pool could not be reached.
    #[cfg(test)]
    pub(crate) fail_dispatch: bool,
}

impl LaneScheduler {
    pub(crate) fn new(lanes: Lanes, workers: usize) -> Self {
        let (sender, receiver) = channel();
        Self {
            lanes,
            workers,
            pool: None,
            sender,
            receiver,
            batch: Vec::new(),
            batch_first: 0,
            in_flight: 0,
            spare: Vec::new(),
            #[cfg(test)]
            fail_dispatch: false,
        }
    }

    fn max_in_flight(&self) -> usize {
        BACKLOG_PER_WORKER * self.workers
    }

    fn batch_capacity(&self) -> usize {
        self.lanes.get() * CHUNK_SIZE
    }

    /// Queue chunk `index` (≥ 1). Dispatches the batch once it holds a chunk per lane, and
    /// forwards whatever has already completed to `root`.
    pub(crate) fn submit(
        &mut self,
        index: u64,
        chunk: &[u8],
        root: &mut RootAssembler,
    ) -> Result<(), Error> {
        debug_assert!(index >= 1);

        if self.batch.is_empty() {
            if self.batch.capacity() == 0 {
                let capacity = self.batch_capacity();
                self.batch = self.spare.pop().unwrap_or_else(|| Vec::with_capacity(capacity));
            }
            self.batch_first = index;
        }
        debug_assert_eq!(
            self.batch_first + (self.batch.len() / CHUNK_SIZE) as u64,
            index,
            "chunks must arrive in order"
        );

        self.batch.extend_from_slice(chunk);
        if self.batch.len() >= self.batch_capacity() {
            self.dispatch(root)?;
        }

        self.poll(root);
        Ok(())
    }

    /// Dispatch any partial batch and wait until every chaining value reached `root`.
    pub(crate) fn flush(&mut self, root: &mut RootAssembler) -> Result<(), Error> {
        if !self.batch.is_empty() {
            self.dispatch(root)?;
        }

        while self.in_flight > 0 {
            let completed = self.wait()?;
            self.complete(completed, root);
        }
        debug_assert_eq!(root.waiting(), 0);

        Ok(())
    }

    /// Drop the partial batch and wait out in-flight batches, discarding their results.
    pub(crate) fn reset(&mut self) {
        self.batch.clear();

        while self.in_flight > 0 {
            match self.receiver.recv() {
                Ok(completed) => {
                    self.in_flight -= 1;
                    self.recycle(completed.data);
                }
                Err(_) => {
                    // Nothing can arrive any more; start over with a fresh channel.
                    let (sender, receiver) = channel();
                    self.sender = sender;
                    self.receiver = receiver;
                    self.in_flight = 0;
                }
            }
        }
    }

    fn dispatch(&mut self, root: &mut RootAssembler) -> Result<(), Error> {
        #[cfg(test)]
        if self.fail_dispatch {
            return Err(Error::WorkerLost(self.in_flight));
        }

        // Backpressure: the only place a write blocks.
        while self.in_flight >= self.max_in_flight() {
            trace!(in_flight = self.in_flight, "chunk backlog full, waiting for a worker");
            let completed = self.wait()?;
            self.complete(completed, root);
        }

        let (lanes, workers) = (self.lanes, self.workers);
        let pool = match &mut self.pool {
            Some(pool) => pool,
            slot => {
                debug!(workers, lanes = lanes.get(), "starting chunk workers");
                slot.insert(
                    ThreadPoolBuilder::new()
                        .num_threads(workers)
                        .thread_name(|i| format!("kt128-worker-{i}"))
                        .build()?,
                )
            }
        };

        let data = core::mem::take(&mut self.batch);
        let first_index = self.batch_first;
        let sender = self.sender.clone();
        trace!(first_index, bytes = data.len(), "dispatching chunk batch");

        pool.spawn(move || {
            let digests = digest_batch(&data, lanes);
            // The hasher may have been dropped in the meantime.
            let _ = sender.send(Completed {
                first_index,
                digests,
                data,
            });
        });
        self.in_flight += 1;

        Ok(())
    }

    /// Forward completed batches to `root` without blocking.
    fn poll(&mut self, root: &mut RootAssembler) {
        while let Ok(completed) = self.receiver.try_recv() {
            self.complete(completed, root);
        }
    }

    fn wait(&mut self) -> Result<Completed, Error> {
        self.receiver
            .recv()
            .map_err(|_| Error::WorkerLost(self.in_flight))
    }

    fn complete(&mut self, completed: Completed, root: &mut RootAssembler) {
        self.in_flight -= 1;

        for (offset, cv) in completed.digests.into_iter().enumerate() {
            root.absorb_digest(completed.first_index + offset as u64, cv);
        }

        self.recycle(completed.data);
    }

    fn recycle(&mut self, mut data: Vec<u8>) {
        if self.spare.len() < self.max_in_flight() {
            data.clear();
            self.spare.push(data);
        }
    }
}
