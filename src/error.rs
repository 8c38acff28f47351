use thiserror::Error;

/// Errors reported by [`Kt128`](crate::Kt128).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported lane count: expected 1, 2, 4 or 8, got {0}")]
    UnsupportedLanes(u8),

    #[error("Worker count must be at least 1")]
    NoWorkers,

    #[error("Cannot write after output has been read")]
    AlreadyFinalized,

    #[error("Hasher failed earlier and must be reset before reuse")]
    Poisoned,

    #[error("Failed to start chunk workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Chunk worker exited with {0} batch(es) outstanding")]
    WorkerLost(usize),
}
