//! Hasher configuration.

use crate::Error;

/// Number of chunks a single worker invocation hashes side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lanes {
    X1 = 1,
    X2 = 2,
    X4 = 4,
    X8 = 8,
}

impl Lanes {
    /// Lane count as a number.
    pub const fn get(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for Lanes {
    type Error = Error;

    fn try_from(lanes: u8) -> Result<Self, Self::Error> {
        match lanes {
            1 => Ok(Self::X1),
            2 => Ok(Self::X2),
            4 => Ok(Self::X4),
            8 => Ok(Self::X8),
            other => Err(Error::UnsupportedLanes(other)),
        }
    }
}

/// Configuration of a [`Kt128`](crate::Kt128) hasher.
///
/// Lanes and workers only change how the work is spread out, never the output.
///
/// ```
/// use kangaroo12::{Config, Kt128};
///
/// let config = Config::new().with_context(b"my app").with_lanes(4).with_workers(2);
/// let hasher = Kt128::new(config).expect("valid configuration");
/// assert_eq!(hasher.config().lanes(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    context: Vec<u8>,
    lanes: u8,
    workers: usize,
}

impl Config {
    /// Default configuration: empty context, one lane, one worker per available CPU.
    pub fn new() -> Self {
        Self {
            context: Vec::new(),
            lanes: 1,
            workers: host_parallelism(),
        }
    }

    /// Set the customization string.
    pub fn with_context(mut self, context: impl Into<Vec<u8>>) -> Self {
        self.context = context.into();
        self
    }

    /// Set the lane width. Must be 1, 2, 4 or 8.
    pub fn with_lanes(mut self, lanes: u8) -> Self {
        self.lanes = lanes;
        self
    }

    /// Set the number of worker threads. Must be at least 1.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// The customization string.
    pub fn context(&self) -> &[u8] {
        &self.context
    }

    /// The requested lane width, not yet validated.
    pub fn lanes(&self) -> u8 {
        self.lanes
    }

    /// The number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    pub(crate) fn validate(&self) -> Result<Lanes, Error> {
        let lanes = Lanes::try_from(self.lanes)?;
        if self.workers == 0 {
            return Err(Error::NoWorkers);
        }
        Ok(lanes)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn host_parallelism() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}
