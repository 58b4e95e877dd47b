use std::thread;

use crate::error::{Error, Result};

pub const DEFAULT_BLOCK_SIZE: usize = 4 * 1024 * 1024;

/// Knobs for one aggregation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Size of each read window in bytes.
    pub block_size: usize,
    /// Number of aggregation threads.
    pub workers: usize,
    /// Read buffers in flight between the reader and the workers.
    pub buffers: usize,
    /// Write progress and timing to stderr.
    pub verbose: bool,
}

impl Config {
    pub fn with_workers(workers: usize) -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            workers,
            buffers: workers * 2,
            verbose: false,
        }
    }

    pub fn block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(Error::InvalidConfig("block size must be positive"));
        }
        if self.workers == 0 {
            return Err(Error::InvalidConfig("need at least one worker"));
        }
        if self.buffers < self.workers {
            return Err(Error::InvalidConfig("need at least one buffer per worker"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let workers = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self::with_workers(workers)
    }
}
