//! Configuration for the processor module.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Configuration for the conversion worker pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Maximum parallel jobs. Defaults to the host's available parallelism.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<usize>,
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(4)
}

impl ProcessorConfig {
    /// Sets the maximum parallel jobs.
    pub fn with_max_workers(mut self, max: usize) -> Self {
        self.max_workers = Some(max);
        self
    }

    /// Effective pool size, never zero.
    pub fn worker_count(&self) -> usize {
        self.max_workers.unwrap_or_else(default_workers).max(1)
    }
}
