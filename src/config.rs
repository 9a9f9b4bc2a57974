//! Runtime configuration for the vanity address generator.

use clap::Parser;

use crate::error::Result;
use crate::matcher::{Pattern, VanityPosition};
use crate::worker::{default_worker_count, optimal_batch_size};

/// MANTRA Vanity Address Generator
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Pattern to search for (bech32 characters only)
    #[arg(short, long)]
    pub pattern: String,

    /// Position: prefix, suffix, or anywhere
    #[arg(short = 't', long, default_value = "anywhere")]
    pub position: VanityPosition,

    /// Number of worker threads (default: CPU cores minus one)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Candidates per batch (default: derived from pattern length)
    #[arg(short = 'b', long)]
    pub batch_size: Option<usize>,

    /// Stop after this many attempts (0 = search until found)
    #[arg(short = 'm', long, default_value = "0")]
    pub max_attempts: u64,

    /// Progress report interval in seconds
    #[arg(short = 'r', long, default_value = "5")]
    pub report_interval: u64,
}

impl Config {
    /// Returns the number of workers, defaulting to core count minus a
    /// reserve.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(default_worker_count)
    }

    /// Returns the batch size, defaulting by pattern length.
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size
            .unwrap_or_else(|| optimal_batch_size(self.pattern.len()))
    }

    /// Validates the configuration and compiles the search pattern.
    pub fn to_pattern(&self) -> Result<Pattern> {
        Pattern::new(self.pattern.clone(), self.position)
    }
}
