//! Interchangeable search execution strategies.
//!
//! Capability degradation is modeled as three implementations of one
//! trait instead of nested error handlers: parallel coordinator,
//! single-threaded batches, single candidate per step. [`FallbackSearch`]
//! owns the chain and demotes one tier whenever the active tier loses
//! its workers, so every caller goes through the same path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::crypto::Keypair;
use crate::error::{Result, VanityError};
use crate::matcher::Pattern;

use super::batch::{optimal_batch_size, BatchSearcher, SearchState};
use super::coordinator::{default_worker_count, RoundOutcome, SearchCoordinator};

/// Pause between single-threaded batches so the host thread is not
/// starved when no worker pool is available.
const BATCH_YIELD: Duration = Duration::from_millis(1);

/// Outcome of one bounded step of search work.
#[derive(Debug)]
pub enum StepOutcome {
    /// A matching keypair was found; the search is over.
    Found(Keypair),
    /// The step completed without a match; call `step` again.
    Continue,
}

/// One bounded unit of search execution.
///
/// Every implementation returns from `step` within a time window bounded
/// by its batch sizing, independent of pattern rarity, so the caller can
/// report progress and honor cancellation between steps.
pub trait SearchStrategy {
    /// Runs one batch/round of work against the pattern.
    fn step(&mut self, pattern: &Pattern) -> Result<StepOutcome>;

    /// Attempts counted so far (upper bound, in batch-size units).
    fn total_attempts(&self) -> u64;

    /// Current session state.
    fn state(&self) -> SearchState;

    /// Human-readable tier name for logs and the CLI banner.
    fn name(&self) -> &'static str;
}

/// Tier 1: N parallel workers behind a round coordinator.
pub struct ParallelStrategy {
    coordinator: SearchCoordinator,
    batch_size: usize,
}

impl ParallelStrategy {
    pub fn new(num_workers: usize, batch_size: usize) -> Result<Self> {
        Ok(Self {
            coordinator: SearchCoordinator::new(num_workers)?,
            batch_size,
        })
    }

    pub fn coordinator(&self) -> &SearchCoordinator {
        &self.coordinator
    }
}

impl SearchStrategy for ParallelStrategy {
    fn step(&mut self, pattern: &Pattern) -> Result<StepOutcome> {
        match self.coordinator.run_round(pattern, self.batch_size)? {
            RoundOutcome::Found(keypair) => Ok(StepOutcome::Found(keypair)),
            RoundOutcome::NoMatch => Ok(StepOutcome::Continue),
        }
    }

    fn total_attempts(&self) -> u64 {
        self.coordinator.total_attempts()
    }

    fn state(&self) -> SearchState {
        self.coordinator.state()
    }

    fn name(&self) -> &'static str {
        "parallel"
    }
}

/// Tier 2: one execution context running full batches, yielding briefly
/// between them.
pub struct SingleThreadBatch {
    searcher: BatchSearcher,
    batch_size: usize,
    stop_flag: Arc<AtomicBool>,
    attempts: u64,
    state: SearchState,
}

impl SingleThreadBatch {
    pub fn new(batch_size: usize, stop_flag: Arc<AtomicBool>) -> Self {
        Self {
            searcher: BatchSearcher::new(),
            batch_size,
            stop_flag,
            attempts: 0,
            state: SearchState::Idle,
        }
    }
}

impl SearchStrategy for SingleThreadBatch {
    fn step(&mut self, pattern: &Pattern) -> Result<StepOutcome> {
        if self.stop_flag.load(Ordering::Relaxed) {
            self.state = SearchState::Stopped;
            return Ok(StepOutcome::Continue);
        }
        self.state = SearchState::Searching;

        let outcome = self.searcher.search_batch(pattern, self.batch_size)?;
        self.attempts += self.batch_size as u64;

        if let Some(keypair) = outcome.keypair {
            self.state = SearchState::Found;
            return Ok(StepOutcome::Found(keypair));
        }

        thread::sleep(BATCH_YIELD);
        Ok(StepOutcome::Continue)
    }

    fn total_attempts(&self) -> u64 {
        self.attempts
    }

    fn state(&self) -> SearchState {
        self.state
    }

    fn name(&self) -> &'static str {
        "single-thread batch"
    }
}

/// Tier 3: one candidate per step, for hosts where even batching is too
/// coarse a cancellation granularity.
pub struct PerCandidate {
    searcher: BatchSearcher,
    stop_flag: Arc<AtomicBool>,
    attempts: u64,
    state: SearchState,
}

impl PerCandidate {
    pub fn new(stop_flag: Arc<AtomicBool>) -> Self {
        Self {
            searcher: BatchSearcher::new(),
            stop_flag,
            attempts: 0,
            state: SearchState::Idle,
        }
    }
}

impl SearchStrategy for PerCandidate {
    fn step(&mut self, pattern: &Pattern) -> Result<StepOutcome> {
        if self.stop_flag.load(Ordering::Relaxed) {
            self.state = SearchState::Stopped;
            return Ok(StepOutcome::Continue);
        }
        self.state = SearchState::Searching;

        let outcome = self.searcher.search_batch(pattern, 1)?;
        self.attempts += 1;

        match outcome.keypair {
            Some(keypair) => {
                self.state = SearchState::Found;
                Ok(StepOutcome::Found(keypair))
            }
            None => Ok(StepOutcome::Continue),
        }
    }

    fn total_attempts(&self) -> u64 {
        self.attempts
    }

    fn state(&self) -> SearchState {
        self.state
    }

    fn name(&self) -> &'static str {
        "per-candidate"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Parallel,
    Batch,
    PerCandidate,
}

/// The full capability chain behind one [`SearchStrategy`] face.
///
/// Probes the environment at construction and starts on the best
/// available tier; whenever the active tier reports its workers gone it
/// is demoted one tier (parallel -> single-thread batch -> per-candidate)
/// with attempts carried over, so the search continues instead of
/// failing. Only the last tier's loss surfaces as an error.
pub struct FallbackSearch {
    strategy: Box<dyn SearchStrategy>,
    tier: Tier,
    batch_size: usize,
    stop_flag: Arc<AtomicBool>,
    carried_attempts: u64,
}

impl FallbackSearch {
    /// Creates the chain, probing parallel capacity first.
    ///
    /// Worker startup failure is logged and recovered by starting one
    /// tier down, never surfaced as fatal.
    pub fn new(workers: Option<usize>, batch_size: usize, stop_flag: Arc<AtomicBool>) -> Self {
        let num_workers = workers.unwrap_or_else(default_worker_count);

        let (strategy, tier): (Box<dyn SearchStrategy>, Tier) = if num_workers > 1 {
            match ParallelStrategy::new(num_workers, batch_size) {
                Ok(strategy) => (Box::new(strategy), Tier::Parallel),
                Err(e) => {
                    warn!(%e, "parallel workers unavailable, starting single-threaded");
                    (
                        Box::new(SingleThreadBatch::new(batch_size, stop_flag.clone())),
                        Tier::Batch,
                    )
                }
            }
        } else {
            (
                Box::new(SingleThreadBatch::new(batch_size, stop_flag.clone())),
                Tier::Batch,
            )
        };

        Self {
            strategy,
            tier,
            batch_size,
            stop_flag,
            carried_attempts: 0,
        }
    }

    #[cfg(test)]
    fn from_parts(strategy: Box<dyn SearchStrategy>, tier: Tier, batch_size: usize) -> Self {
        Self {
            strategy,
            tier,
            batch_size,
            stop_flag: Arc::new(AtomicBool::new(false)),
            carried_attempts: 0,
        }
    }

    /// Drops to the next tier, keeping the attempt count. Returns false
    /// when already on the last tier.
    fn demote(&mut self) -> bool {
        self.carried_attempts += self.strategy.total_attempts();
        match self.tier {
            Tier::Parallel => {
                warn!("worker pool lost, falling back to single-thread batches");
                self.strategy = Box::new(SingleThreadBatch::new(
                    self.batch_size,
                    self.stop_flag.clone(),
                ));
                self.tier = Tier::Batch;
                true
            }
            Tier::Batch => {
                warn!("batch tier unavailable, falling back to per-candidate search");
                self.strategy = Box::new(PerCandidate::new(self.stop_flag.clone()));
                self.tier = Tier::PerCandidate;
                true
            }
            Tier::PerCandidate => false,
        }
    }
}

impl SearchStrategy for FallbackSearch {
    fn step(&mut self, pattern: &Pattern) -> Result<StepOutcome> {
        match self.strategy.step(pattern) {
            Err(VanityError::WorkersUnavailable) if self.demote() => Ok(StepOutcome::Continue),
            other => other,
        }
    }

    fn total_attempts(&self) -> u64 {
        self.carried_attempts + self.strategy.total_attempts()
    }

    fn state(&self) -> SearchState {
        self.strategy.state()
    }

    fn name(&self) -> &'static str {
        self.strategy.name()
    }
}

/// Drives a strategy until a match, exhaustion of `max_attempts`
/// (0 = unbounded) or a stop request.
pub fn run_search(
    strategy: &mut dyn SearchStrategy,
    pattern: &Pattern,
    max_attempts: u64,
    stop_flag: &AtomicBool,
) -> Result<Option<Keypair>> {
    loop {
        if stop_flag.load(Ordering::Relaxed) {
            return Ok(None);
        }
        if max_attempts > 0 && strategy.total_attempts() >= max_attempts {
            return Ok(None);
        }

        match strategy.step(pattern)? {
            StepOutcome::Found(keypair) => return Ok(Some(keypair)),
            StepOutcome::Continue => {
                if strategy.state() == SearchState::Stopped {
                    return Ok(None);
                }
            }
        }
    }
}

/// Runs one search through the full fallback chain.
pub fn search_with_fallback(
    workers: Option<usize>,
    pattern: &Pattern,
    max_attempts: u64,
    stop_flag: Arc<AtomicBool>,
) -> Result<Option<Keypair>> {
    let batch_size = optimal_batch_size(pattern.pattern().len());
    let mut strategy = FallbackSearch::new(workers, batch_size, stop_flag.clone());
    run_search(&mut strategy, pattern, max_attempts, &stop_flag)
}
