//! Round-based coordination of parallel search workers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{debug, warn};

use crate::crypto::Keypair;
use crate::error::{Result, VanityError};
use crate::matcher::Pattern;

use super::batch::{BatchSearcher, SearchState};

/// Workers held back from the pool so the host stays responsive.
const WORKER_RESERVE: usize = 1;

/// Default bound on how long a worker may take to answer one round.
const DEFAULT_ROUND_TIMEOUT: Duration = Duration::from_secs(30);

/// Returns the default worker count: available cores minus a reserve,
/// never less than one.
pub fn default_worker_count() -> usize {
    num_cpus::get().saturating_sub(WORKER_RESERVE).max(1)
}

/// Executes one batch of search work. Implemented by the real
/// [`BatchSearcher`]-backed worker; tests substitute scripted runners.
pub trait BatchRunner: Send {
    fn run_batch(&mut self, pattern: &Pattern, batch_size: usize) -> Result<Option<Keypair>>;
}

impl BatchRunner for BatchSearcher {
    fn run_batch(&mut self, pattern: &Pattern, batch_size: usize) -> Result<Option<Keypair>> {
        Ok(self.search_batch(pattern, batch_size)?.keypair)
    }
}

/// One round of work for one worker.
struct Job {
    round: u64,
    pattern: Pattern,
    batch_size: usize,
}

/// A worker's answer for one round.
enum Reply {
    Found {
        worker_id: usize,
        round: u64,
        keypair: Keypair,
    },
    BatchComplete {
        worker_id: usize,
        round: u64,
    },
    Failed {
        worker_id: usize,
        round: u64,
        error: String,
    },
}

impl Reply {
    fn round(&self) -> u64 {
        match self {
            Reply::Found { round, .. }
            | Reply::BatchComplete { round, .. }
            | Reply::Failed { round, .. } => *round,
        }
    }

    fn worker_id(&self) -> usize {
        match self {
            Reply::Found { worker_id, .. }
            | Reply::BatchComplete { worker_id, .. }
            | Reply::Failed { worker_id, .. } => *worker_id,
        }
    }
}

struct WorkerHandle {
    id: usize,
    job_tx: Sender<Job>,
    handle: JoinHandle<()>,
}

/// Outcome of a single coordinated round.
#[derive(Debug)]
pub enum RoundOutcome {
    /// One of the workers found a match this round
    Found(Keypair),
    /// Every live worker completed its batch without a match
    NoMatch,
}

/// Owns a set of independent search workers and fans identical batches
/// out to them, one barrier-synchronized round at a time.
///
/// Each worker thread owns its own [`BatchSearcher`], hence its own
/// entropy stream; nothing is shared between workers beyond the job and
/// reply channels. The coordinator is a plain owned value: dropping it
/// closes the job channels and joins every thread.
pub struct SearchCoordinator {
    workers: Vec<WorkerHandle>,
    reply_rx: Receiver<Reply>,
    stop_flag: Arc<AtomicBool>,
    round_timeout: Duration,
    round: u64,
    attempts: u64,
    state: SearchState,
    start_time: Instant,
}

impl SearchCoordinator {
    /// Creates a coordinator with `num_workers` real search workers.
    pub fn new(num_workers: usize) -> Result<Self> {
        Self::with_runner_factory(num_workers, |_| Box::new(BatchSearcher::new()))
    }

    /// Creates a coordinator with injected batch runners. This is the
    /// seam the tests use to script worker behavior.
    pub fn with_runner_factory<F>(num_workers: usize, factory: F) -> Result<Self>
    where
        F: Fn(usize) -> Box<dyn BatchRunner>,
    {
        let num_workers = num_workers.max(1);
        let (reply_tx, reply_rx) = bounded(num_workers * 2);
        let stop_flag = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(num_workers);
        for id in 0..num_workers {
            let mut runner = factory(id);
            let (job_tx, job_rx) = bounded::<Job>(1);
            let reply_tx = reply_tx.clone();

            let handle = thread::Builder::new()
                .name(format!("vanity-worker-{}", id))
                .spawn(move || {
                    while let Ok(job) = job_rx.recv() {
                        let reply = match runner.run_batch(&job.pattern, job.batch_size) {
                            Ok(Some(keypair)) => Reply::Found {
                                worker_id: id,
                                round: job.round,
                                keypair,
                            },
                            Ok(None) => Reply::BatchComplete {
                                worker_id: id,
                                round: job.round,
                            },
                            Err(e) => Reply::Failed {
                                worker_id: id,
                                round: job.round,
                                error: e.to_string(),
                            },
                        };
                        if reply_tx.send(reply).is_err() {
                            break;
                        }
                    }
                })
                .map_err(|_| VanityError::WorkersUnavailable)?;

            workers.push(WorkerHandle { id, job_tx, handle });
        }

        Ok(Self {
            workers,
            reply_rx,
            stop_flag,
            round_timeout: DEFAULT_ROUND_TIMEOUT,
            round: 0,
            attempts: 0,
            state: SearchState::Idle,
            start_time: Instant::now(),
        })
    }

    /// Overrides the per-round worker timeout.
    pub fn set_round_timeout(&mut self, timeout: Duration) {
        self.round_timeout = timeout;
    }

    /// Runs one barrier-synchronized round: issues the same batch to
    /// every live worker and waits until each has answered or timed out.
    ///
    /// Ties between simultaneous finders are broken by arrival order; all
    /// matches are equally valid. Each worker that answers contributes
    /// its full `batch_size` to the attempt counter even when it matched
    /// partway through, making the counter an upper bound on true work.
    pub fn run_round(&mut self, pattern: &Pattern, batch_size: usize) -> Result<RoundOutcome> {
        if self.stop_flag.load(Ordering::Relaxed) {
            self.state = SearchState::Stopped;
            return Ok(RoundOutcome::NoMatch);
        }
        if self.workers.is_empty() {
            return Err(VanityError::WorkersUnavailable);
        }

        self.state = SearchState::Searching;
        self.round += 1;
        let round = self.round;

        // A worker whose job channel is gone is already dead; drop it.
        self.workers.retain(|worker| {
            worker
                .job_tx
                .send(Job {
                    round,
                    pattern: pattern.clone(),
                    batch_size,
                })
                .is_ok()
        });
        if self.workers.is_empty() {
            return Err(VanityError::WorkersUnavailable);
        }

        let mut pending: Vec<usize> = self.workers.iter().map(|w| w.id).collect();
        let mut winner: Option<Keypair> = None;
        let deadline = Instant::now() + self.round_timeout;

        while !pending.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let reply = match self.reply_rx.recv_timeout(remaining) {
                Ok(reply) => reply,
                Err(_) => break,
            };

            // Late answers from a previous round carry no usable work.
            if reply.round() != round {
                continue;
            }
            pending.retain(|&id| id != reply.worker_id());

            match reply {
                Reply::Found { keypair, .. } => {
                    self.attempts += batch_size as u64;
                    if winner.is_none() {
                        winner = Some(keypair);
                    }
                }
                Reply::BatchComplete { .. } => {
                    self.attempts += batch_size as u64;
                }
                Reply::Failed { worker_id, error, .. } => {
                    warn!(worker_id, %error, "worker failed, removing from pool");
                    self.workers.retain(|w| w.id != worker_id);
                }
            }
        }

        // Timed-out workers: excluded from this round's aggregation and
        // not issued further rounds.
        for id in pending {
            debug!(worker_id = id, "worker missed round deadline, removing");
            self.workers.retain(|w| w.id != id);
        }

        match winner {
            Some(keypair) => {
                self.state = SearchState::Found;
                Ok(RoundOutcome::Found(keypair))
            }
            None if self.workers.is_empty() => Err(VanityError::WorkersUnavailable),
            None => Ok(RoundOutcome::NoMatch),
        }
    }

    /// Signals the coordinator to stop before the next round.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Returns a clone of the stop flag for signal handlers.
    pub fn stop_flag_clone(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Returns true if a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }

    /// Returns the number of live workers.
    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Returns the running attempt counter (sum of issued batch sizes).
    pub fn total_attempts(&self) -> u64 {
        self.attempts
    }

    /// Returns the current session state.
    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Returns the elapsed time since the coordinator was created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the current search rate (attempts per second).
    pub fn attempts_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.attempts as f64 / elapsed
        } else {
            0.0
        }
    }
}

impl Drop for SearchCoordinator {
    fn drop(&mut self) {
        self.stop();
        for worker in self.workers.drain(..) {
            // Closing the job channel ends the worker loop.
            drop(worker.job_tx);
            let _ = worker.handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::VanityPosition;

    /// Scripted runner: completes without a match until `match_on_call`,
    /// then reports a fixed keypair.
    struct ScriptedRunner {
        calls: u64,
        match_on_call: Option<u64>,
        address: String,
    }

    impl BatchRunner for ScriptedRunner {
        fn run_batch(&mut self, _pattern: &Pattern, _batch_size: usize) -> Result<Option<Keypair>> {
            self.calls += 1;
            match self.match_on_call {
                Some(call) if self.calls == call => Ok(Some(Keypair::new(
                    self.address.clone(),
                    "scripted mnemonic".into(),
                ))),
                _ => Ok(None),
            }
        }
    }

    fn test_pattern() -> Pattern {
        Pattern::new("xyz", VanityPosition::Anywhere).unwrap()
    }

    #[test]
    fn test_match_on_second_round() {
        // Four workers; worker 2 matches on round 2.
        let mut coordinator = SearchCoordinator::with_runner_factory(4, |id| {
            Box::new(ScriptedRunner {
                calls: 0,
                match_on_call: (id == 2).then_some(2),
                address: format!("mantra1xyzworker{}", id),
            })
        })
        .unwrap();

        let pattern = test_pattern();
        let batch_size = 100;

        match coordinator.run_round(&pattern, batch_size).unwrap() {
            RoundOutcome::NoMatch => {}
            RoundOutcome::Found(_) => panic!("no worker should match on round 1"),
        }
        match coordinator.run_round(&pattern, batch_size).unwrap() {
            RoundOutcome::Found(keypair) => {
                assert_eq!(keypair.address(), "mantra1xyzworker2");
            }
            RoundOutcome::NoMatch => panic!("worker 2 should match on round 2"),
        }

        // Every responding worker books the full batch size.
        assert!(coordinator.total_attempts() >= 2 * batch_size as u64);
        assert_eq!(coordinator.state(), SearchState::Found);
    }

    #[test]
    fn test_no_match_rounds_aggregate_attempts() {
        let mut coordinator = SearchCoordinator::with_runner_factory(3, |_| {
            Box::new(ScriptedRunner {
                calls: 0,
                match_on_call: None,
                address: String::new(),
            })
        })
        .unwrap();

        let pattern = test_pattern();
        for _ in 0..2 {
            match coordinator.run_round(&pattern, 50).unwrap() {
                RoundOutcome::NoMatch => {}
                RoundOutcome::Found(_) => panic!("scripted runners never match"),
            }
        }
        assert_eq!(coordinator.total_attempts(), 2 * 3 * 50);
    }

    #[test]
    fn test_stop_takes_effect_between_rounds() {
        let mut coordinator = SearchCoordinator::with_runner_factory(2, |_| {
            Box::new(ScriptedRunner {
                calls: 0,
                match_on_call: None,
                address: String::new(),
            })
        })
        .unwrap();

        coordinator.stop();
        let pattern = test_pattern();
        match coordinator.run_round(&pattern, 50).unwrap() {
            RoundOutcome::NoMatch => {}
            RoundOutcome::Found(_) => panic!("stopped coordinator must not search"),
        }
        assert_eq!(coordinator.state(), SearchState::Stopped);
        assert_eq!(coordinator.total_attempts(), 0);
    }

    /// Runner that always reports an error, simulating a failing worker.
    struct FailingRunner;

    impl BatchRunner for FailingRunner {
        fn run_batch(&mut self, _pattern: &Pattern, _batch_size: usize) -> Result<Option<Keypair>> {
            Err(VanityError::DerivationAnomaly)
        }
    }

    #[test]
    fn test_all_workers_failing_is_unavailable() {
        let mut coordinator =
            SearchCoordinator::with_runner_factory(2, |_| Box::new(FailingRunner)).unwrap();

        let pattern = test_pattern();
        let result = coordinator.run_round(&pattern, 10);
        assert!(matches!(result, Err(VanityError::WorkersUnavailable)));
        assert_eq!(coordinator.total_attempts(), 0);
    }

    /// Runner that sleeps well past the round deadline before replying.
    struct SlowRunner {
        delay: Duration,
    }

    impl BatchRunner for SlowRunner {
        fn run_batch(&mut self, _pattern: &Pattern, _batch_size: usize) -> Result<Option<Keypair>> {
            thread::sleep(self.delay);
            Ok(None)
        }
    }

    #[test]
    fn test_slow_worker_dropped_after_round_timeout() {
        let mut coordinator = SearchCoordinator::with_runner_factory(3, |id| {
            if id == 0 {
                Box::new(SlowRunner {
                    delay: Duration::from_millis(500),
                }) as Box<dyn BatchRunner>
            } else {
                Box::new(ScriptedRunner {
                    calls: 0,
                    match_on_call: None,
                    address: String::new(),
                })
            }
        })
        .unwrap();
        coordinator.set_round_timeout(Duration::from_millis(100));

        let pattern = test_pattern();
        match coordinator.run_round(&pattern, 10).unwrap() {
            RoundOutcome::NoMatch => {}
            RoundOutcome::Found(_) => panic!("scripted runners never match"),
        }

        // The sleeping worker missed the deadline: removed from the live
        // set, and its batch never counted.
        assert_eq!(coordinator.num_workers(), 2);
        assert_eq!(coordinator.total_attempts(), 2 * 10);

        // Later rounds run on the remaining workers only.
        match coordinator.run_round(&pattern, 10).unwrap() {
            RoundOutcome::NoMatch => {}
            RoundOutcome::Found(_) => panic!("scripted runners never match"),
        }
        assert_eq!(coordinator.num_workers(), 2);
        assert_eq!(coordinator.total_attempts(), 4 * 10);
    }

    #[test]
    fn test_default_worker_count_at_least_one() {
        assert!(default_worker_count() >= 1);
    }
}
