//! Search execution: bounded batches, parallel coordination and the
//! fallback tiers between them.

mod batch;
mod coordinator;
pub mod message;
mod strategy;

pub use batch::{optimal_batch_size, BatchOutcome, BatchSearcher, SearchState};
pub use coordinator::{default_worker_count, BatchRunner, RoundOutcome, SearchCoordinator};
pub use strategy::{
    run_search, search_with_fallback, FallbackSearch, ParallelStrategy, PerCandidate,
    SearchStrategy, SingleThreadBatch, StepOutcome,
};
