//! Bounded batch search: the brute-force inner loop.

use crate::crypto::{Keypair, KeypairGenerator};
use crate::error::Result;
use crate::matcher::Pattern;

/// State of a single search session.
///
/// `Stopped` is only reachable between batches; an in-flight batch always
/// runs to completion (bounded by its batch size).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Searching,
    Found,
    Stopped,
}

/// Outcome of one batch of brute-force work.
#[derive(Debug)]
pub struct BatchOutcome {
    /// The first matching keypair, if any
    pub keypair: Option<Keypair>,
    /// Candidates actually derived and tested (<= batch_size)
    pub attempts: u64,
}

/// Runs bounded batches of generate-derive-encode-match work.
///
/// Stateless between batches: each candidate draws fresh OS entropy, so
/// no RNG state or counters carry over.
pub struct BatchSearcher {
    generator: KeypairGenerator,
}

impl BatchSearcher {
    pub fn new() -> Self {
        Self {
            generator: KeypairGenerator::new(),
        }
    }

    /// Tests up to `batch_size` fresh candidates against the pattern,
    /// short-circuiting on the first match.
    pub fn search_batch(&self, pattern: &Pattern, batch_size: usize) -> Result<BatchOutcome> {
        let mut attempts = 0;

        for _ in 0..batch_size {
            let keypair = self.generator.generate()?;
            attempts += 1;

            if pattern.matches(keypair.address()) {
                return Ok(BatchOutcome {
                    keypair: Some(keypair),
                    attempts,
                });
            }
        }

        Ok(BatchOutcome {
            keypair: None,
            attempts,
        })
    }

    /// Generates a single random keypair without matching.
    pub fn generate_one(&self) -> Result<Keypair> {
        self.generator.generate()
    }
}

impl Default for BatchSearcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Picks a batch size for a pattern length.
///
/// Short patterns are cheap to satisfy, so larger batches amortize
/// per-batch overhead. Long patterns rarely match within any batch, so
/// smaller batches keep the time between cancellation checks and progress
/// reports bounded regardless of how rare the match is.
pub fn optimal_batch_size(pattern_len: usize) -> usize {
    match pattern_len {
        0 | 1 => 2_000,
        2 => 1_000,
        3 => 500,
        4 | 5 => 250,
        _ => 100,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::VanityPosition;

    #[test]
    fn test_batch_bound_without_match() {
        // 32^10 keyspace per candidate; a match inside 5 attempts is not
        // going to happen. The batch must do exactly batch_size attempts
        // and terminate.
        let searcher = BatchSearcher::new();
        let pattern = Pattern::new("qqqqqqqqqq", VanityPosition::Prefix).unwrap();

        let outcome = searcher.search_batch(&pattern, 5).unwrap();
        assert!(outcome.keypair.is_none());
        assert_eq!(outcome.attempts, 5);
    }

    #[test]
    fn test_single_char_anywhere_matches_within_batch() {
        // P(no 'q' anywhere in 38 data chars) ~ (31/32)^38 per candidate,
        // so 10_000 candidates fail together with probability < 10^-500.
        let searcher = BatchSearcher::new();
        let pattern = Pattern::new("q", VanityPosition::Anywhere).unwrap();

        let outcome = searcher.search_batch(&pattern, 10_000).unwrap();
        let keypair = outcome.keypair.expect("single-char target must match");
        assert!(keypair.address().contains('q'));
        assert!(outcome.attempts <= 10_000);
    }

    #[test]
    fn test_short_circuit_reports_actual_attempts() {
        let searcher = BatchSearcher::new();
        // Matches every address.
        let pattern = Pattern::new("mantra", VanityPosition::Anywhere).unwrap();

        let outcome = searcher.search_batch(&pattern, 1_000).unwrap();
        assert!(outcome.keypair.is_some());
        assert_eq!(outcome.attempts, 1);
    }

    #[test]
    fn test_zero_batch_returns_none() {
        let searcher = BatchSearcher::new();
        let pattern = Pattern::new("q", VanityPosition::Anywhere).unwrap();

        let outcome = searcher.search_batch(&pattern, 0).unwrap();
        assert!(outcome.keypair.is_none());
        assert_eq!(outcome.attempts, 0);
    }

    #[test]
    fn test_optimal_batch_size_monotone() {
        let sizes: Vec<usize> = (0..=8).map(optimal_batch_size).collect();
        for pair in sizes.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
        assert!(sizes.iter().all(|&s| s > 0));
    }
}
