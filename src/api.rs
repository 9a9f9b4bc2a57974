//! Boundary operations exposed to external callers.
//!
//! Positions are proper enum variants everywhere inside the crate;
//! callers that speak strings convert once, at this boundary, via
//! `VanityPosition::from_str`.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use bip39::Mnemonic;

use crate::crypto::{Keypair, KeypairGenerator};
use crate::error::Result;
use crate::matcher::{is_valid_target, Pattern, VanityPosition};
use crate::worker::{optimal_batch_size, search_with_fallback, BatchSearcher};

/// Generates one random keypair through the full HD pipeline.
pub fn generate_random_keypair() -> Result<Keypair> {
    KeypairGenerator::new().generate()
}

/// Returns true if every character of `target` can occur in a MANTRA
/// address.
pub fn validate_target_string(target: &str) -> bool {
    is_valid_target(target)
}

/// Searches for a keypair whose address matches `target` at `position`,
/// using the best available execution tier.
///
/// `max_attempts == 0` means unbounded. Returns `Ok(None)` when the
/// attempt budget runs out without a match.
pub fn generate_vanity_keypair_with_position(
    target: &str,
    position: VanityPosition,
    max_attempts: u64,
) -> Result<Option<Keypair>> {
    let pattern = Pattern::new(target, position)?;
    let stop_flag = Arc::new(AtomicBool::new(false));
    search_with_fallback(None, &pattern, max_attempts, stop_flag)
}

/// Runs exactly one bounded batch of search work.
pub fn generate_vanity_keypair_batch(
    target: &str,
    position: VanityPosition,
    batch_size: usize,
) -> Result<Option<Keypair>> {
    let pattern = Pattern::new(target, position)?;
    let searcher = BatchSearcher::new();
    Ok(searcher.search_batch(&pattern, batch_size)?.keypair)
}

/// Returns the recommended batch size for a target length.
pub fn get_optimal_batch_size(target_len: usize) -> usize {
    optimal_batch_size(target_len)
}

/// Derives the MANTRA address for an existing mnemonic. Diagnostic entry
/// point for verifying derivation against other wallets.
pub fn derive_address_from_mnemonic(mnemonic: &str) -> Result<String> {
    let mnemonic = Mnemonic::parse(mnemonic.trim())?;
    KeypairGenerator::new().derive_address(&mnemonic)
}
