//! # mantra_vanity
//!
//! MANTRA vanity address generator with standards-compliant HD derivation.
//!
//! Every produced address is derived through BIP39 + BIP32
//! (m/44'/118'/0'/0/0, true secp256k1 scalar arithmetic), so the
//! recovered mnemonic imports into any compliant wallet.
//!
//! ## Architecture
//!
//! - `crypto`: mnemonic generation, HD derivation and address encoding
//! - `matcher`: vanity pattern validation and matching
//! - `worker`: batch search, parallel coordination and fallback tiers
//! - `api`: boundary operations for external callers
//! - `config`: runtime configuration

pub mod api;
pub mod config;
pub mod crypto;
pub mod error;
pub mod matcher;
pub mod worker;

pub use config::Config;
pub use crypto::{Address, Keypair, KeypairGenerator};
pub use error::{Result, VanityError};
pub use matcher::{Pattern, VanityPosition};
pub use worker::{BatchSearcher, SearchCoordinator, SearchState, SearchStrategy};
