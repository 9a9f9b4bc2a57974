//! Error types for vanity address generation.

use thiserror::Error;

/// Main error type for the generator.
#[derive(Error, Debug)]
pub enum VanityError {
    /// The target pattern cannot be matched by any bech32 address.
    /// Surfaced synchronously, before any search work starts.
    #[error("Invalid target pattern: {0}")]
    InvalidTarget(String),

    /// The OS-backed secure random source failed. Fatal: there is no
    /// acceptable weaker fallback for key entropy.
    #[error("Secure random source unavailable: {0}")]
    Entropy(#[from] rand::Error),

    /// A derived scalar fell outside [1, n-1]. The candidate is discarded
    /// and retried with fresh entropy; this never reaches the caller of
    /// the public API.
    #[error("Derived scalar out of range")]
    DerivationAnomaly,

    /// Mnemonic parsing or encoding failed (bad word, bad checksum).
    #[error("Invalid mnemonic: {0}")]
    Mnemonic(#[from] bip39::Error),

    /// secp256k1 operation failed.
    #[error("secp256k1 error: {0}")]
    Secp(#[from] secp256k1::Error),

    /// Address encoding failed.
    #[error("bech32 encoding error: {0}")]
    Encoding(#[from] bech32::Error),

    /// No search workers could be started or all of them stopped
    /// responding. Recovered by falling back one execution tier.
    #[error("No search workers available")]
    WorkersUnavailable,
}

/// Result type alias for convenience.
pub type Result<T> = std::result::Result<T, VanityError>;
