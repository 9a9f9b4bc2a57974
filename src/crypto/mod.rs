//! Cryptographic pipeline for MANTRA key and address generation.
//!
//! This module provides:
//! - BIP39 mnemonic generation from OS entropy
//! - BIP32 HD derivation with true secp256k1 scalar arithmetic
//! - Cosmos-style address hashing and bech32 encoding

mod address;
pub mod hd;
mod keypair;
pub mod mnemonic;

pub use address::{Address, ADDRESS_HRP, ADDRESS_PREFIX_LEN};
pub use keypair::{Keypair, KeypairGenerator};
