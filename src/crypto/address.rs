//! MANTRA address representation and bech32 encoding.

use std::fmt;

use bech32::{ToBase32, Variant};
use ripemd::Ripemd160;
use secp256k1::PublicKey;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Human-readable part of every MANTRA address.
pub const ADDRESS_HRP: &str = "mantra";

/// Length of the HRP plus the '1' separator ("mantra1").
pub const ADDRESS_PREFIX_LEN: usize = ADDRESS_HRP.len() + 1;

/// A MANTRA account address (20-byte hash of the compressed public key).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// Creates an address from raw hash bytes.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derives an address from a compressed secp256k1 public key.
    ///
    /// Standard Cosmos derivation: SHA-256 of the 33-byte compressed key,
    /// then RIPEMD-160 of that digest.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let sha = Sha256::digest(public_key.serialize());
        let ripemd = Ripemd160::digest(sha);

        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&ripemd);
        Self(bytes)
    }

    /// Returns the address as raw hash bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Encodes the address as a bech32 string with the "mantra" prefix.
    pub fn to_bech32(&self) -> Result<String> {
        Ok(bech32::encode(
            ADDRESS_HRP,
            self.0.to_base32(),
            Variant::Bech32,
        )?)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_bech32() {
            Ok(s) => write!(f, "Address({})", s),
            Err(_) => write!(f, "Address(<unencodable>)"),
        }
    }
}
