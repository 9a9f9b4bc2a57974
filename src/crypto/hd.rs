//! BIP32 hierarchical-deterministic key derivation over secp256k1.
//!
//! Child scalars are computed with true group arithmetic,
//! `(parent + tweak) mod n`, via [`SecretKey::add_tweak`]. Skipping that
//! modular addition is the classic defect that produces addresses no
//! standard wallet can recover, so it is the one invariant this module
//! is built around.

use hmac::{Hmac, Mac};
use secp256k1::{All, PublicKey, Scalar, Secp256k1, SecretKey};
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::error::{Result, VanityError};

type HmacSha512 = Hmac<Sha512>;

/// Hardened index offset (2^31).
pub const HARDENED: u32 = 0x8000_0000;

/// Fixed derivation path m/44'/118'/0'/0/0 (Cosmos coin type, used by
/// MANTRA). Not user-configurable.
pub const DERIVATION_PATH: [u32; 5] = [44 | HARDENED, 118 | HARDENED, HARDENED, 0, 0];

/// BIP32 HMAC key for master key derivation. The "Bitcoin seed" domain
/// separator is part of the standard and must stay unchanged for wallet
/// compatibility.
const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// An extended private key: scalar in [1, n-1] plus chain code.
pub struct ExtendedKey {
    secret: SecretKey,
    chain_code: Zeroizing<[u8; 32]>,
}

impl ExtendedKey {
    /// Returns the private scalar.
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    /// Returns the chain code.
    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }
}

/// Derivation engine holding a secp256k1 context.
///
/// Context construction is expensive relative to a single derivation, so
/// the engine is created once per worker and reused across candidates.
pub struct HdEngine {
    secp: Secp256k1<All>,
}

impl HdEngine {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    /// Derives the master extended key from a 64-byte BIP39 seed.
    ///
    /// HMAC-SHA512 keyed with "Bitcoin seed"; left 32 bytes become the
    /// master scalar, right 32 bytes the chain code. An out-of-range
    /// master scalar (probability ~2^-127) is a
    /// [`VanityError::DerivationAnomaly`]: the caller discards the seed
    /// and retries with fresh entropy.
    pub fn master_from_seed(&self, seed: &[u8; 64]) -> Result<ExtendedKey> {
        let mut mac = HmacSha512::new_from_slice(MASTER_HMAC_KEY)
            .map_err(|_| VanityError::DerivationAnomaly)?;
        mac.update(seed);
        let output = mac.finalize().into_bytes();

        let secret =
            SecretKey::from_slice(&output[..32]).map_err(|_| VanityError::DerivationAnomaly)?;
        let mut chain_code = Zeroizing::new([0u8; 32]);
        chain_code.copy_from_slice(&output[32..]);

        Ok(ExtendedKey { secret, chain_code })
    }

    /// Walks the fixed derivation path from the master key.
    pub fn derive_path(&self, master: ExtendedKey) -> Result<ExtendedKey> {
        let mut current = master;
        for &index in &DERIVATION_PATH {
            current = self.derive_child(&current, index)?;
        }
        Ok(current)
    }

    /// Derives one child key per BIP32.
    ///
    /// Hardened indices (>= 2^31) key the HMAC input on the private
    /// scalar, non-hardened on the compressed public key. The tweak must
    /// be < n and the resulting scalar nonzero; either violation is a
    /// reject-and-retry condition, never clamped into range.
    fn derive_child(&self, parent: &ExtendedKey, index: u32) -> Result<ExtendedKey> {
        let mut mac = HmacSha512::new_from_slice(&parent.chain_code[..])
            .map_err(|_| VanityError::DerivationAnomaly)?;

        if index >= HARDENED {
            mac.update(&[0x00]);
            mac.update(&parent.secret.secret_bytes());
        } else {
            let pubkey = PublicKey::from_secret_key(&self.secp, &parent.secret);
            mac.update(&pubkey.serialize());
        }
        mac.update(&index.to_be_bytes());

        let output = mac.finalize().into_bytes();

        let mut tweak_bytes = [0u8; 32];
        tweak_bytes.copy_from_slice(&output[..32]);
        // Rejects tweaks >= n; add_tweak rejects a zero result.
        let tweak =
            Scalar::from_be_bytes(tweak_bytes).map_err(|_| VanityError::DerivationAnomaly)?;
        let secret = parent
            .secret
            .add_tweak(&tweak)
            .map_err(|_| VanityError::DerivationAnomaly)?;

        let mut chain_code = Zeroizing::new([0u8; 32]);
        chain_code.copy_from_slice(&output[32..]);

        Ok(ExtendedKey { secret, chain_code })
    }

    /// Computes the compressed public key (33 bytes) for an extended key.
    pub fn public_key(&self, key: &ExtendedKey) -> PublicKey {
        PublicKey::from_secret_key(&self.secp, &key.secret)
    }
}

impl Default for HdEngine {
    fn default() -> Self {
        Self::new()
    }
}
