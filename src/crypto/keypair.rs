//! Keypair generation: mnemonic, HD derivation and address in one pipeline.

use std::fmt;

use bip39::Mnemonic;
use zeroize::Zeroizing;

use crate::error::{Result, VanityError};

use super::hd::HdEngine;
use super::mnemonic::{generate_mnemonic, mnemonic_to_seed};
use super::Address;

/// A generated identity: bech32 address plus the recovery phrase that
/// reproduces it in any BIP39/BIP32-compliant wallet.
///
/// Immutable once constructed; the mnemonic is zeroed when the value is
/// dropped and never appears in `Debug` output.
#[derive(Clone)]
pub struct Keypair {
    address: String,
    mnemonic: Zeroizing<String>,
}

impl Keypair {
    /// Creates a keypair from an already-derived address and its phrase.
    pub fn new(address: String, mnemonic: String) -> Self {
        Self {
            address,
            mnemonic: Zeroizing::new(mnemonic),
        }
    }

    /// Returns the bech32 address.
    #[inline]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the recovery phrase.
    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address)
            .field("mnemonic", &"[REDACTED]")
            .finish()
    }
}

/// Generates random keypairs through the full standards-compliant
/// pipeline: entropy -> mnemonic -> seed -> m/44'/118'/0'/0/0 -> address.
pub struct KeypairGenerator {
    engine: HdEngine,
}

impl KeypairGenerator {
    pub fn new() -> Self {
        Self {
            engine: HdEngine::new(),
        }
    }

    /// Generates a fresh random keypair.
    ///
    /// An out-of-range scalar during derivation (probability ~2^-127) is
    /// handled here by drawing fresh entropy; entropy failure itself
    /// propagates as fatal.
    pub fn generate(&self) -> Result<Keypair> {
        loop {
            let mnemonic = generate_mnemonic()?;
            match self.derive_address(&mnemonic) {
                Ok(address) => return Ok(Keypair::new(address, mnemonic.to_string())),
                Err(VanityError::DerivationAnomaly) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Derives the MANTRA address for an existing mnemonic.
    pub fn derive_address(&self, mnemonic: &Mnemonic) -> Result<String> {
        let seed = mnemonic_to_seed(mnemonic);
        let master = self.engine.master_from_seed(&seed)?;
        let key = self.engine.derive_path(master)?;
        let pubkey = self.engine.public_key(&key);
        Address::from_public_key(&pubkey).to_bech32()
    }
}

impl Default for KeypairGenerator {
    fn default() -> Self {
        Self::new()
    }
}
