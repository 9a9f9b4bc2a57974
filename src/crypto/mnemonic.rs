//! BIP39 mnemonic generation and seed derivation.

use bip39::Mnemonic;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

use crate::error::Result;

/// Entropy drawn per mnemonic: 256 bits, encoding to 24 words.
pub const ENTROPY_BYTES: usize = 32;

/// Number of words in a generated recovery phrase.
pub const MNEMONIC_WORDS: usize = 24;

/// Generates a fresh 24-word mnemonic from OS entropy.
///
/// Entropy comes from `OsRng` only. If the OS random source fails the
/// error propagates as [`VanityError::Entropy`](crate::VanityError::Entropy);
/// there is no fallback to a non-cryptographic generator.
pub fn generate_mnemonic() -> Result<Mnemonic> {
    let mut entropy = [0u8; ENTROPY_BYTES];
    OsRng.try_fill_bytes(&mut entropy)?;

    let mnemonic = Mnemonic::from_entropy(&entropy)?;
    entropy.zeroize();

    Ok(mnemonic)
}

/// Derives the 64-byte BIP39 seed with an empty passphrase.
///
/// PBKDF2-HMAC-SHA512, 2048 rounds, salt "mnemonic". Identical mnemonic
/// always yields an identical seed.
pub fn mnemonic_to_seed(mnemonic: &Mnemonic) -> Zeroizing<[u8; 64]> {
    Zeroizing::new(mnemonic.to_seed(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon \
                                 abandon abandon abandon abandon abandon about";

    #[test]
    fn test_generate_word_count() {
        let mnemonic = generate_mnemonic().unwrap();
        assert_eq!(mnemonic.word_count(), MNEMONIC_WORDS);
    }

    #[test]
    fn test_generated_mnemonics_differ() {
        let a = generate_mnemonic().unwrap();
        let b = generate_mnemonic().unwrap();
        assert_ne!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_seed_known_vector() {
        // Published BIP39 test vector (empty passphrase uses salt "mnemonic").
        let mnemonic = Mnemonic::parse(TEST_MNEMONIC).unwrap();
        let seed = mnemonic_to_seed(&mnemonic);
        assert_eq!(
            hex::encode(&seed[..]),
            "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc1\
             9a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4"
        );
    }

    #[test]
    fn test_seed_is_deterministic() {
        let mnemonic = Mnemonic::parse(TEST_MNEMONIC).unwrap();
        assert_eq!(
            mnemonic_to_seed(&mnemonic)[..],
            mnemonic_to_seed(&mnemonic)[..]
        );
    }

    #[test]
    fn test_bad_checksum_rejected() {
        // Swapping the final word breaks the checksum; parsing must fail
        // rather than silently correct it.
        let broken = "abandon abandon abandon abandon abandon abandon \
                      abandon abandon abandon abandon abandon abandon";
        assert!(Mnemonic::parse(broken).is_err());
    }
}
