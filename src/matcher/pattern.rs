//! Pattern matching implementation.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::crypto::ADDRESS_PREFIX_LEN;
use crate::error::{Result, VanityError};

/// The 32-symbol bech32 data alphabet. Addresses never contain the
/// visually ambiguous characters 1, b, i, o in their data part; '1' in
/// particular is the HRP separator, so it is not a valid pattern
/// character either.
pub const BECH32_ALPHABET: &str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Practical upper bound on pattern length. Expected work is 32^len, so
/// anything past this is out of reach for a brute-force search anyway.
pub const MAX_PATTERN_LEN: usize = 10;

/// Where the vanity pattern must appear in the address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VanityPosition {
    /// Match anywhere in the address
    #[default]
    Anywhere,
    /// Match immediately after the "mantra1" prefix
    Prefix,
    /// Match at the end of the address (inside the checksum region)
    Suffix,
}

impl FromStr for VanityPosition {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prefix" | "start" | "begin" => Ok(VanityPosition::Prefix),
            "suffix" | "end" => Ok(VanityPosition::Suffix),
            "anywhere" | "contains" | "any" => Ok(VanityPosition::Anywhere),
            _ => Err(format!("Unknown position: {}", s)),
        }
    }
}

impl std::fmt::Display for VanityPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VanityPosition::Anywhere => write!(f, "anywhere"),
            VanityPosition::Prefix => write!(f, "prefix"),
            VanityPosition::Suffix => write!(f, "suffix"),
        }
    }
}

/// Returns true if every character of `target` (case-insensitive) belongs
/// to the bech32 data alphabet.
///
/// A pattern with any other character can never appear in an address, so
/// rejecting it here avoids burning search effort on an unsatisfiable
/// target.
pub fn is_valid_target(target: &str) -> bool {
    target
        .chars()
        .all(|ch| BECH32_ALPHABET.contains(ch.to_ascii_lowercase()))
}

/// A validated, normalized vanity target.
#[derive(Debug, Clone)]
pub struct Pattern {
    /// The pattern string, lowercased
    pattern: String,
    /// Where the pattern must appear
    position: VanityPosition,
}

impl Pattern {
    /// Creates a new pattern, validating it against the address alphabet.
    ///
    /// Rejects empty patterns, patterns longer than [`MAX_PATTERN_LEN`]
    /// and any character outside the bech32 data alphabet. Matching is
    /// case-insensitive, so input is normalized to lowercase.
    pub fn new(pattern: impl Into<String>, position: VanityPosition) -> Result<Self> {
        let pattern = pattern.into().to_lowercase();

        if pattern.is_empty() {
            return Err(VanityError::InvalidTarget("Pattern cannot be empty".into()));
        }
        if pattern.len() > MAX_PATTERN_LEN {
            return Err(VanityError::InvalidTarget(format!(
                "Pattern cannot be longer than {} characters",
                MAX_PATTERN_LEN
            )));
        }
        if !is_valid_target(&pattern) {
            return Err(VanityError::InvalidTarget(format!(
                "Pattern must contain only bech32 characters ({})",
                BECH32_ALPHABET
            )));
        }

        Ok(Self { pattern, position })
    }

    /// Returns the normalized pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the position constraint.
    pub fn position(&self) -> VanityPosition {
        self.position
    }

    /// Tests an address against this pattern, case-insensitively.
    #[inline]
    pub fn matches(&self, address: &str) -> bool {
        let address = address.to_ascii_lowercase();

        match self.position {
            VanityPosition::Anywhere => address.contains(&self.pattern),
            VanityPosition::Prefix => address
                .get(ADDRESS_PREFIX_LEN..)
                .is_some_and(|data| data.starts_with(&self.pattern)),
            VanityPosition::Suffix => address.ends_with(&self.pattern),
        }
    }

    /// Returns the expected number of candidates per match (32^len).
    ///
    /// Suffix targets land in the checksum region, but the checksum is an
    /// effectively uniform function of the hash, so the estimate is the
    /// same for every position.
    pub fn estimated_difficulty(&self) -> u64 {
        32u64.saturating_pow(self.pattern.len() as u32)
    }

    /// Returns a human-readable difficulty estimate.
    pub fn difficulty_description(&self) -> String {
        match self.estimated_difficulty() {
            0..=1_000 => "Very Easy (< 1 second)".into(),
            1_001..=100_000 => "Easy (seconds)".into(),
            100_001..=10_000_000 => "Medium (minutes)".into(),
            10_000_001..=1_000_000_000 => "Hard (hours)".into(),
            _ => "Very Hard (days or more)".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "mantra19rl4cm2hmr8afy4kldpxz3fka4jguq0aht8eu0";

    #[test]
    fn test_anywhere_match() {
        let pattern = Pattern::new("kldp", VanityPosition::Anywhere).unwrap();
        assert!(pattern.matches(ADDR));
    }

    #[test]
    fn test_anywhere_no_match() {
        let pattern = Pattern::new("qqqq", VanityPosition::Anywhere).unwrap();
        assert!(!pattern.matches(ADDR));
    }

    #[test]
    fn test_prefix_match_starts_after_separator() {
        let pattern = Pattern::new("9rl4", VanityPosition::Prefix).unwrap();
        assert!(pattern.matches(ADDR));

        // Present in the address but not right after "mantra1"
        let pattern = Pattern::new("kldp", VanityPosition::Prefix).unwrap();
        assert!(!pattern.matches(ADDR));
    }

    #[test]
    fn test_suffix_match() {
        let pattern = Pattern::new("t8eu0", VanityPosition::Suffix).unwrap();
        assert!(pattern.matches(ADDR));

        let pattern = Pattern::new("t8eu", VanityPosition::Suffix).unwrap();
        assert!(!pattern.matches(ADDR));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let pattern = Pattern::new("KLDP", VanityPosition::Anywhere).unwrap();
        assert!(pattern.matches(&ADDR.to_uppercase()));
    }

    #[test]
    fn test_short_address_prefix_no_panic() {
        let pattern = Pattern::new("xyz", VanityPosition::Prefix).unwrap();
        assert!(!pattern.matches("mantra"));
    }

    #[test]
    fn test_validation_soundness() {
        assert!(is_valid_target("qpzry9x8gf2tvdw0s3jn54khce6mua7l"));
        assert!(is_valid_target("QPZRY"));
        assert!(is_valid_target(""));

        // '1' is the separator; 'b', 'i', 'o' are excluded from the alphabet
        assert!(!is_valid_target("1"));
        assert!(!is_valid_target("b"));
        assert!(!is_valid_target("i"));
        assert!(!is_valid_target("o"));
        assert!(!is_valid_target("abc!"));
    }

    #[test]
    fn test_pattern_rejects_empty_and_overlong() {
        assert!(Pattern::new("", VanityPosition::Anywhere).is_err());
        assert!(Pattern::new("q".repeat(MAX_PATTERN_LEN + 1), VanityPosition::Anywhere).is_err());
        assert!(Pattern::new("q".repeat(MAX_PATTERN_LEN), VanityPosition::Anywhere).is_ok());
    }

    #[test]
    fn test_pattern_normalizes_case() {
        let pattern = Pattern::new("XYZ", VanityPosition::Prefix).unwrap();
        assert_eq!(pattern.pattern(), "xyz");
    }

    #[test]
    fn test_pattern_rejects_separator_char() {
        assert!(Pattern::new("x1z", VanityPosition::Anywhere).is_err());
    }

    #[test]
    fn test_difficulty() {
        let pattern = Pattern::new("xyz", VanityPosition::Prefix).unwrap();
        assert_eq!(pattern.estimated_difficulty(), 32_768); // 32^3
    }

    #[test]
    fn test_position_parsing() {
        assert_eq!("prefix".parse::<VanityPosition>().unwrap(), VanityPosition::Prefix);
        assert_eq!("END".parse::<VanityPosition>().unwrap(), VanityPosition::Suffix);
        assert_eq!("anywhere".parse::<VanityPosition>().unwrap(), VanityPosition::Anywhere);
        assert!("middle".parse::<VanityPosition>().is_err());
    }
}
