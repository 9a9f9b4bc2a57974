//! Pattern matching for MANTRA addresses.
//!
//! Supports three matching positions:
//! - Prefix: right after the "mantra1" separator
//! - Suffix: at the end of the address (checksum region)
//! - Anywhere: plain substring search

mod pattern;

pub use pattern::{is_valid_target, Pattern, VanityPosition, BECH32_ALPHABET, MAX_PATTERN_LEN};
