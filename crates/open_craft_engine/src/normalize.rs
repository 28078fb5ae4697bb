//! Canonical element identifiers.
//!
//! Catalog keys, recipe operands, player input and persisted ledgers all pass
//! through the same [`Normalizer`], so `"Steam Engine"`, `" steam engine "`
//! and `"steam-engine"` name the same element.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use tracing::instrument;

/// Default separator replacing whitespace inside identifiers.
pub const DEFAULT_SEPARATOR: char = '-';

/// Normalized element identifier.
///
/// Only produced by a [`Normalizer`], so two ids compare equal exactly when
/// they name the same element.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Normalizes `raw` with the default rule.
    pub fn parse(raw: &str) -> Self {
        Normalizer::default().normalize(raw)
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when normalization produced nothing (blank input).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ElementId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ElementId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Identifier canonicalization rule: trim, lower-case, and join internal
/// whitespace runs with a separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Normalizer {
    separator: char,
}

impl Normalizer {
    /// Creates a normalizer joining words with `separator`.
    #[instrument]
    pub fn new(separator: char) -> Self {
        Self { separator }
    }

    /// Returns the separator used between words.
    pub fn separator(&self) -> char {
        self.separator
    }

    /// Canonicalizes a raw identifier.
    pub fn normalize(&self, raw: &str) -> ElementId {
        let mut sep = [0u8; 4];
        let sep = self.separator.encode_utf8(&mut sep);
        let joined = raw
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(sep);
        ElementId(joined)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_lowercases() {
        assert_eq!(ElementId::parse("  WaTer ").as_str(), "water");
    }

    #[test]
    fn test_spaces_become_separator() {
        assert_eq!(ElementId::parse("Steam Engine").as_str(), "steam-engine");
        assert_eq!(ElementId::parse("steam   engine").as_str(), "steam-engine");
    }

    #[test]
    fn test_already_canonical_is_unchanged() {
        assert_eq!(ElementId::parse("steam-engine").as_str(), "steam-engine");
    }

    #[test]
    fn test_custom_separator() {
        let normalizer = Normalizer::new('_');
        assert_eq!(normalizer.normalize("Steam Engine").as_str(), "steam_engine");
    }

    #[test]
    fn test_blank_input_is_empty() {
        assert!(ElementId::parse("   ").is_empty());
    }
}
