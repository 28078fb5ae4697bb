//! Unordered element pairs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ElementId, Normalizer};

/// Unordered pair of element ids in canonical order (smaller id first).
///
/// Recipes and impossibilities are keyed by `PairKey`, so `a+b` and `b+a`
/// resolve to the same entry with a single lookup.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    low: ElementId,
    high: ElementId,
}

impl PairKey {
    /// Creates the canonical key for two elements, in either order.
    pub fn new(a: ElementId, b: ElementId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Parses a stored `"a+b"` key, normalizing both operands.
    ///
    /// Returns `None` unless the key has exactly two non-empty operands.
    pub fn parse(raw: &str, normalizer: &Normalizer) -> Option<Self> {
        let mut parts = raw.split('+');
        let a = normalizer.normalize(parts.next()?);
        let b = normalizer.normalize(parts.next()?);
        if parts.next().is_some() || a.is_empty() || b.is_empty() {
            return None;
        }
        Some(Self::new(a, b))
    }

    /// Lexicographically smaller operand.
    pub fn low(&self) -> &ElementId {
        &self.low
    }

    /// Lexicographically larger operand.
    pub fn high(&self) -> &ElementId {
        &self.high
    }

    /// Returns true for an element combined with itself.
    pub fn is_self_pair(&self) -> bool {
        self.low == self.high
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.low, self.high)
    }
}
