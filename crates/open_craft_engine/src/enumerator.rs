//! Untried-combination enumeration for recipe authoring.

use std::fmt;

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, instrument};

use crate::{Catalog, Element, PairKey};

/// A pair of elements with neither a recipe nor a recorded impossibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UntriedCombination<'a> {
    first: &'a Element,
    second: &'a Element,
}

impl<'a> UntriedCombination<'a> {
    /// Element with the smaller id.
    pub fn first(&self) -> &'a Element {
        self.first
    }

    /// Element with the larger (or equal) id.
    pub fn second(&self) -> &'a Element {
        self.second
    }

    /// Canonical pair key.
    pub fn pair(&self) -> PairKey {
        PairKey::new(self.first.id().clone(), self.second.id().clone())
    }
}

impl fmt::Display for UntriedCombination<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}", self.first.name(), self.second.name())
    }
}

impl Catalog {
    /// Lists every pair, self-pairs included, that is neither a recipe nor
    /// known to be impossible.
    ///
    /// Pairs come out in sorted id order, so repeated calls over the same
    /// data return the same sequence.
    #[instrument(skip(self), fields(elements = self.len()))]
    pub fn untried_combinations(&self) -> Vec<UntriedCombination<'_>> {
        let all: Vec<&Element> = self.elements().collect();
        let mut untried = Vec::new();

        for (i, first) in all.iter().enumerate() {
            for second in &all[i..] {
                let pair = PairKey::new(first.id().clone(), second.id().clone());
                if self.recipe(&pair).is_some() || self.is_impossible(&pair) {
                    continue;
                }
                untried.push(UntriedCombination {
                    first: *first,
                    second: *second,
                });
            }
        }

        debug!(count = untried.len(), "Enumerated untried combinations");
        untried
    }
}

/// Picks one untried combination at random.
///
/// Sampling is the only non-deterministic step; the enumeration itself is
/// stable.
pub fn suggest_untried<'a, R: Rng + ?Sized>(
    combinations: &[UntriedCombination<'a>],
    rng: &mut R,
) -> Option<UntriedCombination<'a>> {
    combinations.choose(rng).copied()
}
