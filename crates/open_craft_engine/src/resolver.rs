//! Discovery-gated combination of two elements.

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{Catalog, ElementId, Ledger, PairKey};

/// What happened when a player combined two elements.
///
/// Rejections are ordinary values, never errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CombineOutcome {
    /// A recipe matched; `result` is now discovered.
    Created {
        /// The resulting element.
        result: ElementId,
        /// False when the player had already discovered the result.
        newly_discovered: bool,
    },
    /// An operand is not (yet) discovered by this player.
    Undiscovered {
        /// Every undiscovered operand, sorted and without repeats.
        missing: Vec<ElementId>,
    },
    /// Both operands are discovered but no recipe joins them.
    NoRecipe,
}

impl CombineOutcome {
    /// The resulting element, if a recipe matched.
    pub fn result(&self) -> Option<&ElementId> {
        match self {
            Self::Created { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Returns true if the ledger gained an element.
    pub fn is_new_discovery(&self) -> bool {
        matches!(
            self,
            Self::Created {
                newly_discovered: true,
                ..
            }
        )
    }
}

/// Combines two elements on behalf of the ledger's owner.
///
/// Both inputs are normalized, must already be discovered, and are looked up
/// as an unordered pair. A hit records the result (idempotently); anything
/// else leaves the ledger untouched.
#[instrument(skip(catalog, ledger))]
pub fn combine(catalog: &Catalog, ledger: &mut Ledger, first: &str, second: &str) -> CombineOutcome {
    let first = catalog.normalize(first);
    let second = catalog.normalize(second);

    let mut missing: Vec<ElementId> = [&first, &second]
        .into_iter()
        .filter(|operand| !ledger.is_discovered(operand))
        .cloned()
        .collect();
    if !missing.is_empty() {
        missing.sort();
        missing.dedup();
        debug!(?missing, "Operand not discovered");
        return CombineOutcome::Undiscovered { missing };
    }

    let pair = PairKey::new(first, second);
    match catalog.recipe(&pair) {
        Some(result) => {
            let newly_discovered = ledger.add_discovered(result.clone());
            info!(pair = %pair, result = %result, newly_discovered, "Combination succeeded");
            CombineOutcome::Created {
                result: result.clone(),
                newly_discovered,
            }
        }
        None => {
            debug!(pair = %pair, "No recipe for pair");
            CombineOutcome::NoRecipe
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Normalizer;

    fn small_catalog() -> Catalog {
        Catalog::from_documents(
            r#"{
                "water": {"name": "Water"},
                "fire": {"name": "Fire"},
                "earth": {"name": "Earth"},
                "wind": {"name": "Wind"},
                "steam": {"name": "Steam"}
            }"#,
            r#"{"water+fire": "steam"}"#,
            "[]",
            Normalizer::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_mixed_case_inputs_create_steam() {
        let catalog = small_catalog();
        let mut ledger = Ledger::bootstrap(&catalog);
        let outcome = combine(&catalog, &mut ledger, "Water", "FIRE");
        assert_eq!(outcome.result().map(ElementId::as_str), Some("steam"));
        assert!(outcome.is_new_discovery());
        assert_eq!(ledger.to_list(), vec!["earth", "fire", "steam", "water", "wind"]);
    }

    #[test]
    fn test_no_recipe_leaves_ledger_unchanged() {
        let catalog = small_catalog();
        let mut ledger = Ledger::bootstrap(&catalog);
        let before = ledger.clone();
        assert_eq!(combine(&catalog, &mut ledger, "earth", "wind"), CombineOutcome::NoRecipe);
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_undiscovered_operand_rejected() {
        let catalog = small_catalog();
        let mut ledger = Ledger::bootstrap(&catalog);
        let before = ledger.clone();
        let outcome = combine(&catalog, &mut ledger, "steam", "water");
        assert_eq!(
            outcome,
            CombineOutcome::Undiscovered {
                missing: vec![ElementId::parse("steam")]
            }
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_undiscovered_rejection_ignores_operand_order() {
        let catalog = small_catalog();
        let mut ledger = Ledger::bootstrap(&catalog);
        let forward = combine(&catalog, &mut ledger, "steam", "lava");
        let reverse = combine(&catalog, &mut ledger, "Lava", "STEAM");
        assert_eq!(forward, reverse);
        assert_eq!(
            forward,
            CombineOutcome::Undiscovered {
                missing: vec![ElementId::parse("lava"), ElementId::parse("steam")]
            }
        );
        assert_eq!(
            combine(&catalog, &mut ledger, "steam", "steam"),
            CombineOutcome::Undiscovered {
                missing: vec![ElementId::parse("steam")]
            }
        );
    }

    #[test]
    fn test_recombining_is_idempotent() {
        let catalog = small_catalog();
        let mut ledger = Ledger::bootstrap(&catalog);
        let first = combine(&catalog, &mut ledger, "water", "fire");
        let after_first = ledger.clone();
        let second = combine(&catalog, &mut ledger, "water", "fire");
        assert_eq!(first.result(), second.result());
        assert!(!second.is_new_discovery());
        assert_eq!(ledger, after_first);
    }

    #[test]
    fn test_symmetry() {
        let catalog = small_catalog();
        let mut forward = Ledger::bootstrap(&catalog);
        let mut reverse = Ledger::bootstrap(&catalog);
        assert_eq!(
            combine(&catalog, &mut forward, "water", "fire"),
            combine(&catalog, &mut reverse, "fire", "water")
        );
        assert_eq!(forward, reverse);
    }
}
