//! Player-facing wording shared by every front-end.

use open_craft_engine::{Catalog, CombineOutcome};

/// Rejection for an operand the player has not discovered.
pub const NOT_DISCOVERED: &str = "You haven't discovered one or both elements yet!";

/// Rejection for a pair with no recipe.
pub const CANNOT_COMBINE: &str = "These elements cannot be combined.";

/// Stateless lookup miss, as returned by `GET /combine`.
pub const LOOKUP_MISS: &str = "These elements cannot be combined";

/// Static gameplay hints.
pub const HINTS: &str = "Hints:
1. Try combining basic elements first
2. Some elements can be combined in multiple ways
3. Look for logical combinations (e.g., water + fire = steam)";

/// Success line for a created element.
pub fn created(name: &str) -> String {
    format!("You created: {}!", name)
}

/// One-line summary of a combine outcome.
pub fn describe(catalog: &Catalog, outcome: &CombineOutcome) -> String {
    match outcome {
        CombineOutcome::Created { result, .. } => created(catalog.display_name(result)),
        CombineOutcome::Undiscovered { .. } => NOT_DISCOVERED.to_string(),
        CombineOutcome::NoRecipe => CANNOT_COMBINE.to_string(),
    }
}

/// `Discovered: n/total` progress line.
pub fn progress((discovered, total): (usize, usize)) -> String {
    format!("Discovered: {}/{}", discovered, total)
}
