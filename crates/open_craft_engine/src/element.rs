//! Element definitions.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::instrument;

use crate::ElementId;

/// Display grouping for elements.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Category {
    /// The four bootstrap elements.
    Primordial,
    /// Landscape and plant life.
    Natural,
    /// Materials and reactions.
    Chemical,
    /// Weather and air.
    Atmospheric,
    /// Sky bodies.
    Celestial,
    /// Living things.
    Biological,
    /// Tools and machines.
    Technological,
    /// Legendary creatures.
    Mythical,
}

impl Category {
    /// Returns every category in display order.
    #[instrument]
    pub fn all() -> Vec<Category> {
        Self::iter().collect()
    }

    /// Returns the emoji shown next to the category label.
    pub fn emoji(self) -> &'static str {
        match self {
            Self::Primordial => "🌟",
            Self::Natural => "🌿",
            Self::Chemical => "⚗️",
            Self::Atmospheric => "🌪️",
            Self::Celestial => "✨",
            Self::Biological => "🧬",
            Self::Technological => "⚡",
            Self::Mythical => "🔮",
        }
    }
}

/// An element as it appears in `elements.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDefinition {
    /// Display name.
    pub name: String,
    /// Optional display grouping.
    #[serde(default)]
    pub category: Option<Category>,
}

/// A catalog element: canonical id, display name and optional category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Element {
    /// Canonical identifier.
    id: ElementId,
    /// Display name.
    name: String,
    /// Display grouping, if any.
    category: Option<Category>,
}

impl Element {
    /// Creates a new element.
    pub fn new(id: ElementId, name: impl Into<String>, category: Option<Category>) -> Self {
        Self {
            id,
            name: name.into(),
            category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parses_case_insensitively() {
        assert_eq!("technological".parse::<Category>(), Ok(Category::Technological));
    }

    #[test]
    fn test_all_categories_listed_once() {
        let all = Category::all();
        assert_eq!(all.len(), 8);
        assert_eq!(all[0], Category::Primordial);
        assert_eq!(all[7], Category::Mythical);
    }

    #[test]
    fn test_element_getters() {
        let element = Element::new(ElementId::parse("sea"), "Sea", Some(Category::Natural));
        assert_eq!(element.id().as_str(), "sea");
        assert_eq!(element.name(), "Sea");
        assert_eq!(*element.category(), Some(Category::Natural));
    }

    #[test]
    fn test_definition_without_category() {
        let def: ElementDefinition = serde_json::from_str(r#"{"name": "Void"}"#).unwrap();
        assert_eq!(def.category, None);
    }
}
