//! Immutable reference data: elements, recipes and impossibilities.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::element::ElementDefinition;
use crate::{CatalogError, Element, ElementId, Normalizer, PairKey};

const ELEMENTS_DOCUMENT: &str = "elements.json";
const RECIPES_DOCUMENT: &str = "recipes.json";
const IMPOSSIBLE_DOCUMENT: &str = "impossible.json";

const EMBEDDED_ELEMENTS: &str = include_str!("../data/elements.json");
const EMBEDDED_RECIPES: &str = include_str!("../data/recipes.json");
const EMBEDDED_IMPOSSIBLE: &str = include_str!("../data/impossible.json");

/// Where the three catalog documents come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// Documents compiled into the binary.
    Embedded,
    /// Documents read from a directory (developer mode).
    Directory(PathBuf),
}

/// Immutable catalog shared by every session in the process.
#[derive(Debug, Clone)]
pub struct Catalog {
    elements: BTreeMap<ElementId, Element>,
    recipes: HashMap<PairKey, ElementId>,
    impossible: HashSet<PairKey>,
    normalizer: Normalizer,
}

impl Catalog {
    /// Loads the embedded catalog with the default normalization rule.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the embedded data is malformed or
    /// inconsistent.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::load(&CatalogSource::Embedded, Normalizer::default())
    }

    /// Loads all three documents from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if any document is missing or malformed, or
    /// if validation finds contradictions. No partial catalog is returned.
    #[instrument(skip(normalizer))]
    pub fn load(source: &CatalogSource, normalizer: Normalizer) -> Result<Self, CatalogError> {
        match source {
            CatalogSource::Embedded => {
                debug!("Loading embedded catalog");
                Self::from_documents(
                    EMBEDDED_ELEMENTS,
                    EMBEDDED_RECIPES,
                    EMBEDDED_IMPOSSIBLE,
                    normalizer,
                )
            }
            CatalogSource::Directory(dir) => {
                debug!(dir = %dir.display(), "Loading catalog from directory");
                let elements = read_document(dir, ELEMENTS_DOCUMENT)?;
                let recipes = read_document(dir, RECIPES_DOCUMENT)?;
                let impossible = read_document(dir, IMPOSSIBLE_DOCUMENT)?;
                Self::from_documents(&elements, &recipes, &impossible, normalizer)
            }
        }
    }

    /// Builds a catalog from the raw JSON text of the three documents.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for malformed JSON and
    /// [`CatalogError::Inconsistent`] listing every validation issue.
    #[instrument(skip_all)]
    pub fn from_documents(
        elements: &str,
        recipes: &str,
        impossible: &str,
        normalizer: Normalizer,
    ) -> Result<Self, CatalogError> {
        let elements: BTreeMap<String, ElementDefinition> =
            parse_document(ELEMENTS_DOCUMENT, elements)?;
        let recipes: BTreeMap<String, String> = parse_document(RECIPES_DOCUMENT, recipes)?;
        let impossible: Vec<String> = parse_document(IMPOSSIBLE_DOCUMENT, impossible)?;
        Self::build(elements, recipes, impossible, normalizer)
    }

    /// Normalizes and validates parsed documents.
    fn build(
        raw_elements: BTreeMap<String, ElementDefinition>,
        raw_recipes: BTreeMap<String, String>,
        raw_impossible: Vec<String>,
        normalizer: Normalizer,
    ) -> Result<Self, CatalogError> {
        let mut issues = Vec::new();

        let mut elements = BTreeMap::new();
        let mut names: HashMap<String, ElementId> = HashMap::new();
        for (raw_key, def) in raw_elements {
            let id = normalizer.normalize(&raw_key);
            if id.is_empty() {
                issues.push(format!("Element key '{}' is blank", raw_key));
                continue;
            }
            if elements.contains_key(&id) {
                issues.push(format!("Duplicate element index (case-insensitive): {}", raw_key));
                continue;
            }
            if let Some(previous) = names.insert(def.name.clone(), id.clone()) {
                issues.push(format!(
                    "Duplicate element name: {} ({} and {})",
                    def.name, previous, id
                ));
            }
            elements.insert(id.clone(), Element::new(id, def.name, def.category));
        }

        let mut recipes = HashMap::new();
        for (raw_key, raw_result) in raw_recipes {
            let Some(key) = PairKey::parse(&raw_key, &normalizer) else {
                issues.push(format!("Invalid recipe format: {}", raw_key));
                continue;
            };
            for operand in operands(&key) {
                if !elements.contains_key(operand) {
                    issues.push(format!("Recipe {} uses non-existent element: {}", raw_key, operand));
                }
            }
            let result = normalizer.normalize(&raw_result);
            if !elements.contains_key(&result) {
                issues.push(format!("Recipe {} result is non-existent element: {}", raw_key, result));
            }
            if recipes.contains_key(&key) {
                issues.push(format!("Duplicate recipe combination: {}", raw_key));
                continue;
            }
            recipes.insert(key, result);
        }

        let mut impossible = HashSet::new();
        for raw_key in raw_impossible {
            let Some(key) = PairKey::parse(&raw_key, &normalizer) else {
                issues.push(format!("Invalid impossible combination format: {}", raw_key));
                continue;
            };
            for operand in operands(&key) {
                if !elements.contains_key(operand) {
                    issues.push(format!(
                        "Impossible combination {} uses non-existent element: {}",
                        raw_key, operand
                    ));
                }
            }
            if recipes.contains_key(&key) {
                issues.push(format!("Combination {} is both a recipe and impossible", raw_key));
            }
            impossible.insert(key);
        }

        if !issues.is_empty() {
            warn!(issue_count = issues.len(), "Catalog validation failed");
            return Err(CatalogError::Inconsistent { issues });
        }

        info!(
            elements = elements.len(),
            recipes = recipes.len(),
            impossible = impossible.len(),
            "Catalog loaded"
        );

        Ok(Self {
            elements,
            recipes,
            impossible,
            normalizer,
        })
    }

    /// Normalization rule shared by everything that touches this catalog.
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Normalizes raw input with this catalog's rule.
    pub fn normalize(&self, raw: &str) -> ElementId {
        self.normalizer.normalize(raw)
    }

    /// Looks up an element by canonical id.
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Returns true if the id names a catalog element.
    pub fn contains(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// Iterates over all elements in id order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the catalog has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of recipes.
    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    /// Number of known impossible pairs.
    pub fn impossible_count(&self) -> usize {
        self.impossible.len()
    }

    /// Display name for an id, falling back to the id itself.
    pub fn display_name<'a>(&'a self, id: &'a ElementId) -> &'a str {
        self.element(id).map_or(id.as_str(), |element| element.name().as_str())
    }

    /// Result of combining a pair, if a recipe exists.
    pub fn recipe(&self, pair: &PairKey) -> Option<&ElementId> {
        self.recipes.get(pair)
    }

    /// Returns true if the pair is recorded as not combining.
    pub fn is_impossible(&self, pair: &PairKey) -> bool {
        self.impossible.contains(pair)
    }

    /// Answers "what would these two make", ignoring any player's progress.
    ///
    /// This is not the discovery-gated [`crate::combine`]: nothing is
    /// checked against or added to a ledger.
    #[instrument(skip(self))]
    pub fn lookup(&self, first: &str, second: &str) -> Option<&Element> {
        let pair = PairKey::new(self.normalize(first), self.normalize(second));
        let result = self.recipe(&pair)?;
        debug!(pair = %pair, result = %result, "Stateless lookup hit");
        self.element(result)
    }
}

/// Distinct operands of a pair (one for a self-pair).
fn operands(key: &PairKey) -> Vec<&ElementId> {
    if key.is_self_pair() {
        vec![key.low()]
    } else {
        vec![key.low(), key.high()]
    }
}

fn read_document(dir: &Path, document: &'static str) -> Result<String, CatalogError> {
    let path = dir.join(document);
    std::fs::read_to_string(&path).map_err(|source| CatalogError::Read {
        document,
        path,
        source,
    })
}

fn parse_document<T: DeserializeOwned>(document: &'static str, text: &str) -> Result<T, CatalogError> {
    serde_json::from_str(text).map_err(|source| CatalogError::Parse { document, source })
}
