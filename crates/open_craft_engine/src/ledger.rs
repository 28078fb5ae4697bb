//! Per-player record of discovered elements.

use std::collections::BTreeSet;

use tracing::{debug, info, instrument, warn};

use crate::{Catalog, ElementId, Identity, LedgerError, LedgerStore};

/// Elements every new player starts with.
pub const BOOTSTRAP_ELEMENTS: [&str; 4] = ["water", "fire", "earth", "wind"];

/// Set of discovered element ids.
///
/// Grows monotonically: [`Ledger::add_discovered`] is the only mutator and
/// nothing removes an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    discovered: BTreeSet<ElementId>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger holding the bootstrap elements the catalog defines.
    pub fn bootstrap(catalog: &Catalog) -> Self {
        let mut ledger = Self::new();
        ledger.seed_bootstrap(catalog);
        ledger
    }

    /// Seeds the bootstrap elements into an empty ledger.
    ///
    /// Bootstrap ids are normalized with the catalog's rule and skipped when
    /// the catalog lacks them. Returns true if anything was seeded; a
    /// non-empty ledger is left alone.
    #[instrument(skip(self, catalog))]
    pub fn seed_bootstrap(&mut self, catalog: &Catalog) -> bool {
        if !self.discovered.is_empty() {
            return false;
        }
        for raw in BOOTSTRAP_ELEMENTS {
            let id = catalog.normalize(raw);
            if catalog.contains(&id) {
                self.discovered.insert(id);
            } else {
                warn!(element = %id, "Bootstrap element missing from catalog, not seeded");
            }
        }
        debug!(count = self.discovered.len(), "Seeded bootstrap elements");
        !self.discovered.is_empty()
    }

    /// Membership test on a normalized id.
    pub fn is_discovered(&self, id: &ElementId) -> bool {
        self.discovered.contains(id)
    }

    /// Records a discovery. Idempotent; returns true if the id was new.
    pub fn add_discovered(&mut self, id: ElementId) -> bool {
        self.discovered.insert(id)
    }

    /// Number of discovered elements.
    pub fn len(&self) -> usize {
        self.discovered.len()
    }

    /// Returns true before seeding.
    pub fn is_empty(&self) -> bool {
        self.discovered.is_empty()
    }

    /// Iterates over discovered ids in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &ElementId> {
        self.discovered.iter()
    }

    /// Sorted identifier list, as persisted.
    pub fn to_list(&self) -> Vec<String> {
        self.discovered.iter().map(|id| id.to_string()).collect()
    }

    /// Loads the ledger stored for `identity`.
    ///
    /// Missing or unreadable data yields an empty ledger: that is the
    /// new-player state, not an error. Stored ids are normalized with the
    /// catalog's rule, and ids the catalog does not know are dropped.
    #[instrument(skip(store, catalog))]
    pub fn load(store: &dyn LedgerStore, identity: &Identity, catalog: &Catalog) -> Self {
        let stored = match store.load(identity) {
            Ok(Some(list)) => list,
            Ok(None) => {
                info!(%identity, "No saved progress, starting fresh");
                return Self::new();
            }
            Err(e) => {
                warn!(%identity, error = %e, "Saved progress unreadable, starting fresh");
                return Self::new();
            }
        };

        let mut ledger = Self::new();
        for raw in &stored {
            let id = catalog.normalize(raw);
            if catalog.contains(&id) {
                ledger.add_discovered(id);
            } else {
                warn!(%identity, element = %raw, "Dropping unknown element from saved progress");
            }
        }

        info!(%identity, count = ledger.len(), "Loaded saved progress");
        ledger
    }

    /// Persists the full discovered set in sorted order.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the store rejects the write.
    #[instrument(skip(self, store), fields(count = self.len()))]
    pub fn save(&self, store: &dyn LedgerStore, identity: &Identity) -> Result<(), LedgerError> {
        store.save(identity, &self.to_list())?;
        debug!(%identity, "Saved progress");
        Ok(())
    }
}
