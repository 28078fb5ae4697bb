//! Per-identity ledger persistence.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::LedgerError;

/// Who a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Identity {
    /// The single local player of the terminal front-end.
    #[display("local")]
    Local,
    /// A numeric chat or API player id.
    #[display("player {}", _0)]
    Player(i64),
}

/// Storage for discovered-element lists, keyed by identity.
///
/// The engine only ever calls `load` when creating a session and `save` when
/// committing; file layout belongs to the implementor.
pub trait LedgerStore: Debug + Send + Sync {
    /// Reads the persisted identifier list.
    ///
    /// Returns `Ok(None)` when nothing has been saved for this identity yet.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if stored data exists but cannot be read.
    fn load(&self, identity: &Identity) -> Result<Option<Vec<String>>, LedgerError>;

    /// Replaces the persisted identifier list.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the write fails.
    fn save(&self, identity: &Identity, discovered: &[String]) -> Result<(), LedgerError>;
}

/// In-process store, used by tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ledgers: Mutex<HashMap<Identity, Vec<String>>>,
    fail_saves: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the stored list for an identity.
    pub fn insert(&self, identity: Identity, discovered: Vec<String>) {
        self.ledgers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(identity, discovered);
    }

    /// Returns the stored list for an identity, if any.
    pub fn get(&self, identity: &Identity) -> Option<Vec<String>> {
        self.ledgers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identity)
            .cloned()
    }

    /// Makes every subsequent save fail, simulating an unwritable sink.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl LedgerStore for MemoryStore {
    #[instrument(skip(self))]
    fn load(&self, identity: &Identity) -> Result<Option<Vec<String>>, LedgerError> {
        Ok(self.get(identity))
    }

    #[instrument(skip(self, discovered), fields(count = discovered.len()))]
    fn save(&self, identity: &Identity, discovered: &[String]) -> Result<(), LedgerError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(LedgerError::new(format!("Save rejected for {}", identity)));
        }
        debug!("Storing ledger in memory");
        self.insert(identity.clone(), discovered.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_identity_loads_none() {
        let store = MemoryStore::new();
        assert_eq!(store.load(&Identity::Player(1)).unwrap(), None);
    }

    #[test]
    fn test_identities_are_isolated() {
        let store = MemoryStore::new();
        store.save(&Identity::Player(1), &["water".to_string()]).unwrap();
        assert_eq!(store.load(&Identity::Player(2)).unwrap(), None);
        assert_eq!(store.load(&Identity::Local).unwrap(), None);
    }

    #[test]
    fn test_failing_saves() {
        let store = MemoryStore::new();
        store.set_fail_saves(true);
        assert!(store.save(&Identity::Local, &[]).is_err());
        assert_eq!(store.get(&Identity::Local), None);
    }

    #[test]
    fn test_identity_display() {
        assert_eq!(Identity::Local.to_string(), "local");
        assert_eq!(Identity::Player(42).to_string(), "player 42");
    }
}
