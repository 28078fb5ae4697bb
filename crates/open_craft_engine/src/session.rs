//! Player sessions and the directory that hands them out.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use derive_getters::Getters;
use tracing::{debug, info, instrument, warn};

use crate::{
    Catalog, Category, CombineOutcome, Element, Identity, Ledger, LedgerError, LedgerStore,
    UntriedCombination, combine,
};

/// When a session writes its ledger back to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitPolicy {
    /// After every combine that changed the ledger (chat bot, HTTP).
    Immediate,
    /// Only on an explicit [`Session::commit`] (terminal: save key or exit).
    Deferred,
}

/// Result of [`Session::combine`].
#[derive(Debug, Clone, Getters)]
pub struct CombineReport {
    /// What the combination produced.
    outcome: CombineOutcome,
    /// Set when an immediate commit failed. The discovery itself stands.
    save_error: Option<LedgerError>,
}

impl CombineReport {
    /// Returns true unless an attempted commit failed.
    pub fn saved(&self) -> bool {
        self.save_error.is_none()
    }
}

/// One identity's view of the game: the shared catalog plus its own ledger.
#[derive(Debug)]
pub struct Session {
    identity: Identity,
    catalog: Arc<Catalog>,
    store: Arc<dyn LedgerStore>,
    policy: CommitPolicy,
    ledger: Ledger,
    dirty: bool,
}

impl Session {
    /// Opens a session: loads the stored ledger and seeds the bootstrap
    /// elements when nothing usable was stored.
    ///
    /// A freshly seeded ledger is persisted right away under
    /// [`CommitPolicy::Immediate`] and marked unsaved under
    /// [`CommitPolicy::Deferred`]. A failed seed write is logged only.
    #[instrument(skip(catalog, store))]
    pub fn open(
        identity: Identity,
        catalog: Arc<Catalog>,
        store: Arc<dyn LedgerStore>,
        policy: CommitPolicy,
    ) -> Self {
        let mut ledger = Ledger::load(store.as_ref(), &identity, &catalog);
        let seeded = ledger.seed_bootstrap(&catalog);

        let mut session = Self {
            identity,
            catalog,
            store,
            policy,
            ledger,
            dirty: seeded,
        };

        if seeded && policy == CommitPolicy::Immediate {
            if let Err(e) = session.commit() {
                warn!(identity = %session.identity, error = %e, "Failed to persist seeded ledger");
            }
        }

        info!(
            identity = %session.identity,
            discovered = session.ledger.len(),
            seeded,
            "Session opened"
        );
        session
    }

    /// Owner of this session.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Shared catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// This session's ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Commit policy in force.
    pub fn policy(&self) -> CommitPolicy {
        self.policy
    }

    /// Returns true if the ledger has changes not yet written.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Combines two elements and applies the commit policy.
    ///
    /// A failed immediate commit is reported in the [`CombineReport`]; the
    /// in-memory discovery is kept and retried on the next commit.
    #[instrument(skip(self), fields(identity = %self.identity))]
    pub fn combine(&mut self, first: &str, second: &str) -> CombineReport {
        let outcome = combine(&self.catalog, &mut self.ledger, first, second);
        if outcome.is_new_discovery() {
            self.dirty = true;
        }

        let mut save_error = None;
        if self.policy == CommitPolicy::Immediate
            && self.dirty
            && matches!(outcome, CombineOutcome::Created { .. })
        {
            if let Err(e) = self.commit() {
                warn!(error = %e, "Immediate commit failed, keeping discovery in memory");
                save_error = Some(e);
            }
        }

        CombineReport {
            outcome,
            save_error,
        }
    }

    /// Writes the ledger to the store and clears the dirty flag.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the store rejects the write; the session
    /// stays dirty.
    #[instrument(skip(self), fields(identity = %self.identity))]
    pub fn commit(&mut self) -> Result<(), LedgerError> {
        self.ledger.save(self.store.as_ref(), &self.identity)?;
        self.dirty = false;
        debug!("Session committed");
        Ok(())
    }

    /// Discovery check on raw (unnormalized) input.
    pub fn is_discovered(&self, raw: &str) -> bool {
        self.ledger.is_discovered(&self.catalog.normalize(raw))
    }

    /// Discovered elements sorted by display name.
    pub fn discovered_list(&self) -> Vec<&Element> {
        let mut list: Vec<&Element> = self
            .ledger
            .iter()
            .filter_map(|id| self.catalog.element(id))
            .collect();
        list.sort_by(|a, b| a.name().cmp(b.name()));
        list
    }

    /// Discovered elements of one category, sorted by display name.
    pub fn discovered_in_category(&self, category: Category) -> Vec<&Element> {
        self.discovered_list()
            .into_iter()
            .filter(|element| *element.category() == Some(category))
            .collect()
    }

    /// Untried combinations across the whole catalog.
    pub fn untried_combinations(&self) -> Vec<UntriedCombination<'_>> {
        self.catalog.untried_combinations()
    }

    /// `(discovered, total)` element counts.
    pub fn progress(&self) -> (usize, usize) {
        (self.ledger.len(), self.catalog.len())
    }
}

/// A session shared between tasks.
pub type SharedSession = Arc<Mutex<Session>>;

/// Directory entry, filled once the session has been opened.
type SessionSlot = Arc<OnceLock<SharedSession>>;

/// Hands out exactly one session per identity.
///
/// Sessions for different identities proceed in parallel; operations on the
/// same identity are serialized by that session's mutex.
#[derive(Debug, Clone)]
pub struct SessionDirectory {
    catalog: Arc<Catalog>,
    store: Arc<dyn LedgerStore>,
    policy: CommitPolicy,
    sessions: Arc<Mutex<HashMap<Identity, SessionSlot>>>,
}

impl SessionDirectory {
    /// Creates an empty directory.
    #[instrument(skip(catalog, store))]
    pub fn new(catalog: Arc<Catalog>, store: Arc<dyn LedgerStore>, policy: CommitPolicy) -> Self {
        info!("Creating session directory");
        Self {
            catalog,
            store,
            policy,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the session for `identity`, opening it on first use.
    ///
    /// Only the slot lookup happens under the directory lock. Opening (store
    /// I/O included) runs on the identity's own slot, so racing first
    /// requests for one identity share a single session while other
    /// identities are not held up.
    #[instrument(skip(self))]
    pub fn get_or_create(&self, identity: &Identity) -> SharedSession {
        let slot = {
            let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(sessions.entry(identity.clone()).or_default())
        };

        let session = slot.get_or_init(|| {
            let session = Session::open(
                identity.clone(),
                Arc::clone(&self.catalog),
                Arc::clone(&self.store),
                self.policy,
            );
            debug!("Registered session");
            Arc::new(Mutex::new(session))
        });
        Arc::clone(session)
    }

    /// Runs `f` with exclusive access to the identity's session.
    pub fn with_session<T>(&self, identity: &Identity, f: impl FnOnce(&mut Session) -> T) -> T {
        let shared = self.get_or_create(identity);
        let mut guard = lock_session(&shared);
        f(&mut guard)
    }

    /// Commits every dirty session, returning the failures.
    #[instrument(skip(self))]
    pub fn commit_all(&self) -> Vec<(Identity, LedgerError)> {
        let sessions: Vec<SharedSession> = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter_map(|slot| slot.get().cloned())
            .collect();

        let mut failures = Vec::new();
        for shared in sessions {
            let mut session = lock_session(&shared);
            if session.is_dirty() {
                if let Err(e) = session.commit() {
                    failures.push((session.identity().clone(), e));
                }
            }
        }
        failures
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    /// Returns true if no session has been opened.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shared catalog.
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Policy applied to sessions opened by this directory.
    pub fn policy(&self) -> CommitPolicy {
        self.policy
    }
}

/// Locks a session, recovering the data from a poisoned mutex.
fn lock_session(shared: &SharedSession) -> MutexGuard<'_, Session> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, Normalizer};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::thread;
    use std::time::Duration;

    fn directory(policy: CommitPolicy) -> (SessionDirectory, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let catalog = Arc::new(Catalog::embedded().unwrap());
        (SessionDirectory::new(catalog, store.clone(), policy), store)
    }

    #[test]
    fn test_immediate_seed_is_persisted() {
        let (dir, store) = directory(CommitPolicy::Immediate);
        dir.get_or_create(&Identity::Player(1));
        assert_eq!(
            store.get(&Identity::Player(1)).unwrap(),
            vec!["earth", "fire", "water", "wind"]
        );
    }

    #[test]
    fn test_deferred_seed_is_dirty_not_written() {
        let (dir, store) = directory(CommitPolicy::Deferred);
        let dirty = dir.with_session(&Identity::Local, |s| s.is_dirty());
        assert!(dirty);
        assert!(store.get(&Identity::Local).is_none());
    }

    #[test]
    fn test_immediate_combine_commits() {
        let (dir, store) = directory(CommitPolicy::Immediate);
        let report = dir.with_session(&Identity::Player(2), |s| s.combine("water", "fire"));
        assert!(report.saved());
        assert!(store.get(&Identity::Player(2)).unwrap().contains(&"steam".to_string()));
    }

    #[test]
    fn test_deferred_combine_waits_for_commit() {
        let (dir, store) = directory(CommitPolicy::Deferred);
        dir.with_session(&Identity::Local, |s| {
            s.combine("water", "fire");
            assert!(s.is_dirty());
        });
        assert!(store.get(&Identity::Local).is_none());

        dir.with_session(&Identity::Local, |s| s.commit()).unwrap();
        assert!(store.get(&Identity::Local).unwrap().contains(&"steam".to_string()));
        assert!(!dir.with_session(&Identity::Local, |s| s.is_dirty()));
    }

    #[test]
    fn test_save_failure_keeps_discovery() {
        let (dir, store) = directory(CommitPolicy::Immediate);
        dir.get_or_create(&Identity::Player(3));
        store.set_fail_saves(true);

        let report = dir.with_session(&Identity::Player(3), |s| s.combine("water", "fire"));
        assert!(!report.saved());
        assert!(dir.with_session(&Identity::Player(3), |s| s.is_discovered("steam")));
        assert!(dir.with_session(&Identity::Player(3), |s| s.is_dirty()));
    }

    #[test]
    fn test_one_session_per_identity() {
        let (dir, _) = directory(CommitPolicy::Immediate);
        let a = dir.get_or_create(&Identity::Player(4));
        let b = dir.get_or_create(&Identity::Player(4));
        assert!(Arc::ptr_eq(&a, &b));
        dir.get_or_create(&Identity::Player(5));
        assert_eq!(dir.len(), 2);
    }

    #[test]
    fn test_commit_all_flushes_dirty_sessions() {
        let (dir, store) = directory(CommitPolicy::Deferred);
        dir.with_session(&Identity::Local, |s| s.combine("water", "fire"));
        assert!(dir.commit_all().is_empty());
        assert!(store.get(&Identity::Local).is_some());
    }

    #[test]
    fn test_discovered_in_category() {
        let (dir, _) = directory(CommitPolicy::Deferred);
        let names: Vec<String> = dir.with_session(&Identity::Local, |s| {
            s.discovered_in_category(Category::Primordial)
                .iter()
                .map(|e| e.name().to_string())
                .collect()
        });
        assert_eq!(names, vec!["Earth", "Fire", "Water", "Wind"]);
    }

    #[test]
    fn test_seed_follows_catalog() {
        let catalog = Arc::new(
            Catalog::from_documents(
                r#"{
                    "water": {"name": "Water"},
                    "fire": {"name": "Fire"},
                    "steam": {"name": "Steam"}
                }"#,
                r#"{"water+fire": "steam"}"#,
                "[]",
                Normalizer::default(),
            )
            .unwrap(),
        );
        let session = Session::open(
            Identity::Local,
            catalog,
            Arc::new(MemoryStore::new()),
            CommitPolicy::Deferred,
        );
        assert_eq!(session.ledger().to_list(), vec!["fire", "water"]);
        assert_eq!(session.progress(), (2, 3));
        assert_eq!(session.discovered_list().len(), session.ledger().len());
    }

    /// Store whose first load for `Player(1)` waits for a release signal.
    #[derive(Debug)]
    struct GatedStore {
        inner: MemoryStore,
        entered: Mutex<Sender<()>>,
        release: Mutex<Receiver<()>>,
        released: AtomicBool,
    }

    impl LedgerStore for GatedStore {
        fn load(&self, identity: &Identity) -> Result<Option<Vec<String>>, LedgerError> {
            if *identity == Identity::Player(1) {
                let _ = self.entered.lock().unwrap().send(());
                let _ = self.release.lock().unwrap().recv_timeout(Duration::from_secs(5));
                self.released.store(true, Ordering::SeqCst);
            }
            self.inner.load(identity)
        }

        fn save(&self, identity: &Identity, discovered: &[String]) -> Result<(), LedgerError> {
            self.inner.save(identity, discovered)
        }
    }

    #[test]
    fn test_slow_open_does_not_block_other_identities() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let store = Arc::new(GatedStore {
            inner: MemoryStore::new(),
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
            released: AtomicBool::new(false),
        });
        let catalog = Arc::new(Catalog::embedded().unwrap());
        let dir = SessionDirectory::new(catalog, store.clone(), CommitPolicy::Deferred);

        let slow = {
            let dir = dir.clone();
            thread::spawn(move || {
                dir.get_or_create(&Identity::Player(1));
            })
        };
        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        dir.get_or_create(&Identity::Player(2));
        assert!(
            !store.released.load(Ordering::SeqCst),
            "Player 2 waited for Player 1 to finish opening"
        );
        assert_eq!(dir.len(), 1);

        release_tx.send(()).unwrap();
        slow.join().unwrap();
        assert_eq!(dir.len(), 2);
    }
}
