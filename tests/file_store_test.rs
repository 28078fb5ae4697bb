//! Tests for the file-backed ledger store.

use std::fs;
use std::sync::Arc;

use open_craft::{FileStore, StoragePaths};
use open_craft_engine::{Catalog, CommitPolicy, Identity, LedgerStore, Session, SessionDirectory};
use tempfile::TempDir;

fn setup_store() -> (TempDir, FileStore) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = FileStore::new(StoragePaths::new(dir.path()));
    (dir, store)
}

fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::embedded().expect("Embedded catalog must validate"))
}

#[test]
fn test_missing_file_loads_none() {
    let (_dir, store) = setup_store();
    assert_eq!(store.load(&Identity::Local).expect("Load failed"), None);
}

#[test]
fn test_save_writes_pretty_json_array() {
    let (dir, store) = setup_store();
    store
        .save(&Identity::Local, &["fire".to_string(), "water".to_string()])
        .expect("Save failed");

    let content = fs::read_to_string(dir.path().join("progress.json")).expect("Read failed");
    assert_eq!(content, "[\n  \"fire\",\n  \"water\"\n]");
}

#[test]
fn test_player_files_are_separate() {
    let (dir, store) = setup_store();
    store.save(&Identity::Player(1), &["water".to_string()]).expect("Save failed");
    store.save(&Identity::Player(2), &["fire".to_string()]).expect("Save failed");

    assert!(dir.path().join("players/1.json").exists());
    assert!(dir.path().join("players/2.json").exists());
    assert_eq!(
        store.load(&Identity::Player(2)).expect("Load failed"),
        Some(vec!["fire".to_string()])
    );
}

#[test]
fn test_malformed_file_is_error() {
    let (dir, store) = setup_store();
    fs::write(dir.path().join("progress.json"), "{\"discovered\": true}").expect("Write failed");
    assert!(store.load(&Identity::Local).is_err());
}

#[test]
fn test_malformed_file_starts_fresh_session() {
    let (dir, store) = setup_store();
    fs::write(dir.path().join("progress.json"), "not json").expect("Write failed");

    let session = Session::open(Identity::Local, catalog(), Arc::new(store), CommitPolicy::Deferred);
    assert_eq!(session.ledger().to_list(), vec!["earth", "fire", "water", "wind"]);
}

#[test]
fn test_legacy_save_is_normalized_and_filtered() {
    let (dir, store) = setup_store();
    fs::write(
        dir.path().join("progress.json"),
        r#"["Water", "FIRE", "Steam Engine", "phlogiston"]"#,
    )
    .expect("Write failed");

    let session = Session::open(Identity::Local, catalog(), Arc::new(store), CommitPolicy::Deferred);
    assert_eq!(session.ledger().to_list(), vec!["fire", "steam-engine", "water"]);
    assert!(!session.is_dirty());
}

#[test]
fn test_progress_survives_restart() {
    let (dir, _) = setup_store();

    let first = SessionDirectory::new(
        catalog(),
        Arc::new(FileStore::new(StoragePaths::new(dir.path()))),
        CommitPolicy::Immediate,
    );
    first.with_session(&Identity::Player(9), |s| s.combine("water", "fire"));
    drop(first);

    let second = SessionDirectory::new(
        catalog(),
        Arc::new(FileStore::new(StoragePaths::new(dir.path()))),
        CommitPolicy::Immediate,
    );
    assert!(second.with_session(&Identity::Player(9), |s| s.is_discovered("steam")));
}

#[test]
fn test_unwritable_save_dir_keeps_progress_in_memory() {
    let (dir, _) = setup_store();
    let blocker = dir.path().join("blocked");
    fs::write(&blocker, "not a directory").expect("Write failed");

    let store = FileStore::new(StoragePaths::new(&blocker));
    let directory = SessionDirectory::new(catalog(), Arc::new(store), CommitPolicy::Immediate);

    let report = directory.with_session(&Identity::Player(3), |s| s.combine("water", "fire"));
    assert!(report.outcome().is_new_discovery());
    assert!(!report.saved());
    assert!(directory.with_session(&Identity::Player(3), |s| s.is_discovered("steam")));
}
