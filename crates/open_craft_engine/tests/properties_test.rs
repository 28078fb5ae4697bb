//! Behavioral properties of the engine, exercised through the public API.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use open_craft_engine::{
    Catalog, CombineOutcome, CommitPolicy, ElementId, Identity, Ledger, MemoryStore, Normalizer,
    SessionDirectory, combine,
};

fn scenario_catalog() -> Catalog {
    Catalog::from_documents(
        r#"{
            "water": {"name": "Water", "category": "Primordial"},
            "fire": {"name": "Fire", "category": "Primordial"},
            "earth": {"name": "Earth", "category": "Primordial"},
            "wind": {"name": "Wind", "category": "Primordial"},
            "steam": {"name": "Steam", "category": "Atmospheric"}
        }"#,
        r#"{"water+fire": "steam"}"#,
        "[]",
        Normalizer::default(),
    )
    .expect("Scenario catalog must be valid")
}

fn ids(ledger: &Ledger) -> BTreeSet<String> {
    ledger.iter().map(ToString::to_string).collect()
}

#[test]
fn test_scenario_water_and_fire_make_steam() {
    let catalog = scenario_catalog();
    let mut ledger = Ledger::bootstrap(&catalog);

    let outcome = combine(&catalog, &mut ledger, "Water", "FIRE");

    assert_eq!(outcome.result(), Some(&ElementId::parse("steam")));
    assert!(ledger.is_discovered(&ElementId::parse("steam")));
}

#[test]
fn test_scenario_earth_and_wind_cannot_combine() {
    let catalog = scenario_catalog();
    let mut ledger = Ledger::bootstrap(&catalog);
    let before = ids(&ledger);

    let outcome = combine(&catalog, &mut ledger, "earth", "wind");

    assert_eq!(outcome, CombineOutcome::NoRecipe);
    assert_eq!(ids(&ledger), before);
}

#[test]
fn test_every_recipe_works_in_both_directions() {
    let catalog = Catalog::embedded().expect("Embedded catalog must be valid");
    let all: Vec<ElementId> = catalog.elements().map(|e| e.id().clone()).collect();

    for a in &all {
        for b in &all {
            let mut forward = Ledger::new();
            forward.add_discovered(a.clone());
            forward.add_discovered(b.clone());
            let mut reverse = forward.clone();

            let ab = combine(&catalog, &mut forward, a.as_str(), b.as_str());
            let ba = combine(&catalog, &mut reverse, b.as_str(), a.as_str());
            assert_eq!(ab, ba, "{a}+{b} differs from {b}+{a}");
            assert_eq!(forward, reverse);
            if let Some(result) = ab.result() {
                assert!(forward.is_discovered(result));
            }
        }
    }

    // Ledgers missing one or both operands must reject symmetrically.
    let bootstrap = Ledger::bootstrap(&catalog);
    let mut one_known = bootstrap.clone();
    one_known.add_discovered(ElementId::parse("steam"));
    for start in [Ledger::new(), bootstrap, one_known] {
        for a in &all {
            for b in &all {
                let mut forward = start.clone();
                let mut reverse = start.clone();
                let ab = combine(&catalog, &mut forward, a.as_str(), b.as_str());
                let ba = combine(&catalog, &mut reverse, b.as_str(), a.as_str());
                assert_eq!(ab, ba, "{a}+{b} differs from {b}+{a}");
                assert_eq!(forward, reverse);
            }
        }
    }

    let mut ledger = Ledger::bootstrap(&catalog);
    assert_eq!(
        combine(&catalog, &mut ledger, "steam", "lava"),
        combine(&catalog, &mut ledger, "lava", "steam")
    );
}

#[test]
fn test_undiscovered_operand_never_mutates() {
    let catalog = Catalog::embedded().expect("Embedded catalog must be valid");
    let mut ledger = Ledger::bootstrap(&catalog);
    let before = ids(&ledger);

    for element in catalog.elements() {
        if ledger.is_discovered(element.id()) {
            continue;
        }
        let outcome = combine(&catalog, &mut ledger, element.name(), "water");
        assert!(matches!(outcome, CombineOutcome::Undiscovered { .. }));
    }
    assert_eq!(ids(&ledger), before);
}

#[test]
fn test_round_trip_through_store() {
    let catalog = Arc::new(Catalog::embedded().expect("Embedded catalog must be valid"));
    let store = Arc::new(MemoryStore::new());

    let first = SessionDirectory::new(catalog.clone(), store.clone(), CommitPolicy::Immediate);
    let saved = first.with_session(&Identity::Player(11), |s| {
        s.combine("water", "fire");
        s.combine("steam", "wind");
        s.ledger().clone()
    });

    let second = SessionDirectory::new(catalog, store, CommitPolicy::Immediate);
    let restored = second.with_session(&Identity::Player(11), |s| s.ledger().clone());
    assert_eq!(restored, saved);
    assert!(restored.is_discovered(&ElementId::parse("cloud")));
}

#[test]
fn test_identities_do_not_share_progress() {
    let catalog = Arc::new(Catalog::embedded().expect("Embedded catalog must be valid"));
    let directory =
        SessionDirectory::new(catalog, Arc::new(MemoryStore::new()), CommitPolicy::Immediate);

    directory.with_session(&Identity::Player(1), |s| s.combine("water", "fire"));

    assert!(directory.with_session(&Identity::Player(1), |s| s.is_discovered("steam")));
    assert!(!directory.with_session(&Identity::Player(2), |s| s.is_discovered("steam")));
    assert!(!directory.with_session(&Identity::Local, |s| s.is_discovered("steam")));
}

#[test]
fn test_concurrent_first_requests_share_one_session() {
    let catalog = Arc::new(Catalog::embedded().expect("Embedded catalog must be valid"));
    let store = Arc::new(MemoryStore::new());
    let directory = SessionDirectory::new(catalog, store.clone(), CommitPolicy::Immediate);

    let pairs = [("water", "fire"), ("water", "earth"), ("fire", "earth"), ("water", "water")];
    let handles: Vec<_> = pairs
        .into_iter()
        .map(|(a, b)| {
            let directory = directory.clone();
            thread::spawn(move || {
                directory.with_session(&Identity::Player(77), |s| s.combine(a, b));
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Worker panicked");
    }

    assert_eq!(directory.len(), 1);
    let stored: BTreeSet<String> = store
        .get(&Identity::Player(77))
        .expect("Progress should be stored")
        .into_iter()
        .collect();
    for expected in ["steam", "mud", "sea"] {
        assert!(stored.contains(expected), "missing {expected}");
    }
}
