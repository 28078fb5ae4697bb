//! Open Craft engine - element catalog, discovery ledgers and player sessions.
//!
//! This crate holds everything with real invariants in the game. Front-ends
//! (terminal, chat bot, HTTP) only supply an [`Identity`] and a
//! [`LedgerStore`], then drive a [`Session`] obtained from a
//! [`SessionDirectory`].
//!
//! # Architecture
//!
//! - **Catalog**: immutable elements, recipes and impossibilities
//! - **Ledger**: per-player set of discovered elements
//! - **Resolver**: discovery-gated combination of two elements
//! - **Enumerator**: pairs with neither a recipe nor a known impossibility
//! - **Session**: one identity, the shared catalog and its own ledger
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use open_craft_engine::{Catalog, CommitPolicy, Identity, MemoryStore, SessionDirectory};
//!
//! # fn example() -> Result<(), open_craft_engine::CatalogError> {
//! let catalog = Arc::new(Catalog::embedded()?);
//! let directory = SessionDirectory::new(catalog, Arc::new(MemoryStore::new()), CommitPolicy::Immediate);
//!
//! let outcome = directory.with_session(&Identity::Local, |session| {
//!     session.combine("Water", "FIRE").outcome().clone()
//! });
//! assert_eq!(outcome.result().map(|id| id.as_str()), Some("steam"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod catalog;
mod element;
mod enumerator;
mod error;
mod ledger;
mod normalize;
mod pair;
mod resolver;
mod session;
mod store;

// Crate-level exports - Catalog
pub use catalog::{Catalog, CatalogSource};
pub use element::{Category, Element};

// Crate-level exports - Identifiers
pub use normalize::{ElementId, Normalizer};
pub use pair::PairKey;

// Crate-level exports - Ledger and persistence
pub use ledger::{BOOTSTRAP_ELEMENTS, Ledger};
pub use store::{Identity, LedgerStore, MemoryStore};

// Crate-level exports - Combination and enumeration
pub use enumerator::{UntriedCombination, suggest_untried};
pub use resolver::{CombineOutcome, combine};

// Crate-level exports - Sessions
pub use session::{CombineReport, CommitPolicy, Session, SessionDirectory, SharedSession};

// Crate-level exports - Errors
pub use error::{CatalogError, LedgerError};
