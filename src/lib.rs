//! Open Craft - element combination game front-ends.
//!
//! The game rules live in [`open_craft_engine`]. This crate adds what a
//! running game needs around them.
//!
//! # Architecture
//!
//! - **Config**: TOML file plus command-line overrides
//! - **Storage**: save-file layout and the file-backed ledger store
//! - **Terminal**: ratatui menu app for the local player
//! - **Bot**: chat conversation handler behind a transport trait
//! - **Server**: axum HTTP API
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use open_craft::{FileStore, StoragePaths};
//! use open_craft_engine::{Catalog, CommitPolicy, SessionDirectory};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let catalog = Arc::new(Catalog::embedded()?);
//! let store = FileStore::new(StoragePaths::resolve(None)?);
//! let directory = SessionDirectory::new(catalog, Arc::new(store), CommitPolicy::Immediate);
//! open_craft::server::serve(directory, "127.0.0.1", 8080).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod storage;

// Public front-end modules
pub mod bot;
pub mod messages;
pub mod server;
pub mod tui;

// Crate-level exports - Configuration
pub use config::{AppConfig, ConfigError, HttpConfig};

// Crate-level exports - Storage
pub use storage::{FileStore, StoragePaths};
