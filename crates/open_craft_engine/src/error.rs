//! Engine error types.

use derive_more::{Display, Error};
use std::path::PathBuf;
use tracing::instrument;

/// Content error raised while loading the catalog.
///
/// Every variant is fatal at startup: the engine never runs on a partial
/// catalog.
#[derive(Debug, Display, Error)]
pub enum CatalogError {
    /// A data document could not be read from disk.
    #[display("Failed to read {} from {}: {}", document, path.display(), source)]
    Read {
        /// Document name (e.g. `elements.json`).
        document: &'static str,
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A data document is not valid JSON of the expected shape.
    #[display("Failed to parse {}: {}", document, source)]
    Parse {
        /// Document name (e.g. `recipes.json`).
        document: &'static str,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The documents parsed but contradict each other.
    #[display("Catalog is inconsistent ({} issue(s)): {}", issues.len(), issues.join("; "))]
    Inconsistent {
        /// Every issue found by validation.
        issues: Vec<String>,
    },
}

/// Persistence error with location tracking.
///
/// Load failures degrade to a new-player ledger; save failures are reported
/// but never roll back in-memory progress.
#[derive(Debug, Clone, Display, Error)]
#[display("Ledger error: {} at {}:{}", message, file, line)]
pub struct LedgerError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LedgerError {
    /// Creates a new ledger error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Serialization error: {}", err))
    }
}

impl From<std::io::Error> for LedgerError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}
