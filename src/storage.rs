//! Save-file locations and the file-backed ledger store.

use std::path::{Path, PathBuf};

use open_craft_engine::{Identity, LedgerError, LedgerStore};
use tracing::{debug, info, instrument, warn};

use crate::ConfigError;

const APP_DIR: &str = "open-craft";
const LOCAL_PROGRESS: &str = "progress.json";
const PLAYERS_DIR: &str = "players";

/// Resolved save-file layout.
///
/// ```text
/// <root>/progress.json        local terminal player
/// <root>/players/<id>.json    chat and HTTP players
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    root: PathBuf,
}

impl StoragePaths {
    /// Uses `root` as the save directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Uses the configured directory or falls back to the platform config
    /// directory.
    #[instrument]
    pub fn resolve(save_dir: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(dir) = save_dir {
            return Ok(Self::new(dir));
        }
        let base = dirs::config_dir()
            .ok_or_else(|| ConfigError::new("Cannot determine user config directory"))?;
        let paths = Self::new(base.join(APP_DIR));
        debug!(root = %paths.root.display(), "Resolved save directory");
        Ok(paths)
    }

    /// Save directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Save file of the local player.
    pub fn local_progress(&self) -> PathBuf {
        self.root.join(LOCAL_PROGRESS)
    }

    /// Save file of a numeric player.
    pub fn player_progress(&self, id: i64) -> PathBuf {
        self.root.join(PLAYERS_DIR).join(format!("{}.json", id))
    }

    /// Save file for any identity.
    pub fn progress_for(&self, identity: &Identity) -> PathBuf {
        match identity {
            Identity::Local => self.local_progress(),
            Identity::Player(id) => self.player_progress(*id),
        }
    }
}

/// Ledger store writing one pretty-printed JSON array per identity.
#[derive(Debug, Clone)]
pub struct FileStore {
    paths: StoragePaths,
}

impl FileStore {
    /// Creates a store rooted at the given layout.
    #[instrument]
    pub fn new(paths: StoragePaths) -> Self {
        info!(root = %paths.root().display(), "Using file-backed ledger store");
        Self { paths }
    }

    /// Save-file layout.
    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }
}

impl LedgerStore for FileStore {
    #[instrument(skip(self))]
    fn load(&self, identity: &Identity) -> Result<Option<Vec<String>>, LedgerError> {
        let path = self.paths.progress_for(identity);
        if !path.exists() {
            debug!(path = %path.display(), "No save file");
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        let list: Vec<String> = serde_json::from_str(&content).map_err(|e| {
            warn!(path = %path.display(), error = %e, "Save file is not a JSON array");
            LedgerError::new(format!("Malformed save file {}: {}", path.display(), e))
        })?;
        Ok(Some(list))
    }

    #[instrument(skip(self, discovered), fields(count = discovered.len()))]
    fn save(&self, identity: &Identity, discovered: &[String]) -> Result<(), LedgerError> {
        let path = self.paths.progress_for(identity);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(discovered)?;
        std::fs::write(&path, content)?;
        debug!(path = %path.display(), "Wrote save file");
        Ok(())
    }
}
