//! Application configuration: optional TOML file merged with CLI flags.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use open_craft_engine::{CatalogSource, Normalizer};

/// HTTP listener settings.
#[derive(Debug, Clone, Getters, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_separator() -> char {
    Normalizer::default().separator()
}

/// Top-level configuration.
#[derive(Debug, Clone, Getters, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Catalog directory; `None` uses the embedded catalog.
    #[serde(default)]
    data_dir: Option<PathBuf>,

    /// Save directory; `None` uses the platform config directory.
    #[serde(default)]
    save_dir: Option<PathBuf>,

    /// Separator substituted for whitespace runs in identifiers.
    #[serde(default = "default_separator")]
    separator: char,

    /// HTTP front-end settings.
    #[serde(default)]
    http: HttpConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            save_dir: None,
            separator: default_separator(),
            http: HttpConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        if config.separator.is_whitespace() {
            return Err(ConfigError::new("Separator must not be whitespace"));
        }
        info!(
            data_dir = ?config.data_dir,
            save_dir = ?config.save_dir,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Loads the file when a path is given and it exists, else defaults.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::from_file(path),
            Some(path) => Err(ConfigError::new(format!(
                "Config file not found: {}",
                path.display()
            ))),
            None => {
                debug!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Applies command-line overrides, which win over file values.
    pub fn with_overrides(mut self, data_dir: Option<PathBuf>, save_dir: Option<PathBuf>) -> Self {
        if data_dir.is_some() {
            self.data_dir = data_dir;
        }
        if save_dir.is_some() {
            self.save_dir = save_dir;
        }
        self
    }

    /// Overrides the HTTP listener address.
    pub fn with_http(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.http.host = host;
        }
        if let Some(port) = port {
            self.http.port = port;
        }
        self
    }

    /// Returns true when the catalog is read from disk.
    pub fn developer_mode(&self) -> bool {
        self.data_dir.is_some()
    }

    /// Where the catalog comes from.
    pub fn catalog_source(&self) -> CatalogSource {
        match &self.data_dir {
            Some(dir) => CatalogSource::Directory(dir.clone()),
            None => CatalogSource::Embedded,
        }
    }

    /// Normalization rule for this configuration.
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.separator)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new config error with caller location tracking.
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(*config.separator(), '-');
        assert_eq!(*config.http().port(), 8080);
        assert!(!config.developer_mode());
    }

    #[test]
    fn test_full_file() {
        let config = AppConfig::from_toml(
            r#"
            data_dir = "data"
            save_dir = "/tmp/saves"
            separator = "_"

            [http]
            host = "0.0.0.0"
            port = 9000
            "#,
        )
        .unwrap();
        assert_eq!(config.catalog_source(), CatalogSource::Directory("data".into()));
        assert_eq!(config.normalizer().normalize("Steam Engine").as_str(), "steam_engine");
        assert_eq!(config.http().host(), "0.0.0.0");
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = AppConfig::from_toml(r#"save_dir = "/from/file""#)
            .unwrap()
            .with_overrides(None, Some("/from/cli".into()))
            .with_http(None, Some(3001));
        assert_eq!(config.save_dir().as_deref(), Some(Path::new("/from/cli")));
        assert_eq!(*config.http().port(), 3001);
    }

    #[test]
    fn test_whitespace_separator_rejected() {
        assert!(AppConfig::from_toml(r#"separator = " ""#).is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = AppConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.message.contains("not found"));
    }
}
