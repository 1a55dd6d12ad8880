//! Scan, ingest and persisted user settings.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ConfigError;

/// Configuration for source enumeration.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct ScanConfig {
    /// Include hidden files and directories (names starting with `.`).
    #[builder(default = "false")]
    pub include_hidden: bool,

    /// Follow symbolic links while walking directories.
    #[builder(default = "false")]
    pub follow_symlinks: bool,

    /// Glob patterns matched against base names; matches are skipped.
    #[builder(default)]
    pub ignore_patterns: Vec<String>,

    /// Number of threads for directory walking (0 = auto-detect).
    #[builder(default = "0")]
    pub threads: usize,
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref patterns) = self.ignore_patterns {
            if patterns.iter().any(|p| p.trim().is_empty()) {
                return Err("Ignore patterns cannot be blank".to_string());
            }
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Check if hidden entries should be skipped.
    pub fn should_skip_hidden(&self, name: &str) -> bool {
        !self.include_hidden && name.starts_with('.')
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include_hidden: false,
            follow_symlinks: false,
            ignore_patterns: Vec::new(),
            threads: 0,
        }
    }
}

/// How a copied file is checked against its source.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum VerifyMode {
    /// Compare byte sizes only.
    #[default]
    Size,
    /// Compare sizes, then BLAKE3 digests of both files.
    Checksum,
}

/// Configuration for ingest runs and conflict resolution rounds.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
#[serde(default)]
pub struct IngestConfig {
    /// Post-copy verification strategy.
    #[builder(default)]
    pub verify: VerifyMode,

    /// Carry the source modification time over to the copy.
    #[builder(default = "true")]
    pub preserve_timestamps: bool,
}

impl IngestConfig {
    /// Create a new ingest config builder.
    pub fn builder() -> IngestConfigBuilder {
        IngestConfigBuilder::default()
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            verify: VerifyMode::Size,
            preserve_timestamps: true,
        }
    }
}

/// Persistent user settings stored in `settings.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Enumeration defaults.
    pub scan: ScanConfig,
    /// Ingest defaults.
    pub ingest: IngestConfig,
    /// Override for the operation log file.
    pub log_path: Option<PathBuf>,
}

impl Settings {
    /// Directory holding hatch's settings and operation log.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("hatch"))
    }

    /// Get the settings file path.
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("settings.toml"))
    }

    /// Load settings from the default location, or return defaults.
    ///
    /// A settings file that exists but cannot be parsed is reported and ignored.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable settings");
                Self::default()
            }
        }
    }

    /// Load settings from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Save settings to an explicit file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the operation log file: the configured override or the default.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_path
            .clone()
            .or_else(|| Self::config_dir().map(|d| d.join("ingest-logs.json")))
    }
}
