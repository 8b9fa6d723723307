//! Configuration: which dataset to load and how to fetch it.
//!
//! Persisted as TOML. Resolution order is an explicit path, then
//! `$XDG_CONFIG_HOME/movie-query/config.toml` (falling back to
//! `~/.config/movie-query/config.toml`), then built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

const APP_DIR: &str = "movie-query";

/// Published dataset sizes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DatasetSize {
    #[default]
    Small,
    Medium,
    Large,
}

impl DatasetSize {
    /// Remote database name for this size.
    pub fn database_name(self) -> &'static str {
        match self {
            DatasetSize::Small => "database_small",
            DatasetSize::Medium => "database_medium",
            DatasetSize::Large => "database_large",
        }
    }
}

impl std::fmt::Display for DatasetSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetSize::Small => write!(f, "small"),
            DatasetSize::Medium => write!(f, "medium"),
            DatasetSize::Large => write!(f, "large"),
        }
    }
}

/// Dataset acquisition settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub size: DatasetSize,
    /// Base URL of the dataset server.
    pub base_url: String,
    /// Local dataset file. When set, the network is never consulted.
    pub file: Option<PathBuf>,
    /// Cache remote responses on disk and revalidate with ETags.
    pub cache: bool,
    /// Cache directory. Defaults to `$XDG_CACHE_HOME/movie-query`.
    pub cache_dir: Option<PathBuf>,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            size: DatasetSize::default(),
            base_url: "https://movie-database-server.appspot.com/".into(),
            file: None,
            cache: true,
            cache_dir: None,
            timeout_secs: 30,
        }
    }
}

impl DatasetConfig {
    /// Full URL of the configured dataset.
    pub fn url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.size.database_name()
        )
    }

    /// Cache directory to use, or `None` when caching is off or no
    /// directory can be determined.
    pub fn resolved_cache_dir(&self) -> Option<PathBuf> {
        if !self.cache {
            return None;
        }
        self.cache_dir
            .clone()
            .or_else(|| xdg_dir("XDG_CACHE_HOME", ".cache"))
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dataset: DatasetConfig,
}

impl Config {
    /// Load configuration from `path`, or from the default location if it
    /// exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Read and parse a TOML config file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&content, &path.display().to_string())?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse TOML text. `origin` names the source in error messages.
    pub fn from_toml_str(content: &str, origin: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }
}

/// Default config file location.
pub fn default_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("config.toml"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    std::env::var(var)
        .map(PathBuf::from)
        .ok()
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(home_fallback))
        })
        .map(|d| d.join(APP_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_small_dataset() {
        let cfg = Config::default();
        assert_eq!(cfg.dataset.size, DatasetSize::Small);
        assert_eq!(
            cfg.dataset.url(),
            "https://movie-database-server.appspot.com/database_small"
        );
        assert!(cfg.dataset.cache);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = Config::from_toml_str("[dataset]\nsize = \"large\"\n", "inline").unwrap();
        assert_eq!(cfg.dataset.size, DatasetSize::Large);
        assert_eq!(cfg.dataset.timeout_secs, 30);
        assert!(cfg.dataset.file.is_none());
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(Config::from_toml_str("", "inline").unwrap(), Config::default());
    }

    #[test]
    fn unknown_size_is_parse_error() {
        let err = Config::from_toml_str("[dataset]\nsize = \"huge\"\n", "inline").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn cache_off_has_no_cache_dir() {
        let cfg = DatasetConfig {
            cache: false,
            cache_dir: Some(PathBuf::from("/tmp/x")),
            ..Default::default()
        };
        assert_eq!(cfg.resolved_cache_dir(), None);
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let cfg = DatasetConfig {
            base_url: "http://localhost:8080".into(),
            size: DatasetSize::Medium,
            ..Default::default()
        };
        assert_eq!(cfg.url(), "http://localhost:8080/database_medium");
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
