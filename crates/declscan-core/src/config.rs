//! Project configuration for declscan.
//!
//! Configuration is read from `declscan.json` at the project root when it
//! exists. Every field has a default, so an absent file or an empty object
//! are both valid. CLI flags are layered on top via [`ProjectConfig::merge_cli`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::{FileFilterSpec, FilterError};

/// Name of the optional configuration file at the project root.
pub const CONFIG_FILE_NAME: &str = "declscan.json";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The config file is not valid JSON for [`ProjectConfig`].
    #[error("invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Project analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Glob patterns a source path must match (empty = all).
    pub include: Vec<String>,

    /// Glob patterns removed from the source set.
    pub exclude: Vec<String>,

    /// Include `_test.go` files in packages.
    pub include_tests: bool,

    /// Follow symlinks while walking the project root.
    pub follow_symlinks: bool,

    /// Skip source files larger than this many bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<u64>,

    /// Treat two directories declaring the same package name as a layout error.
    pub unique_package_names: bool,
}

impl ProjectConfig {
    /// Load `declscan.json` from `root`, falling back to defaults when absent.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE_NAME);
        match fs::read_to_string(&path) {
            Ok(text) => {
                let config = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
                    path: path.clone(),
                    source,
                })?;
                tracing::debug!("loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ProjectConfig::default()),
            Err(source) => Err(ConfigError::Io { path, source }),
        }
    }

    /// Layer command-line overrides on top of the loaded configuration.
    ///
    /// Non-empty pattern lists are appended; `include_tests` is only ever
    /// switched on.
    pub fn merge_cli(mut self, include: &[String], exclude: &[String], tests: bool) -> Self {
        self.include.extend(include.iter().cloned());
        self.exclude.extend(exclude.iter().cloned());
        self.include_tests |= tests;
        self
    }

    /// Compile the include/exclude patterns into a filter.
    pub fn filter(&self) -> Result<FileFilterSpec, FilterError> {
        let include: Vec<&str> = self.include.iter().map(String::as_str).collect();
        let exclude: Vec<&str> = self.exclude.iter().map(String::as_str).collect();
        FileFilterSpec::from_parts(&include, &exclude)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ProjectConfig::load(dir.path()).unwrap();
        assert_eq!(config, ProjectConfig::default());
        assert!(!config.include_tests);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{"exclude": ["**/*_gen.go"], "max_file_size": 1024}"#,
        )
        .unwrap();
        let config = ProjectConfig::load(dir.path()).unwrap();
        assert_eq!(config.exclude, vec!["**/*_gen.go".to_string()]);
        assert_eq!(config.max_file_size, Some(1024));
        assert!(config.include.is_empty());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), r#"{"bogus": true}"#).unwrap();
        let err = ProjectConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
    }

    #[test]
    fn cli_overrides_are_layered() {
        let config = ProjectConfig {
            exclude: vec!["a/**".to_string()],
            ..Default::default()
        }
        .merge_cli(&["pkg/**".to_string()], &["b/**".to_string()], true);
        assert_eq!(config.include, vec!["pkg/**".to_string()]);
        assert_eq!(config.exclude, vec!["a/**".to_string(), "b/**".to_string()]);
        assert!(config.include_tests);
    }

    #[test]
    fn filter_compiles_patterns() {
        let config = ProjectConfig {
            exclude: vec!["legacy/**".to_string()],
            ..Default::default()
        };
        let filter = config.filter().unwrap();
        assert!(filter.matches(Path::new("pkg/a.go")));
        assert!(!filter.matches(Path::new("legacy/a.go")));
    }
}
