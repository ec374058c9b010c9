//! Configuration for dwarf-prototypes
//!
//! Settings are read from a TOML file. Without an explicit path the file is
//! looked up in the platform config directory:
//! - **Linux**: `~/.config/dwarf-prototypes/config.toml`
//! - **macOS**: `~/Library/Application Support/dwarf-prototypes/config.toml`
//! - **Windows**: `%APPDATA%\dwarf-prototypes\config.toml`
//!
//! A missing file means defaults. Command line flags override file values.
//!
//! # Example
//!
//! ```toml
//! include_declarations = false
//! output = "json"
//!
//! [log]
//! filter = "dwarf_prototypes=debug"
//! file = "/tmp/dwarf-prototypes.log"
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{PrototypeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for the config directory
pub const APP_ID: &str = "dwarf-prototypes";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Get the default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID).join(CONFIG_FILE))
}

/// Extraction settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Also report subprograms that are declarations only (no body)
    #[serde(default = "default_true")]
    pub include_declarations: bool,

    #[serde(default)]
    pub output: OutputFormat,

    #[serde(default)]
    pub log: LogSettings,
}

fn default_true() -> bool {
    true
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            include_declarations: true,
            output: OutputFormat::default(),
            log: LogSettings::default(),
        }
    }
}

impl ExtractConfig {
    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PrototypeError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        toml::from_str(&content).map_err(|e| {
            PrototypeError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })
    }

    /// Load from the default location, or defaults when there is no file
    pub fn load_default() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Load `path` if given, the default location otherwise
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::load_default(),
        }
    }

    /// Save the config as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PrototypeError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| PrototypeError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            PrototypeError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractConfig::default();
        assert!(config.include_declarations);
        assert_eq!(config.output, OutputFormat::Text);
        assert_eq!(config.log, LogSettings::default());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ExtractConfig = toml::from_str("output = \"json\"").unwrap();
        assert!(config.include_declarations);
        assert_eq!(config.output, OutputFormat::Json);

        let config: ExtractConfig = toml::from_str("").unwrap();
        assert_eq!(config, ExtractConfig::default());
    }

    #[test]
    fn test_log_table() {
        let config: ExtractConfig = toml::from_str(
            r#"
            include_declarations = false

            [log]
            filter = "debug"
            "#,
        )
        .unwrap();
        assert!(!config.include_declarations);
        assert_eq!(config.log.filter.as_deref(), Some("debug"));
        assert!(config.log.file.is_none());
    }

    #[test]
    fn test_unknown_output_format_rejected() {
        let result: std::result::Result<ExtractConfig, _> = toml::from_str("output = \"yaml\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("dwarf-prototypes/config.toml"));
        }
    }
}
