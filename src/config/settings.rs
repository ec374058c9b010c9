//! Output and logging settings
//!
//! # Main Types
//!
//! - [`OutputFormat`] - How the prototype report is printed
//! - [`LogSettings`] - Log filter and optional log file

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `Found prototypes:` followed by one C declaration per line
    #[default]
    Text,
    /// The full report as pretty-printed JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogSettings {
    /// `EnvFilter` directive, e.g. `debug` or `dwarf_prototypes=trace`.
    /// `RUST_LOG` wins when set.
    #[serde(default)]
    pub filter: Option<String>,

    /// Also write logs to this file
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl LogSettings {
    /// Set the log file
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }
}
