use blockpage_document::{document_seed, Breakpoint};
use blockpage_editor::StoreOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_NAME: &str = "blockpage.config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Blockpage configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Breakpoint used when a command does not name one
    #[serde(default)]
    pub default_breakpoint: Breakpoint,

    /// Undo levels kept per session (0 = unlimited)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Seed for generated ids; derived from the page file name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_seed: Option<String>,

    /// Write pages as indented JSON
    #[serde(default = "default_pretty_output")]
    pub pretty_output: bool,
}

fn default_history_limit() -> usize {
    100
}

fn default_pretty_output() -> bool {
    true
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if !config_path.exists() {
            // Return default config if none exists
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
            path: config_path.clone(),
            source,
        })?;
        let config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: config_path.clone(),
            source,
        })?;

        tracing::debug!(path = %config_path.display(), "loaded config");
        Ok(config)
    }

    /// Store settings for editing the page at `page_path`
    pub fn store_options(&self, page_path: &Path) -> StoreOptions {
        let id_seed = self.id_seed.clone().unwrap_or_else(|| {
            let name = page_path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("page");
            document_seed(name)
        });

        StoreOptions {
            id_seed,
            history_limit: self.history_limit,
            breakpoint: self.default_breakpoint,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_breakpoint: Breakpoint::Default,
            history_limit: default_history_limit(),
            id_seed: None,
            pretty_output: default_pretty_output(),
        }
    }
}
