//! User configuration file for mdrender.
//!
//! The file is optional. It supplies defaults for command-line flags and
//! lets users point a language at a different renderer installation.
//!
//! # Location
//!
//! In order of precedence:
//! 1. `--config <path>`
//! 2. the `MDRENDER_CONFIG` environment variable
//! 3. `~/.mdrender/config.toml` (`%LOCALAPPDATA%\mdrender\config.toml` on Windows)
//!
//! # Example
//!
//! ```toml
//! link_prefix = "/img/"
//! output_dir = "docs/img"
//!
//! [backends.plantuml]
//! command = "java"
//! args = ["-jar", "$HOME/lib/plantuml.jar"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::core::MdRenderError;
use crate::utils::platform::{get_home_dir, is_windows};

/// Contents of the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GlobalConfig {
    /// Default for `--link-prefix`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_prefix: Option<String>,

    /// Default for `--output-dir`; `~` and `$VAR` are expanded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,

    /// Per-language renderer overrides
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub backends: BTreeMap<String, BackendOverride>,
}

/// Replacement invocation for one language's renderer.
///
/// The format arguments (`-Tsvg`, `-tpng -pipe`, ...) are still appended
/// after `args`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BackendOverride {
    /// Program to run instead of the default one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Arguments placed before the format arguments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl GlobalConfig {
    /// Load configuration from an optional path.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// used and a missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An explicit path does not exist
    /// - The file exists but cannot be read
    /// - The file contains invalid TOML or does not match the schema
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(MdRenderError::ConfigError {
                    message: format!("config file {} does not exist", path.display()),
                }
                .into());
            }
            return Self::load_from(&path).await;
        }

        match Self::default_path() {
            Ok(path) if path.exists() => Self::load_from(&path).await,
            Ok(_) => Ok(Self::default()),
            Err(e) => {
                tracing::debug!("No default config location: {e}");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config = toml::from_str(&content).map_err(|e| MdRenderError::ConfigError {
            message: format!("invalid config file {}: {}", path.display(), e.message()),
        })?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Get the default file path for the configuration file.
    ///
    /// - **Windows**: `%LOCALAPPDATA%\mdrender\config.toml`
    /// - **Unix/macOS**: `~/.mdrender/config.toml`
    ///
    /// # Errors
    ///
    /// Returns an error if the home (or local data) directory cannot be
    /// determined.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if is_windows() {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("mdrender")
        } else {
            get_home_dir()?.join(".mdrender")
        };

        Ok(config_dir.join("config.toml"))
    }
}
