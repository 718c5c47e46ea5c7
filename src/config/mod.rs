//! Run configuration for mdrender
//!
//! A [`RenderConfig`] is built once per run from the command-line flags and
//! the optional config file ([`GlobalConfig`]), then passed by reference to
//! every file pass. Flags take precedence over file values.
//!
//! # Modules
//!
//! - `global` - The TOML config file and its location

pub mod global;

pub use global::{BackendOverride, GlobalConfig};

use anyhow::Result;
use std::path::{Path, PathBuf};
use strsim::levenshtein;

use crate::constants::SUGGESTION_MAX_DISTANCE;
use crate::core::MdRenderError;
use crate::render::BackendRegistry;
use crate::utils::platform::resolve_path;

/// Everything a file pass needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Languages whose render blocks are processed, deduplicated, in flag order
    pub languages: Vec<String>,
    /// Where images go; the markdown file's own directory when `None`
    pub output_dir: Option<PathBuf>,
    /// Prepended to image filenames in image references
    pub link_prefix: String,
    /// Backends with config file overrides applied
    pub registry: BackendRegistry,
}

impl RenderConfig {
    /// Validate `languages` against the built-in backends and use defaults
    /// for everything else.
    ///
    /// # Errors
    ///
    /// See [`validate_languages`].
    pub fn new(languages: &[String]) -> Result<Self> {
        let registry = BackendRegistry::builtin();
        Ok(Self {
            languages: validate_languages(languages, &registry)?,
            output_dir: None,
            link_prefix: String::new(),
            registry,
        })
    }

    /// Build the run configuration from flags layered over the config file.
    ///
    /// # Errors
    ///
    /// Fails when the languages are invalid, a backend override is invalid,
    /// or the configured output directory cannot be expanded.
    pub fn from_sources(
        languages: &[String],
        output_dir: Option<PathBuf>,
        link_prefix: Option<String>,
        file: &GlobalConfig,
    ) -> Result<Self> {
        let registry = BackendRegistry::builtin().with_overrides(&file.backends)?;
        let languages = validate_languages(languages, &registry)?;

        let output_dir = match output_dir {
            Some(dir) => Some(dir),
            None => file.output_dir.as_deref().map(resolve_path).transpose()?,
        };
        let link_prefix = link_prefix.or_else(|| file.link_prefix.clone()).unwrap_or_default();

        Ok(Self {
            languages,
            output_dir,
            link_prefix,
            registry,
        })
    }

    /// Set the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set the link prefix.
    #[must_use]
    pub fn with_link_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.link_prefix = prefix.into();
        self
    }

    /// Directory receiving the images of `markdown_path`.
    #[must_use]
    pub fn output_dir_for(&self, markdown_path: &Path) -> PathBuf {
        if let Some(dir) = &self.output_dir {
            return dir.clone();
        }
        match markdown_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// Trim, deduplicate and check the requested languages.
///
/// # Errors
///
/// Fails with [`MdRenderError::ConfigError`] when no language is given or one
/// has no backend; a close match is offered for typos.
pub fn validate_languages(languages: &[String], registry: &BackendRegistry) -> Result<Vec<String>> {
    let mut validated: Vec<String> = Vec::new();

    for language in languages.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
        if !registry.contains(language) {
            let hint = suggest_language(language, registry)
                .map(|candidate| format!(", did you mean '{candidate}'?"))
                .unwrap_or_default();
            return Err(MdRenderError::ConfigError {
                message: format!(
                    "unsupported language '{language}'{hint} (supported: {})",
                    registry.languages().join(", ")
                ),
            }
            .into());
        }
        if !validated.iter().any(|l| l == language) {
            validated.push(language.to_string());
        }
    }

    if validated.is_empty() {
        return Err(MdRenderError::ConfigError {
            message: "at least one language is required (--languages)".to_string(),
        }
        .into());
    }

    Ok(validated)
}

fn suggest_language<'r>(language: &str, registry: &'r BackendRegistry) -> Option<&'r str> {
    registry
        .languages()
        .into_iter()
        .map(|candidate| (candidate, levenshtein(language, candidate)))
        .filter(|(_, distance)| *distance <= SUGGESTION_MAX_DISTANCE)
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}
