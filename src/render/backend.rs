//! Registry of diagram backends keyed by language.
//!
//! | language | invocation | formats |
//! |----------|------------|---------|
//! | `dot` | `dot -T<ext>` | svg, png |
//! | `plantuml` | `plantuml -t<ext> -pipe` | svg, png |
//! | `pikchr` | `pikchr --svg-only -` | svg |
//!
//! The config file can swap the program and prepend arguments, e.g. to run
//! PlantUML from a jar. Format arguments always come last.

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

use super::command::BackendCommand;
use crate::config::BackendOverride;
use crate::constants::DEFAULT_IMAGE_EXTENSION;
use crate::core::MdRenderError;
use crate::utils::platform::expand_value;

/// Arguments selecting one output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFormat {
    /// File extension, without the dot
    pub extension: String,
    /// Arguments appended to the command line for this format
    pub args: Vec<String>,
}

impl OutputFormat {
    fn new(extension: &str, args: &[&str]) -> Self {
        Self {
            extension: extension.to_string(),
            args: args.iter().map(|arg| (*arg).to_string()).collect(),
        }
    }
}

/// How to invoke the renderer for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    /// Diagram language handled by this backend
    pub language: String,
    /// Program name or path
    pub program: String,
    /// Arguments placed before the format arguments
    pub prefix_args: Vec<String>,
    /// Supported formats; the first one is the default
    pub formats: Vec<OutputFormat>,
}

impl Backend {
    /// Extensions this backend can produce.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.formats.iter().map(|format| format.extension.as_str())
    }

    /// The extension requested by `filename` if this backend produces it,
    /// otherwise svg.
    #[must_use]
    pub fn resolve_extension(&self, filename: &str) -> String {
        let requested = Path::new(filename).extension().and_then(|ext| ext.to_str()).unwrap_or_default();
        if self.extensions().any(|ext| ext == requested) {
            requested.to_string()
        } else {
            DEFAULT_IMAGE_EXTENSION.to_string()
        }
    }

    /// Full argument list for rendering to `extension`.
    #[must_use]
    pub fn command_args(&self, extension: &str) -> Vec<String> {
        let format = self
            .formats
            .iter()
            .find(|format| format.extension == extension)
            .or_else(|| self.formats.first());

        self.prefix_args.iter().chain(format.into_iter().flat_map(|f| f.args.iter())).cloned().collect()
    }

    /// A command rendering to `extension`, without input yet.
    #[must_use]
    pub fn command(&self, extension: &str) -> BackendCommand {
        BackendCommand::new(&self.language, &self.program).args(self.command_args(extension))
    }
}

/// Backends by language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRegistry {
    backends: BTreeMap<String, Backend>,
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl BackendRegistry {
    /// The built-in dot, plantuml and pikchr backends.
    #[must_use]
    pub fn builtin() -> Self {
        let backends = [
            Backend {
                language: "dot".to_string(),
                program: "dot".to_string(),
                prefix_args: Vec::new(),
                formats: vec![OutputFormat::new("svg", &["-Tsvg"]), OutputFormat::new("png", &["-Tpng"])],
            },
            Backend {
                language: "plantuml".to_string(),
                program: "plantuml".to_string(),
                prefix_args: Vec::new(),
                formats: vec![
                    OutputFormat::new("svg", &["-tsvg", "-pipe"]),
                    OutputFormat::new("png", &["-tpng", "-pipe"]),
                ],
            },
            Backend {
                language: "pikchr".to_string(),
                program: "pikchr".to_string(),
                prefix_args: Vec::new(),
                formats: vec![OutputFormat::new("svg", &["--svg-only", "-"])],
            },
        ];

        Self {
            backends: backends.into_iter().map(|backend| (backend.language.clone(), backend)).collect(),
        }
    }

    /// Apply config file overrides on top of this registry.
    ///
    /// `command` and `args` go through `~`/`$VAR` expansion.
    ///
    /// # Errors
    ///
    /// Fails with [`MdRenderError::ConfigError`] when an override names a
    /// language without a backend, and when expansion fails.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, BackendOverride>) -> Result<Self> {
        for (language, config) in overrides {
            let known = self.languages().join(", ");
            let Some(backend) = self.backends.get_mut(language) else {
                return Err(MdRenderError::ConfigError {
                    message: format!("backend override for unknown language '{language}' (known: {known})"),
                }
                .into());
            };

            if let Some(command) = &config.command {
                backend.program = expand_value(command)?;
            }
            backend.prefix_args =
                config.args.iter().map(|arg| expand_value(arg)).collect::<Result<Vec<_>>>()?;
        }
        Ok(self)
    }

    /// The backend for `language`.
    ///
    /// # Errors
    ///
    /// Returns [`MdRenderError::UnsupportedLanguage`] when none is registered.
    pub fn get(&self, language: &str) -> Result<&Backend, MdRenderError> {
        self.backends.get(language).ok_or_else(|| MdRenderError::UnsupportedLanguage {
            language: language.to_string(),
        })
    }

    /// Whether a backend is registered for `language`.
    #[must_use]
    pub fn contains(&self, language: &str) -> bool {
        self.backends.contains_key(language)
    }

    /// Registered languages, sorted.
    #[must_use]
    pub fn languages(&self) -> Vec<&str> {
        self.backends.keys().map(String::as_str).collect()
    }
}
