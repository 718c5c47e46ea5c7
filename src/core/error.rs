//! Error handling for mdrender
//!
//! This module provides the typed error enum used across the crate and the
//! user-friendly reporting layer used by the binary. The error system follows
//! two principles:
//! 1. **Strongly-typed errors** for precise handling in code and tests
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`MdRenderError`] - Enumerated error types for every failure mode
//! - [`ErrorContext`] - Wrapper that adds details and suggestions for display
//!
//! Lower layers return [`MdRenderError`] wrapped in [`anyhow::Error`] and add
//! location context (file path, code block line, operation) with
//! [`anyhow::Context`]. [`user_friendly_error`] digs the typed error back out of
//! the chain and pairs it with a suggestion.
//!
//! # Examples
//!
//! ```rust,no_run
//! use mdrender::core::{MdRenderError, user_friendly_error};
//! use anyhow::Context;
//!
//! fn render_block() -> anyhow::Result<()> {
//!     Err(MdRenderError::UnsupportedLanguage {
//!         language: "mermaid".to_string(),
//!     })
//!     .context("line 12: render chunk")
//! }
//!
//! if let Err(e) = render_block() {
//!     user_friendly_error(e).display();
//! }
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for mdrender operations.
///
/// Each variant maps to one of the fatal conditions a file pass can hit.
/// None of them are recovered from: the file being processed is abandoned and
/// the run stops.
///
/// # Error Categories
///
/// ## Directive and layout
/// - [`InvalidRenderOptions`](MdRenderError::InvalidRenderOptions) - malformed JSON or bad mode
/// - [`TemplateResolution`](MdRenderError::TemplateResolution) - block structure cannot be resolved
///
/// ## Backends
/// - [`UnsupportedLanguage`](MdRenderError::UnsupportedLanguage) - no backend registered
/// - [`BackendNotFound`](MdRenderError::BackendNotFound) - executable missing from `PATH`
/// - [`BackendFailed`](MdRenderError::BackendFailed) - non-zero exit or stream failure
///
/// ## Environment
/// - [`FileSystemError`](MdRenderError::FileSystemError) - read/write failures
/// - [`ConfigError`](MdRenderError::ConfigError) - invalid flags or config file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MdRenderError {
    /// The inline JSON after `render` could not be parsed or validated.
    #[error("Invalid render options on line {line}: {reason}")]
    InvalidRenderOptions {
        /// 1-based line number of the opening fence
        line: usize,
        /// Why the options were rejected
        reason: String,
        /// Closest valid value, when the rejection was a misspelling
        suggestion: Option<String>,
    },

    /// No backend is registered for the requested language.
    #[error("Unsupported render language: {language}")]
    UnsupportedLanguage {
        /// The language identifier that has no backend
        language: String,
    },

    /// The code block's surrounding structure could not be resolved.
    ///
    /// Raised at scan time, before any backend is invoked, e.g. for a fence
    /// that is never closed.
    #[error("Cannot resolve {mode} layout for code block on line {line}: {reason}")]
    TemplateResolution {
        /// The requested render mode
        mode: String,
        /// 1-based line number of the opening fence
        line: usize,
        /// Why resolution failed
        reason: String,
    },

    /// The backend executable could not be located.
    #[error("Renderer '{program}' for {language} not found in PATH")]
    BackendNotFound {
        /// Language being rendered
        language: String,
        /// Program that was looked up
        program: String,
    },

    /// The backend ran but did not produce an image.
    #[error("Renderer for {language} failed: {reason}")]
    BackendFailed {
        /// Language being rendered
        language: String,
        /// Exit status or stream failure description
        reason: String,
        /// Captured standard error of the backend process
        stderr: String,
    },

    /// File system operation failed.
    #[error("Failed to {operation} {path}: {reason}")]
    FileSystemError {
        /// The operation that failed (e.g. "read", "write")
        operation: String,
        /// Path the operation was applied to
        path: String,
        /// The underlying I/O error message
        reason: String,
    },

    /// Invalid configuration from flags or the config file.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

/// Error context wrapper that provides user-friendly error information.
///
/// When displayed, errors show:
/// 1. **error**: the main message in red
/// 2. **details**: the context chain (file, block, operation) in yellow
/// 3. **suggestion**: what to do about it in green
///
/// ```rust,no_run
/// use mdrender::core::{ErrorContext, MdRenderError};
///
/// ErrorContext::new(MdRenderError::UnsupportedLanguage { language: "mermaid".into() })
///     .with_suggestion("Use one of: dot, plantuml, pikchr")
///     .display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: MdRenderError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no details or suggestion.
    #[must_use]
    pub const fn new(error: MdRenderError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// The typed [`MdRenderError`] is located anywhere in the anyhow chain, so
/// callers are free to wrap it with as many `.context()` layers as they like.
/// The outer context messages become the details line, e.g.
/// `process file docs/a.md -> line 12: render chunk`.
///
/// I/O errors get filesystem-flavoured suggestions; everything else is shown
/// with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let location = context_trail(&error);

    if let Some(typed) = error.chain().find_map(|cause| cause.downcast_ref::<MdRenderError>()) {
        let mut ctx = create_error_context(typed.clone());
        if let Some(trail) = location {
            ctx.details = Some(match ctx.details.take() {
                Some(existing) => format!("{trail}\n{existing}"),
                None => trail,
            });
        }
        return ctx;
    }

    if let Some(io_error) = error.chain().find_map(|cause| cause.downcast_ref::<std::io::Error>()) {
        let ctx = match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => ErrorContext::new(MdRenderError::Other {
                message: error.to_string(),
            })
            .with_suggestion("Check file ownership and permissions of the markdown file and output directory"),
            std::io::ErrorKind::NotFound => ErrorContext::new(MdRenderError::Other {
                message: error.to_string(),
            })
            .with_suggestion("Check that the file or directory exists and the path is correct"),
            _ => ErrorContext::new(MdRenderError::Other {
                message: error.to_string(),
            }),
        };
        return ctx.with_details(io_error.to_string());
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();
    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(MdRenderError::Other {
        message,
    })
}

/// Join the context layers above the typed error into a breadcrumb.
fn context_trail(error: &anyhow::Error) -> Option<String> {
    let layers: Vec<String> = error
        .chain()
        .take_while(|cause| cause.downcast_ref::<MdRenderError>().is_none())
        .map(std::string::ToString::to_string)
        .collect();

    if layers.is_empty() {
        None
    } else {
        Some(layers.join(" -> "))
    }
}

/// Attach the suggestion that fits each error variant.
fn create_error_context(error: MdRenderError) -> ErrorContext {
    match &error {
        MdRenderError::InvalidRenderOptions {
            suggestion,
            ..
        } => {
            let hint = match suggestion {
                Some(candidate) => format!("Did you mean \"{candidate}\"?"),
                None => "Render options must be a single-line JSON object such as \
                         {\"mode\":\"code-collapsed\",\"filename\":\"diagram.svg\"}"
                    .to_string(),
            };
            ErrorContext::new(error).with_suggestion(hint)
        }
        MdRenderError::UnsupportedLanguage {
            ..
        } => ErrorContext::new(error).with_suggestion(format!(
            "Supported languages: {}",
            crate::render::BackendRegistry::builtin().languages().join(", ")
        )),
        MdRenderError::TemplateResolution {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Make sure every ```<language> render block is closed with a ``` line"),
        MdRenderError::BackendNotFound {
            program,
            ..
        } => {
            let hint = format!(
                "Install '{program}' or point [backends] in the mdrender config file at its location"
            );
            ErrorContext::new(error).with_suggestion(hint)
        }
        MdRenderError::BackendFailed {
            stderr,
            ..
        } => {
            let ctx = ErrorContext::new(error.clone())
                .with_suggestion("Check the diagram source for syntax errors");
            if stderr.trim().is_empty() { ctx } else { ctx.with_details(stderr.trim().to_string()) }
        }
        MdRenderError::FileSystemError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check that the path exists and is writable"),
        MdRenderError::ConfigError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Run 'mdrender render --help' for the accepted flags"),
        MdRenderError::Other {
            ..
        } => ErrorContext::new(error),
    }
}
