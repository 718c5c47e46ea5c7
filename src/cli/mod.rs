//! Command-line interface for mdrender.
//!
//! The CLI is built with `clap`'s derive API. Global flags control logging
//! and where the configuration file is read from; the actual work happens in
//! the subcommands.
//!
//! # Commands
//!
//! - `render` - Render diagram blocks in markdown files ([`render`])
//!
//! # Global Options
//!
//! - `--verbose` / `-v`: Debug logging
//! - `--quiet` / `-q`: Errors only; progress lines are suppressed
//! - `--config <path>`: Configuration file (also `MDRENDER_CONFIG`)
//!
//! # Examples
//!
//! ```bash
//! mdrender render README.md --languages dot
//! mdrender render docs --languages dot,plantuml --output-dir docs/img --link-prefix img/
//! mdrender -v render notes.md --languages pikchr
//! ```

pub mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::constants::CONFIG_PATH_ENV;

/// Settings derived from global flags, applied once before a command runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,

    /// Suppress progress lines on stdout
    pub quiet: bool,

    /// Explicit configuration file path
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Install the global tracing subscriber.
    ///
    /// `RUST_LOG` takes precedence over [`log_level`](Self::log_level). Logs
    /// go to stderr so they never mix with progress lines. Calling this more
    /// than once is harmless; later calls keep the first subscriber.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Render diagram code blocks in markdown files to images, in place.
#[derive(Parser, Debug)]
#[command(
    name = "mdrender",
    about = "Render diagram code blocks in markdown files to images",
    version,
    long_about = "Finds fenced code blocks marked with `render` (for example ```dot render) in \
                  markdown files, renders them with graphviz, plantuml or pikchr, and inserts \
                  or refreshes an image reference below each block. Blocks whose source has \
                  not changed since the last run are left alone."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    ///
    /// Equivalent to `RUST_LOG=debug`; an explicit `RUST_LOG` still wins.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors.
    ///
    /// Suppresses the "Rendered ..." and "Updated ..." lines and the run
    /// summary. Useful in scripts and pre-commit hooks.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file.
    ///
    /// Defaults to `~/.mdrender/config.toml`. An explicitly given file must
    /// exist; the default one is optional.
    #[arg(long, global = true, env = CONFIG_PATH_ENV, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Render diagram blocks in markdown files
    ///
    /// Each path may be a markdown file or a directory, which is searched
    /// recursively for `.md` and `.markdown` files.
    Render(render::RenderCommand),
}

impl Cli {
    /// Run the selected command with settings derived from the global flags.
    ///
    /// # Errors
    ///
    /// Propagates the command's error.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Build a [`CliConfig`] from the parsed flags.
    ///
    /// - `--verbose` logs at `debug`
    /// - `--quiet` logs at `error`
    /// - otherwise `warn`
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: log_level.to_string(),
            quiet: self.quiet,
            config_path: self.config.clone(),
        }
    }

    /// Run the selected command with an explicit [`CliConfig`].
    ///
    /// # Errors
    ///
    /// Propagates the command's error.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Render(cmd) => cmd.execute(&config).await,
        }
    }
}
