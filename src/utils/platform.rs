//! Platform helpers for locating executables and expanding user paths.
//!
//! Backend commands and config values can contain `~/` and `$VAR`
//! references; [`expand_value`] resolves them the same way on every platform.
//!
//! # Examples
//!
//! ```rust,no_run
//! use mdrender::utils::platform::{expand_value, find_executable};
//!
//! # fn example() -> anyhow::Result<()> {
//! let jar = expand_value("$HOME/lib/plantuml.jar")?;
//! if find_executable("dot").is_none() {
//!     eprintln!("Graphviz is not installed");
//! }
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Checks if we're running on Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Gets the home directory path for the current user.
///
/// # Errors
///
/// Fails when no home directory can be determined from the environment.
pub fn get_home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| {
        let platform_help = if is_windows() {
            "On Windows: Check that the USERPROFILE environment variable is set"
        } else {
            "On Unix/Linux: Check that the HOME environment variable is set"
        };
        anyhow::anyhow!("Could not determine home directory.\n\n{platform_help}")
    })
}

/// Expands a leading `~` and `$VAR` / `${VAR}` references.
///
/// # Errors
///
/// Fails when a referenced environment variable is not set.
pub fn expand_value(value: &str) -> Result<String> {
    shellexpand::full(value)
        .map(std::borrow::Cow::into_owned)
        .with_context(|| {
            let platform_vars = if is_windows() {
                "Common Windows variables: $USERPROFILE, $APPDATA, $TEMP"
            } else {
                "Common Unix variables: $HOME, $USER, $TMPDIR"
            };
            format!(
                "Failed to expand environment variables in: {value}\n\n\
                Use $VAR or ${{VAR}} for variables that are set.\n\
                {platform_vars}"
            )
        })
}

/// Expands a user-supplied path (see [`expand_value`]).
///
/// # Errors
///
/// Fails when a referenced environment variable is not set.
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    expand_value(path).map(PathBuf::from)
}

/// Locate an executable the way the OS would when spawning it.
///
/// Paths with a directory component are checked directly.
#[must_use]
pub fn find_executable(cmd: &str) -> Option<PathBuf> {
    if Path::new(cmd).components().count() > 1 {
        let path = PathBuf::from(cmd);
        return path.is_file().then_some(path);
    }
    which::which(cmd).ok()
}
