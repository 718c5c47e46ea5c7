//! File system helpers for documents and rendered images.
//!
//! Every write goes through [`atomic_write`], so a markdown file or image is
//! either fully replaced or left as it was, never half-written.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::core::MdRenderError;

/// Ensures a directory exists, creating it and all parent directories if necessary.
///
/// # Errors
///
/// Fails if the path exists but is not a directory, or if creation fails.
///
/// # Examples
///
/// ```rust,no_run
/// use mdrender::utils::fs::ensure_dir;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// ensure_dir(Path::new("docs/img"))?;
/// # Ok(())
/// # }
/// ```
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| fs_error("create directory", path, &e))?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display()));
    }
    Ok(())
}

/// Atomically writes bytes to a file using a write-then-rename strategy.
///
/// The content goes to a temporary file in the target's directory, is synced,
/// then renamed over the target. Parent directories are created on demand.
///
/// # Errors
///
/// Fails if the directory cannot be created or any step of the write fails.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir(parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in: {}", parent.display()))?;

    temp.write_all(content)
        .with_context(|| format!("Failed to write temp file for: {}", path.display()))?;
    temp.as_file().sync_all().with_context(|| "Failed to sync file to disk")?;

    temp.persist(path).map_err(|e| fs_error("write", path, &e.error))?;

    Ok(())
}

/// Reads a UTF-8 text file.
///
/// # Errors
///
/// Fails with [`MdRenderError::FileSystemError`] when the file cannot be read
/// or is not valid UTF-8.
pub fn read_text_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| fs_error("read", path, &e).into())
}

fn fs_error(operation: &str, path: &Path, error: &std::io::Error) -> MdRenderError {
    MdRenderError::FileSystemError {
        operation: operation.to_string(),
        path: path.display().to_string(),
        reason: error.to_string(),
    }
}
