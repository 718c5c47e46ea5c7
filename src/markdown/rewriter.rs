//! Reassembly of chunks into document text.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use super::chunk::Chunk;
use crate::utils::fs::atomic_write;

/// Join every chunk's lines in order with `\n`.
#[must_use]
pub fn assemble(chunks: &[Chunk]) -> String {
    chunks.iter().flat_map(|chunk| chunk.lines.iter().map(String::as_str)).collect::<Vec<_>>().join("\n")
}

/// Write the reassembled document to `path` when it differs from `original`.
///
/// Returns whether the file was written.
///
/// # Errors
///
/// Fails when the atomic write fails.
pub fn write_if_changed(path: &Path, original: &str, chunks: &[Chunk]) -> Result<bool> {
    let output = assemble(chunks);
    if output == original {
        debug!("{} unchanged", path.display());
        return Ok(false);
    }

    atomic_write(path, output.as_bytes()).with_context(|| format!("write file {}", path.display()))?;
    Ok(true)
}
