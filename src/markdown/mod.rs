//! Markdown documents and the render block engine.
//!
//! This module turns a markdown file into an ordered list of chunks, decides
//! which diagram blocks need rendering, and reassembles the document. It never
//! builds a markdown AST: documents are handled line by line, so everything
//! outside a render block is written back byte for byte.
//!
//! # Render Blocks
//!
//! A render block is a fenced code block whose info string is
//! `<language> render`, optionally followed by JSON options:
//!
//! ````text
//! ```dot render {"mode":"code-collapsed"}
//! digraph { a -> b }
//! ```
//! ![render-5e0f….svg](render-5e0f….svg)
//! ````
//!
//! The image line below the block records what was rendered, so a later run
//! can tell whether the source changed without any external state.
//!
//! # Submodules
//!
//! - [`directive`] - recognize render directives and parse their options
//! - [`template`] - the canonical layout of each render mode
//! - [`chunk`] - chunk model and change detection
//! - [`scanner`] - split a document into chunks
//! - [`rewriter`] - join chunks back into text and persist it
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use mdrender::markdown::MarkdownDocument;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let doc = MarkdownDocument::read(Path::new("docs/architecture.md"))?;
//! let chunks = doc.scan(&["dot".to_string()])?;
//! let stale = chunks.iter().filter(|c| c.should_render()).count();
//! println!("{stale} diagrams need rendering");
//! # Ok(())
//! # }
//! ```

pub mod chunk;
pub mod directive;
pub mod rewriter;
pub mod scanner;
pub mod template;

pub use chunk::{Chunk, RenderBlock};
pub use directive::{RenderMode, RenderOptions};

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::core::MdRenderError;
use crate::utils::fs::read_text_file;

/// A markdown file loaded into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownDocument {
    /// Where the document was read from and is written back to
    pub path: PathBuf,
    /// The document exactly as read
    pub raw: String,
}

impl MarkdownDocument {
    /// Create a document from text that lives at `path`.
    #[must_use]
    pub const fn new(path: PathBuf, raw: String) -> Self {
        Self {
            path,
            raw,
        }
    }

    /// Read a document from disk.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid UTF-8.
    pub fn read(path: &Path) -> Result<Self> {
        let raw = read_text_file(path)?;
        Ok(Self::new(path.to_path_buf(), raw))
    }

    /// The document's lines, split on `\n` only.
    ///
    /// A `\r` before the newline stays part of the line, and a trailing
    /// newline yields a final empty line, so joining with `\n` gives back
    /// [`raw`](Self::raw) exactly.
    #[must_use]
    pub fn lines(&self) -> Vec<&str> {
        self.raw.split('\n').collect()
    }

    /// Partition the document into chunks for the requested languages.
    ///
    /// # Errors
    ///
    /// See [`scanner::scan`].
    pub fn scan(&self, languages: &[String]) -> Result<Vec<Chunk>> {
        scanner::scan(&self.lines(), languages)
    }

    /// Write `chunks` back to [`path`](Self::path) if they differ from the
    /// document as read. Returns whether the file was written.
    ///
    /// # Errors
    ///
    /// Fails when the write fails.
    pub fn write_chunks(&self, chunks: &[Chunk]) -> Result<bool> {
        rewriter::write_if_changed(&self.path, &self.raw, chunks)
    }
}

/// Check if a path has a markdown extension (`.md` or `.markdown`, any case).
///
/// ```rust,no_run
/// # use mdrender::markdown::is_markdown_file;
/// # use std::path::Path;
/// assert!(is_markdown_file(Path::new("README.MD")));
/// assert!(!is_markdown_file(Path::new("diagram.svg")));
/// ```
#[must_use]
pub fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
}

/// Recursively find all markdown files in a directory.
///
/// Entries that cannot be read are skipped. Results are sorted so runs are
/// deterministic.
///
/// # Errors
///
/// Currently infallible; the `Result` leaves room for strict traversal.
pub fn list_markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if !dir.exists() {
        return Ok(files);
    }

    for entry in walkdir::WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        let path = entry.path();
        if path.is_file() && is_markdown_file(path) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// Expand command-line paths into the markdown files to process.
///
/// Directories expand to every markdown file beneath them; files are taken as
/// given whatever their extension. Duplicates keep their first position.
///
/// # Errors
///
/// Fails with [`MdRenderError::FileSystemError`] for a path that does not
/// exist.
pub fn collect_markdown_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();

    for path in paths {
        let expanded = if path.is_dir() {
            list_markdown_files(path)?
        } else if path.is_file() {
            vec![path.clone()]
        } else {
            return Err(MdRenderError::FileSystemError {
                operation: "find".to_string(),
                path: path.display().to_string(),
                reason: "no such file or directory".to_string(),
            }
            .into());
        };

        for file in expanded {
            if !files.contains(&file) {
                files.push(file);
            }
        }
    }

    Ok(files)
}
