//! One pass over one markdown file.
//!
//! Read, scan, render the stale blocks in document order, write back if
//! anything changed. The first failure abandons the file; images rendered
//! before it stay on disk, and the document is not rewritten.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::RenderConfig;
use crate::markdown::MarkdownDocument;
use crate::render::{DiagramRenderer, render_chunk};

/// An image produced during a file pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    /// 1-based line of the block's opening fence in the file as read
    pub line: usize,
    /// Image filename, relative to the output directory
    pub filename: String,
}

/// Outcome of [`process_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// The markdown file
    pub path: PathBuf,
    /// Number of render blocks found
    pub blocks: usize,
    /// Images rendered, in document order
    pub rendered: Vec<RenderedImage>,
    /// Whether the document was rewritten
    pub updated: bool,
}

/// Render every stale block of `path` and rewrite it if needed.
///
/// # Errors
///
/// Fails when the file cannot be read or written, a block is malformed, or a
/// render fails. Errors carry the failing block's line.
pub async fn process_file<R: DiagramRenderer>(
    path: &Path,
    config: &RenderConfig,
    renderer: &R,
) -> Result<FileReport> {
    let document = MarkdownDocument::read(path)?;
    let mut chunks = document.scan(&config.languages)?;
    let output_dir = config.output_dir_for(path);
    let context = path.display().to_string();

    let blocks = chunks.iter().filter(|chunk| chunk.is_renderable()).count();
    debug!("{}: {} render block(s)", context, blocks);

    let mut rendered = Vec::new();
    for chunk in chunks.iter_mut().filter(|chunk| chunk.should_render()) {
        let line = chunk.block.as_ref().map_or(0, |block| block.code_block_index + 1);

        let filename = render_chunk(chunk, renderer, &config.registry, &output_dir, &config.link_prefix, &context)
            .await
            .with_context(|| format!("line {line}: render chunk"))?;

        if let Some(filename) = filename {
            info!("[{}:{}] Rendered {}", context, line, filename);
            rendered.push(RenderedImage {
                line,
                filename,
            });
        }
    }

    let updated = document.write_chunks(&chunks)?;

    Ok(FileReport {
        path: path.to_path_buf(),
        blocks,
        rendered,
        updated,
    })
}
