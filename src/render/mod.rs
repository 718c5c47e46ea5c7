//! Rendering diagram blocks to image files.
//!
//! [`DiagramRenderer`] is the seam between the document engine and the
//! outside world: it turns diagram source into image bytes. The production
//! implementation, [`ProcessRenderer`], runs the backend registered for the
//! language; tests substitute a recording fake.
//!
//! [`render_chunk`] drives one renderable chunk through a renderer, writes
//! the image, and installs the new image line in the chunk.

pub mod backend;
pub mod command;

pub use backend::{Backend, BackendRegistry, OutputFormat};
pub use command::{BackendCommand, BackendOutput};

use anyhow::{Context, Result};
use std::future::Future;
use std::path::Path;
use tracing::{debug, warn};

use crate::constants::{DEFAULT_IMAGE_EXTENSION, RENDERED_FILENAME_PREFIX};
use crate::markdown::chunk::{Chunk, hash_comment, markdown_image};
use crate::utils::fs::atomic_write;

/// One diagram to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    /// Diagram language
    pub language: String,
    /// Requested image format, e.g. `svg`
    pub extension: String,
    /// Diagram source, the code block's lines joined with `\n`
    pub source: String,
    /// Where the block lives, for log lines (`docs/a.md:12`)
    pub context: String,
}

/// Turns diagram source into image bytes.
pub trait DiagramRenderer {
    /// Render one diagram.
    fn render(&self, request: RenderRequest) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Renders by running the backend process registered for each language.
#[derive(Debug, Clone, Default)]
pub struct ProcessRenderer {
    registry: BackendRegistry,
}

impl ProcessRenderer {
    /// A renderer using `registry` to find backends.
    #[must_use]
    pub const fn new(registry: BackendRegistry) -> Self {
        Self {
            registry,
        }
    }
}

impl DiagramRenderer for ProcessRenderer {
    fn render(&self, request: RenderRequest) -> impl Future<Output = Result<Vec<u8>>> + Send {
        async move {
            let backend = self.registry.get(&request.language)?;
            let context = request.context.clone();
            let output = backend
                .command(&request.extension)
                .stdin(request.source)
                .with_context(request.context)
                .execute()
                .await
                .with_context(|| format!("render {}", request.language))?;
            if !output.stderr.trim().is_empty() {
                warn!(target: "render", "({}) {} reported: {}", context, request.language, output.stderr.trim());
            }
            Ok(output.stdout)
        }
    }
}

/// Name of the image file for a block: the explicit filename, or one derived
/// from the content fingerprint.
#[must_use]
pub fn output_filename(explicit: Option<&str>, hash: &str) -> String {
    explicit.map_or_else(
        || format!("{RENDERED_FILENAME_PREFIX}{hash}.{DEFAULT_IMAGE_EXTENSION}"),
        ToString::to_string,
    )
}

/// Render a chunk, write its image under `output_dir`, and update its image
/// line. Returns the image filename. Plain chunks are left alone and yield
/// `None`.
///
/// `context` prefixes log lines, typically the markdown file path.
///
/// # Errors
///
/// Fails when the language has no backend, the renderer fails, or the image
/// cannot be written.
pub async fn render_chunk<R: DiagramRenderer>(
    chunk: &mut Chunk,
    renderer: &R,
    registry: &BackendRegistry,
    output_dir: &Path,
    link_prefix: &str,
    context: &str,
) -> Result<Option<String>> {
    let Some(block) = chunk.block.as_ref() else {
        return Ok(None);
    };

    let backend = registry.get(&block.language)?;
    let hash = block.hash_content();
    let filename = output_filename(block.render_options.filename.as_deref(), &hash);
    let extension = backend.resolve_extension(&filename);

    let request = RenderRequest {
        language: block.language.clone(),
        extension,
        source: block.code_block_content.join("\n"),
        context: format!("{context}:{}", block.code_block_index + 1),
    };
    debug!("Rendering {} block from {} as {}", request.language, request.context, filename);

    let image = renderer.render(request).await?;

    let image_path = output_dir.join(&filename);
    atomic_write(&image_path, &image)
        .with_context(|| format!("create output file {}", image_path.display()))?;

    let mut image_line = markdown_image(&filename, link_prefix);
    if block.has_hash_comment {
        image_line.push(' ');
        image_line.push_str(&hash_comment(&block.short_hash()));
    }
    chunk.set_image_line(image_line);

    Ok(Some(filename))
}
