//! Document chunks and change detection.
//!
//! A document is split into an ordered list of [`Chunk`]s. Plain chunks pass
//! through untouched; renderable chunks carry a [`RenderBlock`] describing the
//! code block, where its image line lives and what fingerprint the document
//! says was last rendered.
//!
//! The fingerprint is the MD5 of the code block's lines joined with `\n`,
//! hex-encoded. It is recovered from the document in one of two forms:
//! - the full hash embedded in a generated filename, `render-<hash>.svg`
//! - the first eight characters in a `<!-- hash:… -->` comment, used when a
//!   custom filename hides the hash

use std::sync::LazyLock;

use md5::{Digest, Md5};
use regex::Regex;

use super::directive::RenderOptions;
use super::template;
use crate::constants::{FULL_HASH_LEN, SHORT_HASH_LEN};

/// `![render-<hash>.<ext>](<prefix>render-<hash>.<ext>)`, capturing the hash in the target.
static RENDERED_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[render-[0-9a-f]{32}\.[^\]]+\]\([^)]*render-([0-9a-f]{32})\.[^)]+\)")
        .expect("rendered image pattern is valid")
});

/// `<!-- hash:<short hash> -->`
static HASH_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!-- hash:([0-9a-f]{8}) -->").expect("hash comment pattern is valid"));

/// An ordered, contiguous segment of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Lines this chunk owns
    pub lines: Vec<String>,
    /// First line, inclusive, in the original document's numbering
    pub start_line_index: usize,
    /// Last line, inclusive, in the original document's numbering
    pub end_line_index: usize,
    /// Present when the chunk is a renderable code block
    pub block: Option<RenderBlock>,
}

/// The renderable part of a chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderBlock {
    /// Diagram language, one of the requested languages
    pub language: String,
    /// 0-based document line of the opening fence, for diagnostics
    pub code_block_index: usize,
    /// Lines between the opening and closing fence
    pub code_block_content: Vec<String>,
    /// Offset of the opening fence within the chunk's lines
    pub fence_relative_line_index: usize,
    /// Offset of the closing fence within the chunk's lines
    pub closing_fence_relative_line_index: usize,
    /// Offset of the image line within the chunk's lines
    pub image_relative_line_index: usize,
    /// Whether the image line exists yet; when false it is inserted on render
    pub image_line_present: bool,
    /// Whether the chunk already has the layout its mode asks for
    pub layout_in_place: bool,
    /// Fingerprint recovered from the document, empty if none
    pub rendered_hash: String,
    /// Whether the image line carries a `<!-- hash:… -->` comment
    pub has_hash_comment: bool,
    /// Options from the fence directive
    pub render_options: RenderOptions,
}

impl Chunk {
    /// A passthrough chunk covering `start..=end` of `lines`.
    #[must_use]
    pub fn plain<S: AsRef<str>>(lines: &[S], start: usize, end: usize) -> Self {
        Self {
            lines: lines[start..=end].iter().map(|l| l.as_ref().to_string()).collect(),
            start_line_index: start,
            end_line_index: end,
            block: None,
        }
    }

    /// Whether this chunk is a renderable code block.
    #[must_use]
    pub const fn is_renderable(&self) -> bool {
        self.block.is_some()
    }

    /// Whether the chunk needs to be (re-)rendered.
    ///
    /// Plain chunks never render.
    #[must_use]
    pub fn should_render(&self) -> bool {
        self.block.as_ref().is_some_and(RenderBlock::should_render)
    }

    /// Install the rendered image line.
    ///
    /// When the chunk already has its mode's layout, only the image line is
    /// replaced. Otherwise the chunk is rebuilt into the canonical layout
    /// around its code block.
    pub fn set_image_line(&mut self, image_line: String) {
        let Some(block) = self.block.as_mut() else {
            return;
        };

        if block.layout_in_place && block.image_line_present {
            self.lines[block.image_relative_line_index] = image_line;
            return;
        }

        let code_block =
            &self.lines[block.fence_relative_line_index..=block.closing_fence_relative_line_index];
        let (lines, image_offset) =
            template::materialize(block.render_options.mode, code_block, image_line);

        let code_block_span = block.closing_fence_relative_line_index - block.fence_relative_line_index;
        block.fence_relative_line_index = template::leading_lines(block.render_options.mode);
        block.closing_fence_relative_line_index = block.fence_relative_line_index + code_block_span;
        block.image_relative_line_index = image_offset;
        block.image_line_present = true;
        block.layout_in_place = true;
        self.lines = lines;
    }
}

impl RenderBlock {
    /// Fingerprint of the code block's current content.
    #[must_use]
    pub fn hash_content(&self) -> String {
        fingerprint(&self.code_block_content)
    }

    /// The fingerprint truncated to the length stored in hash comments.
    #[must_use]
    pub fn short_hash(&self) -> String {
        let mut hash = self.hash_content();
        hash.truncate(SHORT_HASH_LEN);
        hash
    }

    /// Render unless the recovered fingerprint matches in full or short form.
    #[must_use]
    pub fn should_render(&self) -> bool {
        if self.rendered_hash.is_empty() {
            return true;
        }
        let hash = self.hash_content();
        hash != self.rendered_hash && hash[..SHORT_HASH_LEN] != *self.rendered_hash
    }
}

/// MD5 of `lines` joined with `\n`, as 32 lowercase hex characters.
#[must_use]
pub fn fingerprint<S: AsRef<str>>(lines: &[S]) -> String {
    let joined = lines.iter().map(AsRef::as_ref).collect::<Vec<&str>>().join("\n");
    let digest = Md5::digest(joined.as_bytes());
    let hash = hex::encode(digest);
    debug_assert_eq!(hash.len(), FULL_HASH_LEN);
    hash
}

/// Recover a previously rendered fingerprint from an image line.
///
/// A hash embedded in a generated filename wins over a hash comment. Returns
/// an empty string when the line carries neither.
#[must_use]
pub fn recover_rendered_hash(image_line: &str) -> String {
    if let Some(caps) = RENDERED_IMAGE.captures(image_line) {
        return caps[1].to_string();
    }
    HASH_COMMENT.captures(image_line).map(|caps| caps[1].to_string()).unwrap_or_default()
}

/// The `<!-- hash:… -->` annotation for a short hash.
#[must_use]
pub fn hash_comment(short_hash: &str) -> String {
    format!("<!-- hash:{short_hash} -->")
}

/// The markdown image reference for a rendered file.
#[must_use]
pub fn markdown_image(filename: &str, link_prefix: &str) -> String {
    format!("![{filename}]({link_prefix}{filename})")
}
