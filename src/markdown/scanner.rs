//! Single-pass partitioning of a document into chunks.

use anyhow::{Context, Result};
use tracing::{debug, trace};

use super::chunk::{Chunk, RenderBlock, recover_rendered_hash};
use super::directive::{match_directive, parse_render_options};
use super::template::{self, fence_marker, find_closing_fence};

/// Partition `lines` into ordered, contiguous chunks.
///
/// Renderable chunks are render directives for one of `languages`; every
/// other line lands in a plain chunk. Ordinary fenced blocks are skipped as a
/// whole so their content is never mistaken for a directive or a wrapper.
///
/// An empty `lines` yields no chunks.
///
/// # Errors
///
/// Fails when a directive carries invalid options or a render block is never
/// closed. The error names the 1-based line of the offending fence.
pub fn scan<S: AsRef<str>>(lines: &[S], languages: &[String]) -> Result<Vec<Chunk>> {
    let mut chunks = Vec::new();
    let mut cursor = 0;
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index].as_ref();
        if fence_marker(line).is_none() {
            index += 1;
            continue;
        }

        let Some(language) = match_directive(line, languages) else {
            // Ordinary code block: jump past the fence of the same kind and
            // at least the same length. An unclosed one swallows the rest of
            // the file as plain text.
            let next = find_closing_fence(lines, index).map_or(lines.len(), |closing| closing + 1);
            trace!("Skipping code block at line {}", index + 1);
            index = next;
            continue;
        };

        let block = renderable_chunk(lines, index, language, cursor)
            .with_context(|| format!("line {}: get renderable chunk", index + 1))?;

        if block.start_line_index > cursor {
            chunks.push(Chunk::plain(lines, cursor, block.start_line_index - 1));
        }
        debug!(
            "Found {} block at line {} spanning lines {}-{}",
            language,
            index + 1,
            block.start_line_index + 1,
            block.end_line_index + 1
        );

        cursor = block.end_line_index + 1;
        index = cursor;
        chunks.push(block);
    }

    if cursor < lines.len() {
        chunks.push(Chunk::plain(lines, cursor, lines.len() - 1));
    }

    Ok(chunks)
}

fn renderable_chunk<S: AsRef<str>>(
    lines: &[S],
    fence_index: usize,
    language: &str,
    floor: usize,
) -> Result<Chunk> {
    let fence_line = lines[fence_index].as_ref();
    let render_options = parse_render_options(fence_line, language, fence_index)?;
    let resolution = template::resolve(lines, fence_index, render_options.mode, floor)?;

    let closing = fence_index + resolution.closing_fence_offset - resolution.fence_offset;
    let code_block_content: Vec<String> =
        lines[fence_index + 1..closing].iter().map(|l| l.as_ref().to_string()).collect();

    let rendered_hash = if resolution.layout_in_place {
        recover_rendered_hash(lines[resolution.start + resolution.image_offset].as_ref())
    } else {
        String::new()
    };

    let mut chunk = Chunk::plain(lines, resolution.start, resolution.end);
    chunk.block = Some(RenderBlock {
        language: language.to_string(),
        code_block_index: fence_index,
        code_block_content,
        fence_relative_line_index: resolution.fence_offset,
        closing_fence_relative_line_index: resolution.closing_fence_offset,
        image_relative_line_index: resolution.image_offset,
        image_line_present: resolution.image_present,
        layout_in_place: resolution.layout_in_place,
        rendered_hash,
        has_hash_comment: render_options.has_hash_comment(),
        render_options,
    });
    Ok(chunk)
}
