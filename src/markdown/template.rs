//! Structural layouts of rendered blocks.
//!
//! Each [`RenderMode`] owns one canonical arrangement of the code block, the
//! image line and any wrapper markup. With `F`/`E` the opening and closing
//! fences and `I` the image line:
//!
//! | mode | lines |
//! |------|-------|
//! | normal | `F … E`, `I` |
//! | code-collapsed | `<details>`, `<summary>Source</summary>`, blank, `F … E`, blank, `</details>`, blank, `I` |
//! | image-collapsed | `F … E`, blank, `<details>`, `<summary>Image</summary>`, blank, `I`, blank, `</details>` |
//! | code-hidden | `<div hidden>`, blank, `F … E`, blank, `</div>`, blank, `I` |
//!
//! [`resolve`] recognizes these arrangements around a fence so a document that
//! was rendered before is re-scanned into the same span, and [`materialize`]
//! produces them. Both directions use the same constants, which is what keeps
//! repeated runs at a fixed point.

use std::sync::LazyLock;

use regex::Regex;

use super::directive::RenderMode;
use crate::core::MdRenderError;

/// Opens a disclosure section.
pub const DETAILS_OPEN: &str = "<details>";
/// Closes a disclosure section.
pub const DETAILS_CLOSE: &str = "</details>";
/// Summary of the disclosure wrapping the code block.
pub const CODE_SUMMARY: &str = "<summary>Source</summary>";
/// Summary of the disclosure wrapping the image.
pub const IMAGE_SUMMARY: &str = "<summary>Image</summary>";
/// Opens the element hiding the code block.
pub const HIDDEN_OPEN: &str = "<div hidden>";
/// Closes the element hiding the code block.
pub const HIDDEN_CLOSE: &str = "</div>";

/// A line that holds nothing but a markdown image, optionally annotated.
static IMAGE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^!\[[^\]]*\]\([^)]+\)(?:\s*<!-- hash:[0-9A-Za-z]+ -->)?\s*$")
        .expect("image line pattern is valid")
});

/// Where a renderable block sits in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// First line of the chunk (inclusive, document numbering)
    pub start: usize,
    /// Last line of the chunk (inclusive, document numbering)
    pub end: usize,
    /// Offset of the opening fence within the chunk
    pub fence_offset: usize,
    /// Offset of the closing fence within the chunk
    pub closing_fence_offset: usize,
    /// Offset of the image line within the chunk
    pub image_offset: usize,
    /// Whether the image line already exists at `image_offset`
    pub image_present: bool,
    /// Whether the chunk already has the requested mode's layout
    pub layout_in_place: bool,
}

/// Whether `line` is a bare markdown image reference.
#[must_use]
pub fn is_image_line(line: &str) -> bool {
    IMAGE_LINE.is_match(line.trim_end())
}

/// Fence character and run length of a line that opens a fenced block.
///
/// Backtick and tilde fences of three or more characters count, indented by
/// at most three spaces.
#[must_use]
pub fn fence_marker(line: &str) -> Option<(char, usize)> {
    let body = strip_indent(line)?;
    let marker = body.chars().next().filter(|c| matches!(*c, '`' | '~'))?;
    let run = body.chars().take_while(|c| *c == marker).count();
    (run >= 3).then_some((marker, run))
}

fn strip_indent(line: &str) -> Option<&str> {
    let body = line.trim_start_matches(' ');
    (line.len() - body.len() <= 3).then_some(body)
}

/// Whether `line` closes a block opened with `marker`: the same character,
/// at least as many times, and nothing else.
fn closes_fence(line: &str, (marker, run): (char, usize)) -> bool {
    strip_indent(line)
        .map(str::trim_end)
        .is_some_and(|body| body.len() >= run && body.chars().all(|c| c == marker))
}

/// Index of the fence closing the block opened at `fence_index`.
///
/// Returns `None` when that line is not a fence or the block runs to the end
/// of the document.
#[must_use]
pub fn find_closing_fence<S: AsRef<str>>(lines: &[S], fence_index: usize) -> Option<usize> {
    let marker = fence_marker(lines.get(fence_index)?.as_ref())?;
    lines
        .iter()
        .enumerate()
        .skip(fence_index + 1)
        .find(|(_, line)| closes_fence(line.as_ref(), marker))
        .map(|(idx, _)| idx)
}

/// Resolve the span of the renderable block opened at `fence_index`.
///
/// The requested mode's layout is tried first, then every other mode's so
/// markup left behind by a previous mode is absorbed and replaced rather than
/// stranded in a plain chunk. When nothing matches, the chunk is the bare code
/// block and the image goes right after it. `floor` is the first line not yet
/// claimed by an earlier chunk; wrappers never reach below it.
///
/// # Errors
///
/// Returns [`MdRenderError::TemplateResolution`] when the block is never closed.
pub fn resolve<S: AsRef<str>>(
    lines: &[S],
    fence_index: usize,
    mode: RenderMode,
    floor: usize,
) -> Result<Resolution, MdRenderError> {
    let closing = find_closing_fence(lines, fence_index).ok_or_else(|| MdRenderError::TemplateResolution {
        mode: mode.to_string(),
        line: fence_index + 1,
        reason: "code block is not closed".to_string(),
    })?;

    let candidates = std::iter::once(mode).chain(RenderMode::ALL.into_iter().filter(|m| *m != mode));
    for candidate in candidates {
        if let Some(layout) = match_layout(lines, fence_index, closing, candidate, floor) {
            return Ok(Resolution {
                start: layout.start,
                end: layout.end,
                fence_offset: fence_index - layout.start,
                closing_fence_offset: closing - layout.start,
                image_offset: layout.image - layout.start,
                image_present: true,
                layout_in_place: candidate == mode,
            });
        }
    }

    Ok(Resolution {
        start: fence_index,
        end: closing,
        fence_offset: 0,
        closing_fence_offset: closing - fence_index,
        image_offset: closing - fence_index + 1,
        image_present: false,
        layout_in_place: false,
    })
}

/// Absolute bounds of a recognized layout.
struct Layout {
    start: usize,
    end: usize,
    image: usize,
}

fn match_layout<S: AsRef<str>>(
    lines: &[S],
    fence: usize,
    closing: usize,
    mode: RenderMode,
    floor: usize,
) -> Option<Layout> {
    let line = |idx: usize| lines.get(idx).map(|l| l.as_ref().trim_end());
    let blank = |idx: usize| line(idx).is_some_and(str::is_empty);
    let is = |idx: usize, expected: &str| line(idx) == Some(expected);
    let image = |idx: usize| line(idx).is_some_and(is_image_line);

    match mode {
        RenderMode::Normal => image(closing + 1).then_some(Layout {
            start: fence,
            end: closing + 1,
            image: closing + 1,
        }),
        RenderMode::CodeCollapsed => {
            let start = fence.checked_sub(3).filter(|start| *start >= floor)?;
            let matched = is(start, DETAILS_OPEN)
                && is(start + 1, CODE_SUMMARY)
                && blank(start + 2)
                && blank(closing + 1)
                && is(closing + 2, DETAILS_CLOSE)
                && blank(closing + 3)
                && image(closing + 4);
            matched.then_some(Layout {
                start,
                end: closing + 4,
                image: closing + 4,
            })
        }
        RenderMode::ImageCollapsed => {
            let matched = blank(closing + 1)
                && is(closing + 2, DETAILS_OPEN)
                && is(closing + 3, IMAGE_SUMMARY)
                && blank(closing + 4)
                && image(closing + 5)
                && blank(closing + 6)
                && is(closing + 7, DETAILS_CLOSE);
            matched.then_some(Layout {
                start: fence,
                end: closing + 7,
                image: closing + 5,
            })
        }
        RenderMode::CodeHidden => {
            let start = fence.checked_sub(2).filter(|start| *start >= floor)?;
            let matched = is(start, HIDDEN_OPEN)
                && blank(start + 1)
                && blank(closing + 1)
                && is(closing + 2, HIDDEN_CLOSE)
                && blank(closing + 3)
                && image(closing + 4);
            matched.then_some(Layout {
                start,
                end: closing + 4,
                image: closing + 4,
            })
        }
    }
}

/// Number of wrapper lines [`materialize`] places before the opening fence.
#[must_use]
pub const fn leading_lines(mode: RenderMode) -> usize {
    match mode {
        RenderMode::Normal | RenderMode::ImageCollapsed => 0,
        RenderMode::CodeCollapsed => 3,
        RenderMode::CodeHidden => 2,
    }
}

/// Build the canonical lines for `mode` around a code block.
///
/// `code_block` runs from the opening fence to the closing fence inclusive.
/// Returns the lines and the offset of the image line within them.
#[must_use]
pub fn materialize(mode: RenderMode, code_block: &[String], image_line: String) -> (Vec<String>, usize) {
    let mut out = Vec::with_capacity(code_block.len() + 8);
    let push = |out: &mut Vec<String>, line: &str| out.push(line.to_string());

    let image_offset = match mode {
        RenderMode::Normal => {
            out.extend_from_slice(code_block);
            out.push(image_line);
            out.len() - 1
        }
        RenderMode::CodeCollapsed => {
            push(&mut out, DETAILS_OPEN);
            push(&mut out, CODE_SUMMARY);
            push(&mut out, "");
            out.extend_from_slice(code_block);
            push(&mut out, "");
            push(&mut out, DETAILS_CLOSE);
            push(&mut out, "");
            out.push(image_line);
            out.len() - 1
        }
        RenderMode::ImageCollapsed => {
            out.extend_from_slice(code_block);
            push(&mut out, "");
            push(&mut out, DETAILS_OPEN);
            push(&mut out, IMAGE_SUMMARY);
            push(&mut out, "");
            out.push(image_line);
            let offset = out.len() - 1;
            push(&mut out, "");
            push(&mut out, DETAILS_CLOSE);
            offset
        }
        RenderMode::CodeHidden => {
            push(&mut out, HIDDEN_OPEN);
            push(&mut out, "");
            out.extend_from_slice(code_block);
            push(&mut out, "");
            push(&mut out, HIDDEN_CLOSE);
            push(&mut out, "");
            out.push(image_line);
            out.len() - 1
        }
    };

    (out, image_offset)
}
