//! Fence directive recognition and render option parsing.
//!
//! A renderable block opens with `` ```<language> render `` optionally followed
//! by a single-line JSON object:
//!
//! ```text
//! ```dot render {"mode":"code-collapsed","filename":"pipeline.svg"}
//! ```
//!
//! Anything else after `render` that is not a JSON object is ignored and the
//! default options apply.

use serde::Deserialize;
use std::fmt;
use std::path::{Component, Path};
use std::str::FromStr;
use strsim::levenshtein;

use crate::constants::SUGGESTION_MAX_DISTANCE;
use crate::core::MdRenderError;

/// Opening characters of every fenced code block.
pub const FENCE: &str = "```";

/// Keyword that marks a fenced block as renderable.
pub const RENDER_KEYWORD: &str = "render";

/// Layout of a rendered block in the rewritten document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderMode {
    /// Code block followed by the image.
    #[default]
    Normal,
    /// Code block inside a disclosure section, image below it.
    CodeCollapsed,
    /// Code block shown, image inside a disclosure section.
    ImageCollapsed,
    /// Code block kept in a hidden element, only the image is shown.
    CodeHidden,
}

impl RenderMode {
    /// Every mode, in the order layouts are tried when adopting existing markup.
    pub const ALL: [Self; 4] = [Self::Normal, Self::CodeCollapsed, Self::ImageCollapsed, Self::CodeHidden];

    /// The identifier used in the JSON options.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::CodeCollapsed => "code-collapsed",
            Self::ImageCollapsed => "image-collapsed",
            Self::CodeHidden => "code-hidden",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| format!("unsupported mode \"{s}\""))
    }
}

/// Resolved options for one renderable block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderOptions {
    /// Layout of the block once rendered
    pub mode: RenderMode,
    /// Explicit output filename; a content-derived name is used when absent
    pub filename: Option<String>,
}

impl RenderOptions {
    /// A custom filename cannot carry the fingerprint, so it gets a hash comment.
    #[must_use]
    pub const fn has_hash_comment(&self) -> bool {
        self.filename.is_some()
    }
}

/// The options object as written in the document, before validation.
#[derive(Debug, Deserialize)]
struct RawRenderOptions {
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    filename: Option<String>,
}

/// Return the text following `` ```<language> render `` when `line` opens a
/// render directive for `language`.
///
/// The keyword must be followed by end of line, whitespace, or `{`, so
/// `` ```dot renderer `` is not a directive.
#[must_use]
pub fn directive_remainder<'a>(line: &'a str, language: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(FENCE)?.strip_prefix(language)?.strip_prefix(' ')?;
    let rest = rest.trim_start_matches(' ').strip_prefix(RENDER_KEYWORD)?;

    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() || c == '{' => Some(rest),
        Some(_) => None,
    }
}

/// Find the first requested language whose render directive opens on `line`.
#[must_use]
pub fn match_directive<'l>(line: &str, languages: &'l [String]) -> Option<&'l str> {
    if !line.starts_with(FENCE) {
        return None;
    }
    languages
        .iter()
        .find(|language| directive_remainder(line, language).is_some())
        .map(String::as_str)
}

/// Parse the render options of a directive line.
///
/// `line_index` is the 0-based index of the fence, used for error reporting.
///
/// # Errors
///
/// Returns [`MdRenderError::InvalidRenderOptions`] when the JSON object is
/// malformed, names an unknown mode, or asks for a filename that escapes the
/// output directory.
pub fn parse_render_options(
    line: &str,
    language: &str,
    line_index: usize,
) -> Result<RenderOptions, MdRenderError> {
    let Some(remainder) = directive_remainder(line, language) else {
        return Ok(RenderOptions::default());
    };

    let payload = remainder.trim();
    if !(payload.starts_with('{') && payload.ends_with('}')) {
        return Ok(RenderOptions::default());
    }

    let invalid = |reason: String, suggestion: Option<String>| MdRenderError::InvalidRenderOptions {
        line: line_index + 1,
        reason,
        suggestion,
    };

    let raw: RawRenderOptions = serde_json::from_str(payload)
        .map_err(|e| invalid(format!("unmarshal render options: {e}"), None))?;

    let mode = match raw.mode.as_deref() {
        None | Some("") => RenderMode::default(),
        Some(name) => name.parse().map_err(|reason| invalid(reason, suggest_mode(name)))?,
    };

    let filename = raw.filename.filter(|name| !name.is_empty());
    if let Some(name) = &filename {
        validate_filename(name).map_err(|reason| invalid(reason, None))?;
    }

    Ok(RenderOptions {
        mode,
        filename,
    })
}

/// Filenames are joined onto the output directory and must stay inside it.
fn validate_filename(name: &str) -> Result<(), String> {
    let path = Path::new(name);
    let escapes = path.components().any(|component| {
        matches!(component, Component::ParentDir | Component::RootDir | Component::Prefix(_))
    });

    if escapes {
        return Err(format!("filename \"{name}\" must be relative to the output directory"));
    }
    if path.file_name().is_none() {
        return Err(format!("filename \"{name}\" does not name a file"));
    }
    Ok(())
}

fn suggest_mode(name: &str) -> Option<String> {
    RenderMode::ALL
        .into_iter()
        .map(|mode| (mode, levenshtein(name, mode.as_str())))
        .filter(|(_, distance)| *distance <= SUGGESTION_MAX_DISTANCE)
        .min_by_key(|(_, distance)| *distance)
        .map(|(mode, _)| mode.as_str().to_string())
}
