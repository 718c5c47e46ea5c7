//! Global constants used throughout the mdrender codebase.
//!
//! Markup literals that must stay byte-stable across releases live in
//! [`crate::markdown::template`]; this module holds naming and tuning values.

use std::time::Duration;

/// Prefix of content-derived image filenames (`render-<md5>.svg`).
pub const RENDERED_FILENAME_PREFIX: &str = "render-";

/// Extension used when the filename does not request one the backend accepts.
pub const DEFAULT_IMAGE_EXTENSION: &str = "svg";

/// Length of a full fingerprint in hex characters (MD5).
pub const FULL_HASH_LEN: usize = 32;

/// Length of the truncated fingerprint stored in `<!-- hash:… -->` comments.
pub const SHORT_HASH_LEN: usize = 8;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "MDRENDER_CONFIG";

/// Backend calls slower than this are reported at info level.
pub const SLOW_RENDER_THRESHOLD: Duration = Duration::from_secs(1);

/// Maximum edit distance for "did you mean" suggestions.
pub const SUGGESTION_MAX_DISTANCE: usize = 3;
