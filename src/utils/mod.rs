//! Cross-platform utilities and helpers
//!
//! # Modules
//!
//! - [`fs`] - Atomic writes and directory creation
//! - [`platform`] - Executable lookup and path expansion
//!
//! # Example
//!
//! ```rust,no_run
//! use mdrender::utils::{atomic_write, ensure_dir};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! ensure_dir(Path::new("docs/img"))?;
//! atomic_write(Path::new("docs/img/diagram.svg"), b"<svg/>")?;
//! # Ok(())
//! # }
//! ```

pub mod fs;
pub mod platform;

pub use fs::{atomic_write, ensure_dir, read_text_file};
pub use platform::{expand_value, find_executable, get_home_dir, is_windows, resolve_path};
