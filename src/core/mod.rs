//! Core types for mdrender
//!
//! This module holds the error vocabulary shared by every other module:
//! - [`MdRenderError`] - Enumerated error types covering all failure modes
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to the user-friendly format
//!
//! Every failure is fatal to the file being processed. Lower layers return
//! `anyhow::Result` carrying a typed [`MdRenderError`] and add location context
//! as the error travels up; the binary converts the result with
//! [`user_friendly_error`] and exits non-zero.

pub mod error;

pub use error::{ErrorContext, MdRenderError, user_friendly_error};
