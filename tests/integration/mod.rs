//! Integration test suite for mdrender
//!
//! End-to-end tests that run the compiled binary against markdown files in a
//! temporary directory. Backends are replaced with `sh -c cat` through the
//! config file, so the suite only runs on unix.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **render**: Rendering, idempotence and change detection
//! - **modes**: Layouts of the four render modes
//! - **paths**: Directory arguments, output directory and link prefix
//! - **errors**: Failures, exit codes and user-facing messages

#![cfg(unix)]

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod errors;
mod paths;
mod render;
