//! mdrender - render diagram code blocks in markdown files, in place
//!
//! Markdown files keep diagrams as source. A fenced code block whose info
//! string carries the `render` keyword is rendered by an external tool
//! (graphviz `dot`, `plantuml`, `pikchr`), the image is written next to the
//! document, and an image reference is inserted or refreshed right after the
//! block. Running the tool twice on the same input changes nothing the
//! second time.
//!
//! # Architecture Overview
//!
//! A run is a sequence of independent file passes:
//!
//! 1. [`markdown::scanner`] splits the document into chunks: plain text and
//!    renderable blocks, each block together with its surrounding layout
//!    (see [`markdown::template`])
//! 2. Blocks whose content hash differs from the hash recorded in the
//!    document are rendered through a [`render::DiagramRenderer`]
//! 3. [`markdown::rewriter`] reassembles the chunks and writes the file
//!    atomically, only if the text changed
//!
//! # Core Modules
//!
//! - [`cli`] - Command-line interface
//! - [`config`] - Run configuration and the optional config file
//! - [`core`] - Error types and user-facing error formatting
//! - [`markdown`] - Directive parsing, layouts, scanning and rewriting
//! - [`processor`] - One pass over one markdown file
//! - [`render`] - Backend registry and process execution
//! - [`utils`] - File system and platform helpers
//!
//! # Directive Syntax
//!
//! ````markdown
//! ```dot render {"mode":"code-collapsed","filename":"arch.svg"}
//! digraph { client -> server }
//! ```
//! ````
//!
//! Both JSON keys are optional. `mode` is one of `normal` (default),
//! `code-collapsed`, `image-collapsed` or `code-hidden`.
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Render graphviz and plantuml blocks in one file
//! mdrender render README.md --languages dot,plantuml
//!
//! # Every markdown file under docs/, images in docs/img
//! mdrender render docs --languages dot --output-dir docs/img --link-prefix img/
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod markdown;
pub mod processor;
pub mod render;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
