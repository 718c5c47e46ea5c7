//! Test utilities for mdrender
//!
//! Available to unit tests and, through the `test-utils` feature, to
//! integration tests.
//!
//! - [`init_test_logging`] - install a tracing subscriber once per test binary
//! - [`RecordingRenderer`] - a [`DiagramRenderer`] that records requests and
//!   returns canned image bytes, so render paths run without diagram tools
//!
//! # Example
//!
//! ```rust,no_run
//! use mdrender::test_utils::RecordingRenderer;
//!
//! let renderer = RecordingRenderer::new();
//! // ... run process_file with &renderer ...
//! assert_eq!(renderer.requests().len(), 0);
//! ```

use anyhow::Result;
use std::future::Future;
use std::sync::{Mutex, Once};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::core::MdRenderError;
use crate::render::{DiagramRenderer, RenderRequest};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, logging
/// stays off.
///
/// ```bash
/// RUST_LOG=render=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// Fake renderer that records every request.
///
/// The image for a request is `<svg><!-- {language} --></svg>` unless the
/// renderer was built with [`failing`](Self::failing).
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    requests: Mutex<Vec<RenderRequest>>,
    failure: Option<String>,
}

impl RecordingRenderer {
    /// A renderer that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A renderer whose every call fails as a backend error carrying `stderr`.
    #[must_use]
    pub fn failing(stderr: impl Into<String>) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            failure: Some(stderr.into()),
        }
    }

    /// The bytes returned for `language`.
    #[must_use]
    pub fn image_for(&self, language: &str) -> Vec<u8> {
        format!("<svg><!-- {language} --></svg>").into_bytes()
    }

    /// Requests received so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if a previous holder of the lock panicked.
    #[must_use]
    pub fn requests(&self) -> Vec<RenderRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }
}

impl DiagramRenderer for RecordingRenderer {
    fn render(&self, request: RenderRequest) -> impl Future<Output = Result<Vec<u8>>> + Send {
        let image = self.image_for(&request.language);
        let language = request.language.clone();
        self.requests.lock().expect("request log poisoned").push(request);
        let failure = self.failure.clone();

        async move {
            match failure {
                Some(stderr) => Err(MdRenderError::BackendFailed {
                    language,
                    reason: "exit status: 1".to_string(),
                    stderr,
                }
                .into()),
                None => Ok(image),
            }
        }
    }
}
