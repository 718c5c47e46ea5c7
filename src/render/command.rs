//! Process runner for diagram backends.
//!
//! A backend is an opaque program: diagram source goes in on stdin, image
//! bytes come out on stdout. [`BackendCommand`] wraps that contract with the
//! error handling and logging every backend shares.

use anyhow::Result;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::constants::SLOW_RENDER_THRESHOLD;
use crate::core::MdRenderError;
use crate::utils::platform::find_executable;

/// Builder for one backend invocation.
///
/// # Examples
///
/// ```rust,no_run
/// use mdrender::render::command::BackendCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// let output = BackendCommand::new("dot", "dot")
///     .arg("-Tsvg")
///     .stdin("digraph { a -> b }")
///     .with_context("docs/a.md:3")
///     .execute()
///     .await?;
/// println!("{} bytes of SVG", output.stdout.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendCommand {
    /// Language being rendered, for error reporting
    language: String,
    /// Program to run, a bare name looked up in `PATH` or a path
    program: String,
    /// Arguments passed to the program
    args: Vec<String>,
    /// Bytes written to the program's stdin
    input: Vec<u8>,
    /// Optional context string for log lines
    context: Option<String>,
}

/// Output from a successful backend run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendOutput {
    /// Image bytes
    pub stdout: Vec<u8>,
    /// Diagnostics the backend printed while succeeding
    pub stderr: String,
}

impl BackendCommand {
    /// Create a command that runs `program` to render `language`.
    pub fn new(language: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            program: program.into(),
            args: Vec::new(),
            input: Vec::new(),
            context: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the data piped to the backend's stdin.
    pub fn stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.input = input.into();
        self
    }

    /// Set a context string included in log lines.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// The program followed by its arguments, space separated.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the backend and collect its stdout.
    ///
    /// # Errors
    ///
    /// - [`MdRenderError::BackendNotFound`] when the program cannot be located
    /// - [`MdRenderError::BackendFailed`] when it cannot be started, a stream
    ///   fails, or it exits unsuccessfully; the captured stderr is attached
    pub async fn execute(self) -> Result<BackendOutput> {
        let start = Instant::now();
        let command_line = self.command_line();
        let ctx = self.context.as_deref().unwrap_or("-");

        let Some(executable) = find_executable(&self.program) else {
            return Err(MdRenderError::BackendNotFound {
                language: self.language,
                program: self.program,
            }
            .into());
        };

        tracing::debug!(target: "render", "({}) Executing command: {}", ctx, command_line);
        tracing::trace!(target: "render", "({}) Resolved {} to {}", ctx, self.program, executable.display());

        let failed = |reason: String, stderr: String| MdRenderError::BackendFailed {
            language: self.language.clone(),
            reason,
            stderr,
        };

        let mut child = Command::new(&executable)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failed(format!("failed to start {}: {e}", self.program), String::new()))?;

        // Feed stdin from a separate task so a backend that writes output
        // before consuming all input cannot deadlock against us.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = self.input.clone();
            tokio::spawn(async move {
                stdin.write_all(&input).await?;
                stdin.shutdown().await
            })
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| failed(format!("failed to wait for {}: {e}", self.program), String::new()))?;

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(
                target: "render",
                "({}) Command failed with exit code: {:?}",
                ctx,
                output.status.code()
            );
            if !stderr.is_empty() {
                tracing::debug!(target: "render", "({}) Error: {}", ctx, stderr.trim());
            }
            return Err(failed(format!("{} exited with {}", command_line, output.status), stderr).into());
        }

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                // The backend succeeded without reading all of its input
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => {
                    return Err(failed(format!("write stdin of {}: {e}", self.program), stderr).into());
                }
                Err(e) => {
                    return Err(failed(format!("stdin task for {} failed: {e}", self.program), stderr).into());
                }
            }
        }

        let elapsed = start.elapsed();
        if elapsed > SLOW_RENDER_THRESHOLD {
            tracing::info!(
                target: "render::perf",
                "({}) {} took {:.2}s",
                ctx,
                self.program,
                elapsed.as_secs_f64()
            );
        } else if elapsed.as_millis() > 100 {
            tracing::debug!(target: "render::perf", "({}) {} took {}ms", ctx, self.program, elapsed.as_millis());
        }

        Ok(BackendOutput {
            stdout: output.stdout,
            stderr,
        })
    }
}
