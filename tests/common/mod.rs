//! Common test utilities for mdrender integration tests
//!
//! [`TestProject`] owns a temporary directory holding markdown documents and
//! a config file that points the diagram backends at `sh -c cat`, so the
//! "image" written for a block is its own source. No graphviz, plantuml or
//! pikchr installation is needed.

// Not every helper is used by every test module
#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Config file that replaces every backend with `sh -c cat`.
///
/// The format arguments appended after `args` become `$0` of the shell
/// script and are ignored.
pub const CAT_BACKENDS_CONFIG: &str = r#"
[backends.dot]
command = "sh"
args = ["-c", "cat"]

[backends.plantuml]
command = "sh"
args = ["-c", "cat"]

[backends.pikchr]
command = "sh"
args = ["-c", "cat"]
"#;

/// Isolated project directory for one test
pub struct TestProject {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    project_dir: PathBuf,
    config_path: PathBuf,
}

impl TestProject {
    /// Create a project whose config uses the `cat` backends
    pub fn new() -> Result<Self> {
        Self::with_config(CAT_BACKENDS_CONFIG)
    }

    /// Create a project with a custom config file
    pub fn with_config(config: &str) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        let config_path = temp_dir.path().join("config.toml");

        fs::create_dir_all(&project_dir)?;
        fs::write(&config_path, config)?;

        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
            config_path,
        })
    }

    /// Get the project directory path
    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    /// Get the config file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Write a markdown document relative to the project directory
    pub fn write_doc(&self, path: &str, content: &str) -> Result<PathBuf> {
        let doc_path = self.project_dir.join(path);
        if let Some(parent) = doc_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&doc_path, content)
            .with_context(|| format!("Failed to write document to {}", doc_path.display()))?;
        Ok(doc_path)
    }

    /// Read a file relative to the project directory
    pub fn read(&self, path: &str) -> String {
        let path = self.project_dir.join(path);
        fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
    }

    /// Run mdrender in the project directory with the project config
    pub fn run_mdrender(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = Command::cargo_bin("mdrender")?
            .arg("--config")
            .arg(&self.config_path)
            .args(args)
            .current_dir(&self.project_dir)
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1")
            .output()
            .context("Failed to run mdrender command")?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Command output helper
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Assert the command succeeded
    pub fn assert_success(&self) -> &Self {
        assert!(self.success, "Command failed with code {:?}\nStderr: {}", self.code, self.stderr);
        self
    }

    /// Assert the command exited with status 1
    pub fn assert_failure(&self) -> &Self {
        assert_eq!(self.code, Some(1), "Expected exit code 1\nStdout: {}\nStderr: {}", self.stdout, self.stderr);
        self
    }

    /// Assert stdout contains the given text
    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Expected stdout to contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    /// Assert stderr contains the given text
    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}

/// File assertion helpers
pub struct FileAssert;

impl FileAssert {
    /// Assert a file exists
    pub fn exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    /// Assert a file does not exist
    pub fn not_exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(!path.exists(), "Expected file to not exist: {}", path.display());
    }

    /// Assert a file contains specific content
    pub fn contains(path: impl AsRef<Path>, expected: &str) {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));
        assert!(
            content.contains(expected),
            "Expected file {} to contain '{}'\nActual content: {}",
            path.display(),
            expected,
            content
        );
    }

    /// Assert a file has exact content
    pub fn equals(path: impl AsRef<Path>, expected: &str) {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));
        assert_eq!(content, expected, "File {} content mismatch", path.display());
    }
}

/// Names of the `render-*.svg` images in `dir`, sorted
pub fn rendered_images(dir: impl AsRef<Path>) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir.as_ref())
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().to_string())
                .filter(|name| name.starts_with("render-") && name.ends_with(".svg"))
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
