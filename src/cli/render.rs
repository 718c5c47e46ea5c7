//! The `render` command.
//!
//! Loads the configuration, expands the given paths to markdown files, and
//! runs one file pass per file in order. The first failing file stops the
//! run; files already processed keep their changes.
//!
//! # Examples
//!
//! ```bash
//! mdrender render README.md --languages dot
//! mdrender render docs --languages dot,plantuml,pikchr
//! mdrender render guide.md --languages plantuml --output-dir img --link-prefix img/
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tracing::debug;

use super::CliConfig;
use crate::config::{GlobalConfig, RenderConfig};
use crate::markdown::collect_markdown_paths;
use crate::processor::{FileReport, process_file};
use crate::render::ProcessRenderer;

/// Command to render diagram blocks in markdown files.
#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Markdown files or directories to process
    #[arg(required = true, value_name = "PATHS")]
    pub(crate) paths: Vec<PathBuf>,

    /// Comma-separated diagram languages to render (dot, pikchr, plantuml)
    ///
    /// Blocks in other languages are left untouched, even when marked
    /// `render`.
    #[arg(short, long, required = true, value_delimiter = ',', value_name = "LANGS")]
    pub(crate) languages: Vec<String>,

    /// Directory receiving the images (default: next to each markdown file)
    #[arg(short, long, value_name = "DIR")]
    pub(crate) output_dir: Option<PathBuf>,

    /// Prefix for image links, e.g. `img/` or `/assets/`
    #[arg(long, value_name = "PREFIX")]
    pub(crate) link_prefix: Option<String>,
}

/// Totals for a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct RunSummary {
    files: usize,
    updated: usize,
    images: usize,
}

impl RunSummary {
    fn record(&mut self, report: &FileReport) {
        self.files += 1;
        self.images += report.rendered.len();
        if report.updated {
            self.updated += 1;
        }
    }
}

impl RenderCommand {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration, a missing path, or the first file
    /// whose pass fails.
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let file = GlobalConfig::load_with_optional(cli.config_path.clone()).await?;
        let config = RenderConfig::from_sources(&self.languages, self.output_dir, self.link_prefix, &file)?;
        debug!("Rendering {} with {:?}", config.languages.join(","), config.output_dir);

        let paths = collect_markdown_paths(&self.paths)?;
        let renderer = ProcessRenderer::new(config.registry.clone());

        let mut summary = RunSummary::default();
        for path in &paths {
            let report = process_file(path, &config, &renderer)
                .await
                .with_context(|| format!("process file {}", path.display()))?;

            if !cli.quiet {
                print_report(&report);
            }
            summary.record(&report);
        }

        if !cli.quiet {
            println!(
                "{} {} file(s) scanned, {} updated, {} image(s) rendered",
                "Done:".green().bold(),
                summary.files,
                summary.updated,
                summary.images
            );
        }

        Ok(())
    }
}

fn print_report(report: &FileReport) {
    let path = report.path.display();
    for image in &report.rendered {
        println!("{} {}", format!("[{path}:{}]", image.line).dimmed(), format!("Rendered {}", image.filename).green());
    }
    if report.updated {
        println!("{} {}", "Updated".cyan(), path);
    }
}
