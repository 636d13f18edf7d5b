//! `xserve build` command implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use xserve_config::{CliSettings, Config};
use xserve_renderer::Renderer;
use xserve_site::{IndexOrder, SiteBuilder, SiteTemplates};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Markdown files to publish; each is keyed by its file name.
    files: Vec<PathBuf>,

    /// User whose site is built.
    #[arg(short, long, env = "XSERVE_USER")]
    user: String,

    /// Root directory for all sites (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Number of render threads (overrides config).
    #[arg(short, long)]
    workers: Option<usize>,

    /// List index entries in file name order instead of argument order.
    #[arg(long)]
    sort_index: bool,

    /// Path to configuration file (default: auto-discover xserve.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output (info-level logging).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, reading inputs, or the build fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        validate_user(&self.user)?;

        let cli_settings = CliSettings {
            output_dir: self.output_dir.clone(),
            sort_index: self.sort_index.then_some(true),
            workers: self.workers,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(config_path = ?config.source, "Configuration loaded");
        let documents = read_documents(&self.files)?;

        let index_order = if config.site.sort_index {
            IndexOrder::Sorted
        } else {
            IndexOrder::Input
        };
        let mut builder = SiteBuilder::new(
            config.site.output_dir.clone(),
            Arc::new(Renderer::new()),
            Arc::new(SiteTemplates::new()?),
        )
        .with_index_order(index_order)
        .with_index_title(config.site.index_title.clone())
        .with_index_heading(config.site.index_heading.clone());
        if let Some(workers) = config.build.workers {
            builder = builder.with_workers(workers)?;
        }

        output.info(&format!(
            "Building {} document(s) into {}",
            documents.len(),
            builder.site_dir(&self.user).display()
        ));

        let report = builder.build_report(&self.user, documents)?;
        for page in &report.pages {
            output.page(page);
        }

        let site = report.into_result()?;
        output.success(&format!(
            "Site built successfully to {}",
            site.site_dir.display()
        ));
        Ok(())
    }
}

/// Reject user IDs that would not name a single directory.
fn validate_user(user: &str) -> Result<(), CliError> {
    if user.is_empty() || user == "." || user == ".." || user.contains(['/', '\\', '\0']) {
        return Err(CliError::Validation(format!("invalid user ID {user:?}")));
    }
    Ok(())
}

/// Read files into `(file name, content)` pairs, preserving argument order.
fn read_documents(files: &[PathBuf]) -> Result<Vec<(String, Vec<u8>)>, CliError> {
    files
        .iter()
        .map(|path| {
            let name = document_name(path)?;
            let content = std::fs::read(path)?;
            Ok((name, content))
        })
        .collect()
}

fn document_name(path: &Path) -> Result<String, CliError> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| CliError::Validation(format!("not a file: {}", path.display())))
}
