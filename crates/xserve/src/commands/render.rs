//! `xserve render` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use xserve_renderer::Renderer;

use crate::error::CliError;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Path to the markdown file.
    file: PathBuf,

    /// Do not turn bare URLs into links.
    #[arg(long)]
    no_autolink: bool,
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let content = std::fs::read(&self.file)?;
        let html = Renderer::new()
            .with_autolink(!self.no_autolink)
            .render(&content)?;

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(html.as_bytes())?;
        if !html.ends_with('\n') {
            stdout.write_all(b"\n")?;
        }
        Ok(())
    }
}
