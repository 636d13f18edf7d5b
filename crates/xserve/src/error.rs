//! CLI error types.

use xserve_config::ConfigError;
use xserve_renderer::RenderError;
use xserve_site::{BuildError, PoolError, TemplateError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Template(#[from] TemplateError),

    #[error("{0}")]
    Pool(#[from] PoolError),

    #[error("{0}")]
    Validation(String),
}
