//! Build error types.

use std::io;
use std::path::PathBuf;

use xserve_renderer::RenderError;

/// Broad category of a build failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Markup could not be converted.
    Render,
    /// Directory or file creation, write, or naming failure.
    Storage,
    /// Page or index template execution failure.
    Template,
}

/// Error for a single document of a build job.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    #[error("invalid document name {0:?}")]
    InvalidName(String),
    #[error("cannot create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("page template failed: {0}")]
    Template(#[from] minijinja::Error),
}

impl PageError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Render(_) => ErrorKind::Render,
            Self::InvalidName(_) | Self::Create { .. } | Self::Write { .. } => ErrorKind::Storage,
            Self::Template(_) => ErrorKind::Template,
        }
    }
}

/// Error returned by [`SiteBuilder::build`](crate::SiteBuilder::build).
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("cannot create site directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("documents {first:?} and {second:?} both produce {output}")]
    OutputCollision {
        output: String,
        first: String,
        second: String,
    },
    #[error("document {name:?} would overwrite the site index")]
    ReservedOutput { name: String },
    #[error("document {name:?}: {source}")]
    Page {
        name: String,
        #[source]
        source: PageError,
    },
    #[error("cannot write index {}: {source}", path.display())]
    Index {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("index template failed: {0}")]
    IndexTemplate(#[source] minijinja::Error),
}

impl BuildError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Page { source, .. } => source.kind(),
            Self::IndexTemplate(_) => ErrorKind::Template,
            Self::CreateDir { .. }
            | Self::OutputCollision { .. }
            | Self::ReservedOutput { .. }
            | Self::Index { .. } => ErrorKind::Storage,
        }
    }
}
