//! Per-user static site builds for xserve.
//!
//! This crate provides:
//! - [`SiteBuilder`]: renders a user's documents in parallel and writes them
//!   with an index page under `<output_dir>/<user_id>/`
//! - [`SiteTemplates`]: the page and index HTML templates
//! - [`BuildReport`]: per-document outcomes of a build job
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use xserve_renderer::Renderer;
//! use xserve_site::{SiteBuilder, SiteTemplates};
//!
//! let builder = SiteBuilder::new(
//!     "data/sites",
//!     Arc::new(Renderer::new()),
//!     Arc::new(SiteTemplates::new()?),
//! );
//!
//! let output = builder.build("u1", [("a.md", "# Hi"), ("b.md", "**bold**")])?;
//! assert_eq!(output.pages.len(), 2);
//! # Ok(())
//! # }
//! ```

mod builder;
mod error;
mod fs;
mod naming;
mod report;
mod template;

pub use builder::{DEFAULT_INDEX_HEADING, DEFAULT_INDEX_TITLE, IndexOrder, SiteBuilder};
pub use error::{BuildError, ErrorKind, PageError};
pub use minijinja::Error as TemplateError;
pub use naming::INDEX_FILE_NAME;
pub use rayon::ThreadPoolBuildError as PoolError;
pub use report::{BuildReport, PageOutcome, SiteOutput};
pub use template::SiteTemplates;
