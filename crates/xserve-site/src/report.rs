//! Build outcomes.

use std::path::PathBuf;

use crate::error::{BuildError, PageError};
use crate::naming::INDEX_FILE_NAME;

/// Result of writing one document.
#[derive(Debug)]
pub struct PageOutcome {
    /// Document name as supplied.
    pub name: String,
    /// Derived output file name.
    pub output_name: String,
    /// Path of the written page, or why it was not written.
    pub result: Result<PathBuf, PageError>,
}

/// Per-document outcomes of a build job, in input order.
#[derive(Debug)]
pub struct BuildReport {
    /// `<output_dir>/<user_id>`.
    pub site_dir: PathBuf,
    pub pages: Vec<PageOutcome>,
    /// Set when every page succeeded and the index was written.
    pub index: Option<PathBuf>,
}

impl BuildReport {
    /// Whether every document was written.
    pub fn is_success(&self) -> bool {
        self.pages.iter().all(|page| page.result.is_ok())
    }

    /// Number of documents that failed.
    pub fn failed_count(&self) -> usize {
        self.pages.iter().filter(|page| page.result.is_err()).count()
    }

    /// Reduce to the first failure in input order, or the written files.
    pub fn into_result(self) -> Result<SiteOutput, BuildError> {
        let mut pages = Vec::with_capacity(self.pages.len());
        for outcome in self.pages {
            match outcome.result {
                Ok(path) => pages.push(path),
                Err(source) => {
                    return Err(BuildError::Page {
                        name: outcome.name,
                        source,
                    });
                }
            }
        }
        let index = self
            .index
            .unwrap_or_else(|| self.site_dir.join(INDEX_FILE_NAME));
        Ok(SiteOutput {
            site_dir: self.site_dir,
            pages,
            index,
        })
    }
}

/// Files produced by a successful build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteOutput {
    pub site_dir: PathBuf,
    /// Written pages, in input order.
    pub pages: Vec<PathBuf>,
    pub index: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str, result: Result<PathBuf, PageError>) -> PageOutcome {
        PageOutcome {
            name: name.to_owned(),
            output_name: xserve_renderer::page_file_name(name),
            result,
        }
    }

    #[test]
    fn test_into_result_returns_first_failure_in_order() {
        let report = BuildReport {
            site_dir: PathBuf::from("site"),
            pages: vec![
                outcome("a.md", Ok(PathBuf::from("site/a.html"))),
                outcome("b.md", Err(PageError::InvalidName("b.md".to_owned()))),
                outcome("c.md", Err(PageError::InvalidName("c.md".to_owned()))),
            ],
            index: None,
        };
        assert!(!report.is_success());
        assert_eq!(report.failed_count(), 2);

        let err = report.into_result().unwrap_err();
        assert!(matches!(err, BuildError::Page { ref name, .. } if name == "b.md"));
    }

    #[test]
    fn test_into_result_success() {
        let report = BuildReport {
            site_dir: PathBuf::from("site"),
            pages: vec![outcome("a.md", Ok(PathBuf::from("site/a.html")))],
            index: Some(PathBuf::from("site/index.html")),
        };
        assert!(report.is_success());
        assert_eq!(
            report.into_result().unwrap(),
            SiteOutput {
                site_dir: PathBuf::from("site"),
                pages: vec![PathBuf::from("site/a.html")],
                index: PathBuf::from("site/index.html"),
            }
        );
    }
}
