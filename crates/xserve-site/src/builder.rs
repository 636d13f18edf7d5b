//! Parallel site builder.
//!
//! A build job renders every document of one user into
//! `<output_dir>/<user_id>/<name>.html` and then writes `index.html` listing
//! the pages. Documents are rendered concurrently on the rayon pool; the
//! index is written only after every page has succeeded. Pages written
//! before a failure are left on disk.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use xserve_renderer::{Renderer, page_file_name, strip_markup_suffix};

use crate::error::{BuildError, PageError};
use crate::fs;
use crate::naming::{INDEX_FILE_NAME, output_name};
use crate::report::{BuildReport, PageOutcome, SiteOutput};
use crate::template::SiteTemplates;

/// Default `<title>` of the site index.
pub const DEFAULT_INDEX_TITLE: &str = "Your Site";

/// Default `<h1>` of the site index.
pub const DEFAULT_INDEX_HEADING: &str = "Your Pages";

/// Order of entries in the site index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IndexOrder {
    /// Order in which documents were supplied.
    #[default]
    Input,
    /// Lexicographic by output file name.
    Sorted,
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// A document accepted for rendering.
struct PlannedPage<'a> {
    name: &'a str,
    content: &'a [u8],
    output: Result<String, PageError>,
}

/// Builds per-user static sites.
///
/// The renderer and templates are shared read-only by all workers, so a
/// single builder can run any number of jobs, including concurrent jobs for
/// different users.
pub struct SiteBuilder {
    output_dir: PathBuf,
    renderer: Arc<Renderer>,
    templates: Arc<SiteTemplates>,
    index_order: IndexOrder,
    index_title: String,
    index_heading: String,
    pool: Option<rayon::ThreadPool>,
}

impl SiteBuilder {
    /// Create a builder writing sites below `output_dir`.
    #[must_use]
    pub fn new(
        output_dir: impl Into<PathBuf>,
        renderer: Arc<Renderer>,
        templates: Arc<SiteTemplates>,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            renderer,
            templates,
            index_order: IndexOrder::default(),
            index_title: DEFAULT_INDEX_TITLE.to_owned(),
            index_heading: DEFAULT_INDEX_HEADING.to_owned(),
            pool: None,
        }
    }

    /// Set the order of index entries.
    #[must_use]
    pub fn with_index_order(mut self, order: IndexOrder) -> Self {
        self.index_order = order;
        self
    }

    /// Set the `<title>` of the index page.
    #[must_use]
    pub fn with_index_title(mut self, title: impl Into<String>) -> Self {
        self.index_title = title.into();
        self
    }

    /// Set the heading shown above the page list.
    #[must_use]
    pub fn with_index_heading(mut self, heading: impl Into<String>) -> Self {
        self.index_heading = heading.into();
        self
    }

    /// Render on a dedicated pool of `workers` threads instead of the global
    /// rayon pool. Zero lets rayon pick the thread count.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created.
    pub fn with_workers(mut self, workers: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("xserve-build-{index}"))
            .build()?;
        self.pool = Some(pool);
        Ok(self)
    }

    /// Root directory for all sites.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Directory holding the site of `user_id`.
    pub fn site_dir(&self, user_id: &str) -> PathBuf {
        self.output_dir.join(user_id)
    }

    /// Build the site of `user_id` from `(name, content)` pairs.
    ///
    /// Returns the first failure in input order. The index is not written
    /// when any document fails.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if the site directory cannot be created, output
    /// names collide, any document fails, or the index cannot be written.
    pub fn build<I, N, C>(&self, user_id: &str, documents: I) -> Result<SiteOutput, BuildError>
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: AsRef<[u8]> + Sync,
    {
        self.build_report(user_id, documents)?.into_result()
    }

    /// Build the site of `user_id`, reporting the outcome of every document.
    ///
    /// Only job-level failures are returned as errors; per-document failures
    /// are recorded in the report, whose `index` is then `None`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if the site directory cannot be created, output
    /// names collide, or the index cannot be written.
    pub fn build_report<I, N, C>(
        &self,
        user_id: &str,
        documents: I,
    ) -> Result<BuildReport, BuildError>
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: AsRef<[u8]> + Sync,
    {
        let start = Instant::now();
        let documents: Vec<(String, C)> = documents
            .into_iter()
            .map(|(name, content)| (name.into(), content))
            .collect();

        let site_dir = self.site_dir(user_id);
        fs::create_dir_all(&site_dir).map_err(|source| BuildError::CreateDir {
            path: site_dir.clone(),
            source,
        })?;

        let planned = plan(&documents)?;
        let pages: Vec<PageOutcome> = self.install(|| {
            planned
                .into_par_iter()
                .map(|page| self.write_page(&site_dir, page))
                .collect()
        });

        let failed = pages.iter().filter(|page| page.result.is_err()).count();
        if failed > 0 {
            tracing::warn!(
                user_id,
                page_count = pages.len(),
                failed,
                elapsed_ms = elapsed_ms(start),
                "Site build failed, index not written"
            );
            return Ok(BuildReport {
                site_dir,
                pages,
                index: None,
            });
        }

        let index = self.write_index(&site_dir, &pages)?;
        tracing::info!(
            user_id,
            page_count = pages.len(),
            elapsed_ms = elapsed_ms(start),
            "Site built"
        );

        Ok(BuildReport {
            site_dir,
            pages,
            index: Some(index),
        })
    }

    fn install<R, F>(&self, f: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }

    fn write_page(&self, site_dir: &Path, page: PlannedPage<'_>) -> PageOutcome {
        let result = page
            .output
            .and_then(|output| self.write_document(site_dir, page.name, &output, page.content));

        match &result {
            Ok(path) => tracing::debug!(document = page.name, path = %path.display(), "Page written"),
            Err(e) => tracing::warn!(document = page.name, error = %e, "Page failed"),
        }

        PageOutcome {
            name: page.name.to_owned(),
            output_name: page_file_name(page.name),
            result,
        }
    }

    fn write_document(
        &self,
        site_dir: &Path,
        name: &str,
        output: &str,
        content: &[u8],
    ) -> Result<PathBuf, PageError> {
        let fragment = self.renderer.render(content)?;
        let html = self
            .templates
            .render_page(strip_markup_suffix(name), fragment)?;

        let path = site_dir.join(output);
        let mut file = fs::create_file(&path).map_err(|source| PageError::Create {
            path: path.clone(),
            source,
        })?;
        file.write_all(html.as_bytes())
            .map_err(|source| PageError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    fn write_index(&self, site_dir: &Path, pages: &[PageOutcome]) -> Result<PathBuf, BuildError> {
        let mut entries: Vec<&str> = pages.iter().map(|page| page.output_name.as_str()).collect();
        if self.index_order == IndexOrder::Sorted {
            entries.sort_unstable();
        }

        let html = self
            .templates
            .render_index(&self.index_title, &self.index_heading, &entries)
            .map_err(BuildError::IndexTemplate)?;

        let path = site_dir.join(INDEX_FILE_NAME);
        fs::create_file(&path)
            .and_then(|mut file| file.write_all(html.as_bytes()))
            .map_err(|source| BuildError::Index {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

/// Derive output names and reject jobs whose outputs would overwrite each
/// other or the index.
fn plan<C: AsRef<[u8]>>(documents: &[(String, C)]) -> Result<Vec<PlannedPage<'_>>, BuildError> {
    let mut seen: HashMap<String, &str> = HashMap::with_capacity(documents.len());
    let mut planned = Vec::with_capacity(documents.len());

    for (name, content) in documents {
        let output = output_name(name);
        if let Ok(output) = &output {
            if output == INDEX_FILE_NAME {
                return Err(BuildError::ReservedOutput { name: name.clone() });
            }
            match seen.entry(output.clone()) {
                Entry::Occupied(entry) => {
                    return Err(BuildError::OutputCollision {
                        output: output.clone(),
                        first: (*entry.get()).to_owned(),
                        second: name.clone(),
                    });
                }
                Entry::Vacant(entry) => {
                    entry.insert(name.as_str());
                }
            }
        }
        planned.push(PlannedPage {
            name: name.as_str(),
            content: content.as_ref(),
            output,
        });
    }

    Ok(planned)
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};
    use std::fs as std_fs;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::ErrorKind;

    fn builder(output_dir: &Path) -> SiteBuilder {
        SiteBuilder::new(
            output_dir,
            Arc::new(Renderer::new()),
            Arc::new(SiteTemplates::new().unwrap()),
        )
    }

    fn file_names(dir: &Path) -> BTreeSet<String> {
        std_fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
        file_names(dir)
            .into_iter()
            .map(|name| {
                let content = std_fs::read(dir.join(&name)).unwrap();
                (name, content)
            })
            .collect()
    }

    fn names(set: &[&str]) -> BTreeSet<String> {
        set.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_build_two_documents() {
        let temp = tempfile::tempdir().unwrap();
        let builder = builder(temp.path());

        let output = builder
            .build("u1", [("a.md", b"# Hi".as_slice()), ("b.md", b"**bold**".as_slice())])
            .unwrap();

        let site = temp.path().join("u1");
        assert_eq!(output.site_dir, site);
        assert_eq!(output.pages, vec![site.join("a.html"), site.join("b.html")]);
        assert_eq!(output.index, site.join("index.html"));
        assert_eq!(file_names(&site), names(&["a.html", "b.html", "index.html"]));

        let a = std_fs::read_to_string(site.join("a.html")).unwrap();
        assert!(a.contains("<title>a</title>"));
        assert!(a.contains(r#"<h1 id="hi">Hi</h1>"#));

        let b = std_fs::read_to_string(site.join("b.html")).unwrap();
        assert!(b.contains("<p><strong>bold</strong></p>"));

        let index = std_fs::read_to_string(site.join("index.html")).unwrap();
        assert!(index.contains("<title>Your Site</title>"));
        assert!(index.contains("<h1>Your Pages</h1>"));
        assert!(index.contains(r#"<li><a href="a.html">a.html</a></li>"#));
        assert!(index.contains(r#"<li><a href="b.html">b.html</a></li>"#));
    }

    #[test]
    fn test_build_empty_job_writes_index_only() {
        let temp = tempfile::tempdir().unwrap();
        let output = builder(temp.path())
            .build("u1", Vec::<(String, Vec<u8>)>::new())
            .unwrap();

        assert!(output.pages.is_empty());
        let site = temp.path().join("u1");
        assert_eq!(file_names(&site), names(&["index.html"]));
        let index = std_fs::read_to_string(site.join("index.html")).unwrap();
        assert!(index.contains("<ul>\n</ul>"));
    }

    #[test]
    fn test_build_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let builder = builder(temp.path());
        let docs = [
            ("intro.md", "# Intro\n\nSee www.example.com"),
            ("table.md", "| a | b |\n|---|---|\n| 1 | 2 |"),
            ("tasks", "- [x] done\n- [ ] todo"),
        ];

        builder.build("u1", docs).unwrap();
        let first = snapshot(&temp.path().join("u1"));
        builder.build("u1", docs).unwrap();
        let second = snapshot(&temp.path().join("u1"));

        assert_eq!(first, second);
        assert_eq!(first.len(), docs.len() + 1);
    }

    #[test]
    fn test_failed_document_skips_index() {
        let temp = tempfile::tempdir().unwrap();
        let result = builder(temp.path()).build(
            "u1",
            [
                ("good.md", b"# ok".to_vec()),
                ("bad.md", vec![0xff, 0xfe, 0xfd]),
            ],
        );

        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Render);
        assert!(matches!(err, BuildError::Page { ref name, .. } if name == "bad.md"));

        let site = temp.path().join("u1");
        assert!(!site.join("index.html").exists());
        assert!(!site.join("bad.html").exists());
        assert!(site.join("good.html").exists());
    }

    #[test]
    fn test_build_report_records_each_outcome() {
        let temp = tempfile::tempdir().unwrap();
        let report = builder(temp.path())
            .build_report(
                "u1",
                [
                    ("one.md", b"one".to_vec()),
                    ("two.md", vec![0xc3]),
                    ("three.md", b"three".to_vec()),
                ],
            )
            .unwrap();

        assert_eq!(report.failed_count(), 1);
        assert!(report.index.is_none());
        let order: Vec<&str> = report.pages.iter().map(|page| page.name.as_str()).collect();
        assert_eq!(order, vec!["one.md", "two.md", "three.md"]);
        assert!(report.pages[0].result.is_ok());
        assert!(report.pages[1].result.is_err());
        assert!(report.pages[2].result.is_ok());
    }

    #[test]
    fn test_invalid_name_does_not_escape_site_dir() {
        let temp = tempfile::tempdir().unwrap();
        let err = builder(temp.path())
            .build("u1", [("../escape.md", "# no")])
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(matches!(
            err,
            BuildError::Page {
                source: PageError::InvalidName(_),
                ..
            }
        ));
        assert!(!temp.path().join("escape.html").exists());
        assert!(!temp.path().join("u1/index.html").exists());
    }

    #[test]
    fn test_output_collision_rejected_before_writing() {
        let temp = tempfile::tempdir().unwrap();
        let err = builder(temp.path())
            .build("u1", [("a.md", "first"), ("a", "second")])
            .unwrap_err();

        match err {
            BuildError::OutputCollision {
                output,
                first,
                second,
            } => {
                assert_eq!(output, "a.html");
                assert_eq!(first, "a.md");
                assert_eq!(second, "a");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(file_names(&temp.path().join("u1")).is_empty());
    }

    #[test]
    fn test_index_name_reserved() {
        let temp = tempfile::tempdir().unwrap();
        let builder = builder(temp.path());
        for name in ["index.md", "index"] {
            let err = builder.build("u1", [(name, "# Index")]).unwrap_err();
            assert!(matches!(err, BuildError::ReservedOutput { .. }), "{name}");
            assert_eq!(err.kind(), ErrorKind::Storage);
        }
    }

    #[test]
    fn test_unwritable_output_dir() {
        let temp = tempfile::tempdir().unwrap();
        let blocked = temp.path().join("blocked");
        std_fs::write(&blocked, "not a directory").unwrap();

        let err = builder(&blocked).build("u1", [("a.md", "# a")]).unwrap_err();
        assert!(matches!(err, BuildError::CreateDir { .. }));
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[test]
    fn test_page_create_failure_skips_index() {
        let temp = tempfile::tempdir().unwrap();
        let site = temp.path().join("u1");
        std_fs::create_dir_all(site.join("a.html")).unwrap();

        let err = builder(temp.path())
            .build("u1", [("a.md", "# a"), ("b.md", "b")])
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Storage);
        match &err {
            BuildError::Page {
                name,
                source: PageError::Create { path, .. },
            } => {
                assert_eq!(name, "a.md");
                assert_eq!(path, &site.join("a.html"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(site.join("b.html").is_file());
        assert!(!site.join("index.html").exists());
    }

    #[test]
    fn test_index_write_failure() {
        let temp = tempfile::tempdir().unwrap();
        let site = temp.path().join("u1");
        std_fs::create_dir_all(site.join("index.html")).unwrap();

        let err = builder(temp.path())
            .build("u1", [("a.md", "# a"), ("b.md", "b")])
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(matches!(err, BuildError::Index { ref path, .. } if path == &site.join("index.html")));
        assert!(site.join("a.html").is_file());
        assert!(site.join("b.html").is_file());
        assert!(site.join("index.html").is_dir());
    }

    #[test]
    fn test_many_documents_render_independently() {
        let temp = tempfile::tempdir().unwrap();
        let docs: Vec<(String, String)> = (0..50)
            .map(|i| (format!("doc{i}.md"), format!("# Document {i}\n\nBody of {i}.")))
            .collect();

        let output = builder(temp.path()).build("u1", docs).unwrap();
        assert_eq!(output.pages.len(), 50);

        let site = temp.path().join("u1");
        assert_eq!(file_names(&site).len(), 51);
        for i in 0..50 {
            let page = std_fs::read_to_string(site.join(format!("doc{i}.html"))).unwrap();
            assert!(page.contains(&format!(r#"<h1 id="document-{i}">Document {i}</h1>"#)));
            assert!(page.contains(&format!("<p>Body of {i}.</p>")));
            assert!(page.contains(&format!("<title>doc{i}</title>")));
        }
    }

    #[test]
    fn test_dedicated_pool() {
        let temp = tempfile::tempdir().unwrap();
        let builder = builder(temp.path()).with_workers(2).unwrap();
        let docs: Vec<(String, &str)> = (0..10).map(|i| (format!("p{i}"), "text")).collect();

        let output = builder.build("u1", docs).unwrap();
        assert_eq!(output.pages.len(), 10);
        assert!(output.index.exists());
    }

    #[test]
    fn test_index_order() {
        let temp = tempfile::tempdir().unwrap();
        let docs = [("b.md", "b"), ("a.md", "a")];

        builder(temp.path()).build("input", docs).unwrap();
        let index = std_fs::read_to_string(temp.path().join("input/index.html")).unwrap();
        assert!(index.find("b.html").unwrap() < index.find("a.html").unwrap());

        builder(temp.path())
            .with_index_order(IndexOrder::Sorted)
            .build("sorted", docs)
            .unwrap();
        let index = std_fs::read_to_string(temp.path().join("sorted/index.html")).unwrap();
        assert!(index.find("a.html").unwrap() < index.find("b.html").unwrap());
    }

    #[test]
    fn test_index_title() {
        let temp = tempfile::tempdir().unwrap();
        builder(temp.path())
            .with_index_title("Notes & Drafts")
            .with_index_heading("<Drafts>")
            .build("u1", [("a.md", "a")])
            .unwrap();
        let index = std_fs::read_to_string(temp.path().join("u1/index.html")).unwrap();
        assert!(index.contains("<title>Notes &amp; Drafts</title>"));
        assert!(index.contains("<h1>&lt;Drafts&gt;</h1>"));
    }

    #[test]
    fn test_rebuild_overwrites_and_keeps_unrelated_files() {
        let temp = tempfile::tempdir().unwrap();
        let site = temp.path().join("u1");
        std_fs::create_dir_all(&site).unwrap();
        std_fs::write(site.join("a.html"), "x".repeat(10_000)).unwrap();
        std_fs::write(site.join("old.html"), "stale").unwrap();

        builder(temp.path()).build("u1", [("a.md", "# New")]).unwrap();

        let a = std_fs::read_to_string(site.join("a.html")).unwrap();
        assert!(a.contains(r#"<h1 id="new">New</h1>"#));
        assert!(!a.contains("xxx"));
        assert_eq!(std_fs::read_to_string(site.join("old.html")).unwrap(), "stale");
    }

    #[test]
    fn test_users_are_isolated() {
        let temp = tempfile::tempdir().unwrap();
        let builder = builder(temp.path());
        builder.build("alice", [("a.md", "alice")]).unwrap();
        builder.build("bob", [("b.md", "bob")]).unwrap();

        assert_eq!(
            file_names(&temp.path().join("alice")),
            names(&["a.html", "index.html"])
        );
        assert_eq!(
            file_names(&temp.path().join("bob")),
            names(&["b.html", "index.html"])
        );
    }

    #[test]
    fn test_builder_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SiteBuilder>();
    }
}
