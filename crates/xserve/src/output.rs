//! Colored terminal output utilities.

use console::{Style, Term};
use xserve_site::PageOutcome;

/// Terminal output formatter writing to stderr.
pub(crate) struct Output {
    term: Term,
    ok: Style,
    failed: Style,
    dim: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            ok: Style::new().green(),
            failed: Style::new().red(),
            dim: Style::new().dim(),
        }
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        self.line(msg);
    }

    /// Print one line per document: green on success, red with the reason otherwise.
    pub(crate) fn page(&self, page: &PageOutcome) {
        match &page.result {
            Ok(_) => self.line(&format!(
                "  {} {}",
                self.ok.apply_to(&page.name),
                self.dim.apply_to(format!("-> {}", page.output_name))
            )),
            Err(e) => self.line(&format!("  {} {e}", self.failed.apply_to(&page.name))),
        }
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        self.line(&self.ok.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        self.line(&self.failed.apply_to(msg).to_string());
    }
}
