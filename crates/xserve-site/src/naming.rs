//! Output file naming.

use xserve_renderer::page_file_name;

use crate::error::PageError;

/// File name of the generated site index.
pub const INDEX_FILE_NAME: &str = "index.html";

/// Derive the output file name for a document, rejecting names that would
/// escape the site directory.
pub(crate) fn output_name(name: &str) -> Result<String, PageError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(PageError::InvalidName(name.to_owned()));
    }
    Ok(page_file_name(name))
}
