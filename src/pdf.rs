//! Marker detection in PDF attachments.

use std::path::Path;

use crate::error::{Result, SweepError};

/// The literal phrase whose presence in a PDF flags the email.
pub const MARKER: &str = "Not found";

/// Does any page of the PDF at `path` contain `marker`?
///
/// Pages are extracted in visual reading order and searched independently, in
/// order, with a case-sensitive literal match; the search stops at the first
/// page that hits. A PDF with no extractable text (scanned images) simply
/// never matches.
pub fn contains_marker(path: &Path, marker: &str) -> Result<bool> {
    let pages = pdf_extract::extract_text_by_pages(path)
        .map_err(|e| SweepError::MalformedDocument(e.to_string()))?;
    Ok(search_pages(pages.iter().map(String::as_str), marker))
}

fn search_pages<'a>(pages: impl IntoIterator<Item = &'a str>, marker: &str) -> bool {
    // Per-page search, no cross-page concatenation.
    pages.into_iter().any(|page| page.contains(marker))
}
