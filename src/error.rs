//! Error types shared across the scan pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can abort a run. Folder-not-found is deliberately absent:
/// it is a handled condition (empty result set), not an error.
#[derive(Error, Debug)]
pub enum SweepError {
    /// Interactive sign-in was cancelled, denied, or timed out.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The mail API was unreachable or the request itself failed.
    #[error("mail API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The mail API answered with a non-success status.
    #[error("mail API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The bytes were not a parseable PDF document.
    #[error("not a parseable PDF: {0}")]
    MalformedDocument(String),

    /// I/O error with the associated file path.
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Building or saving the output workbook failed.
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
}

impl SweepError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, SweepError>;
