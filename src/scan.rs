//! End-to-end scan: resolve the folder, filter today's messages, inspect PDF
//! attachments, accumulate one result per email.

use chrono::{DateTime, NaiveDate, Utc};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Result, SweepError};
use crate::graph::GraphClient;
use crate::pdf;

/// One record per qualifying email. Immutable once pushed; consumed exactly
/// once by the exporter.
#[derive(Debug, Clone)]
pub struct EmailResult {
    pub email_name: String,
    /// Received timestamp kept verbatim as the API's display text.
    pub time_sent: String,
    pub not_found: bool,
}

impl EmailResult {
    pub fn not_found_label(&self) -> &'static str {
        if self.not_found { "Yes" } else { "No" }
    }
}

pub fn run(client: &GraphClient, cfg: &Config) -> Result<Vec<EmailResult>> {
    let mut results = Vec::new();

    let Some(folder) = client.find_folder(&cfg.folder_name)? else {
        println!("Folder '{}' not found.", cfg.folder_name);
        return Ok(results);
    };

    let messages = client.list_messages(&folder.id, cfg.page_size)?;

    // "today" is fixed once, when the run starts, in UTC.
    let today = Utc::now().date_naive();

    for message in messages {
        if !received_on(&message.received_date_time, today) {
            continue;
        }
        println!(
            "Subject: {}, Received: {}",
            message.subject, message.received_date_time
        );

        let mut outcomes = Vec::new();
        for attachment in client.list_attachments(&message.id)? {
            if !(attachment.is_file() && is_pdf_name(&attachment.name)) {
                continue;
            }
            let Some(bytes) = attachment.file_bytes() else {
                continue;
            };
            outcomes.push(inspect_pdf_bytes(&attachment.name, &bytes, pdf::MARKER)?);
        }

        results.push(EmailResult {
            email_name: message.subject,
            time_sent: message.received_date_time,
            not_found: message_flag(outcomes),
        });
    }

    Ok(results)
}

/// Only the literal lowercase suffix counts.
fn is_pdf_name(name: &str) -> bool {
    name.ends_with(".pdf")
}

/// True when the timestamp, converted to UTC, falls on `day`. Conversion
/// happens before truncating to a calendar date. An unparseable timestamp is
/// treated as not-today.
fn received_on(received: &str, day: NaiveDate) -> bool {
    match DateTime::parse_from_rfc3339(received) {
        Ok(ts) => ts.with_timezone(&Utc).date_naive() == day,
        Err(e) => {
            log::warn!("unparseable receivedDateTime '{received}': {e}");
            false
        }
    }
}

/// Flag for a message given the inspection outcome of each of its PDF
/// attachments, in processing order. A single flag is reassigned per
/// attachment, so the last PDF processed decides; no PDFs means "No".
fn message_flag(outcomes: impl IntoIterator<Item = bool>) -> bool {
    let mut not_found = false;
    for outcome in outcomes {
        not_found = outcome;
    }
    not_found
}

/// Write the attachment to a scoped temp file, inspect it, clean up. An
/// unparseable PDF counts as "no marker" for this attachment.
fn inspect_pdf_bytes(name: &str, bytes: &[u8], marker: &str) -> Result<bool> {
    let tmp = TempFile::create(name, bytes)?;
    match pdf::contains_marker(tmp.path(), marker) {
        Ok(found) => Ok(found),
        Err(SweepError::MalformedDocument(reason)) => {
            log::warn!("attachment '{name}': {reason}; treating as no marker");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// A file in the OS temp dir, named after the attachment, removed on drop so
/// cleanup happens on every exit path.
struct TempFile {
    path: PathBuf,
}

impl TempFile {
    fn create(attachment_name: &str, bytes: &[u8]) -> Result<Self> {
        // Only the file-name component; attachment names are remote input.
        let file_name = Path::new(attachment_name)
            .file_name()
            .unwrap_or_else(|| OsStr::new("attachment.pdf"));
        let path = std::env::temp_dir().join(file_name);
        fs::write(&path, bytes).map_err(|e| SweepError::io(&path, e))?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
