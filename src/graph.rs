//! Thin blocking client for the Microsoft Graph mail endpoints we need:
//! top-level folder listing, message listing, attachment listing.

use base64::{Engine as _, engine::general_purpose};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, SweepError};

const GRAPH_API_BASE: &str = "https://graph.microsoft.com/v1.0";

/// Graph collection payloads wrap the items in a `value` array.
#[derive(Debug, Deserialize)]
struct Collection<T> {
    value: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailFolder {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub subject: String,
    /// Kept verbatim as the API's display text; parsed separately when the
    /// scanner filters by date.
    #[serde(default)]
    pub received_date_time: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(rename = "@odata.type", default)]
    pub odata_type: String,
    #[serde(default)]
    pub name: String,
    /// Base64 content, present only on file attachments.
    pub content_bytes: Option<String>,
}

impl Attachment {
    /// File attachments carry raw bytes; reference/item attachments don't.
    pub fn is_file(&self) -> bool {
        self.odata_type == "#microsoft.graph.fileAttachment"
    }

    /// Decode the attachment content. `None` when there is no content or the
    /// payload is not valid base64 (warned, not fatal).
    pub fn file_bytes(&self) -> Option<Vec<u8>> {
        let encoded = self.content_bytes.as_deref()?;
        match general_purpose::STANDARD.decode(encoded) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::warn!("attachment '{}': undecodable contentBytes: {e}", self.name);
                None
            }
        }
    }
}

pub struct GraphClient {
    http: reqwest::blocking::Client,
    access_token: String,
}

impl GraphClient {
    pub fn new(access_token: String) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            access_token,
        }
    }

    fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            let raw = resp.text().unwrap_or_default();
            let body = graph_error_message(&raw).unwrap_or(raw);
            return Err(SweepError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json()?)
    }

    /// List the user's top-level mail folders. Subfolders are not reachable
    /// this way; the target folder has to sit next to Inbox/Archive.
    pub fn list_folders(&self) -> Result<Vec<MailFolder>> {
        let coll: Collection<MailFolder> = self.get(&format!("{GRAPH_API_BASE}/me/mailFolders"))?;
        Ok(coll.value)
    }

    /// First top-level folder whose display name matches exactly
    /// (case-sensitive). `None` is a handled condition, not an error.
    pub fn find_folder(&self, display_name: &str) -> Result<Option<MailFolder>> {
        Ok(first_match(self.list_folders()?, display_name))
    }

    /// Up to `top` messages from the folder, in the API's default ordering.
    pub fn list_messages(&self, folder_id: &str, top: u32) -> Result<Vec<Message>> {
        let coll: Collection<Message> = self.get(&format!(
            "{GRAPH_API_BASE}/me/mailFolders/{folder_id}/messages?$top={top}"
        ))?;
        Ok(coll.value)
    }

    pub fn list_attachments(&self, message_id: &str) -> Result<Vec<Attachment>> {
        let coll: Collection<Attachment> = self.get(&format!(
            "{GRAPH_API_BASE}/me/messages/{message_id}/attachments"
        ))?;
        Ok(coll.value)
    }
}

fn first_match(folders: Vec<MailFolder>, display_name: &str) -> Option<MailFolder> {
    folders.into_iter().find(|f| f.display_name == display_name)
}

/// Pull the human-readable message out of a Graph error payload, if there is
/// one: `{"error": {"code": ..., "message": ...}}`.
fn graph_error_message(body: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    v["error"]["message"].as_str().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_file_attachment() {
        let att: Attachment = serde_json::from_str(
            r##"{
                "@odata.type": "#microsoft.graph.fileAttachment",
                "name": "report.pdf",
                "contentBytes": "aGVsbG8="
            }"##,
        )
        .unwrap();
        assert!(att.is_file());
        assert_eq!(att.file_bytes().unwrap(), b"hello");
    }

    #[test]
    fn reference_attachment_is_not_a_file() {
        let att: Attachment = serde_json::from_str(
            r##"{
                "@odata.type": "#microsoft.graph.referenceAttachment",
                "name": "shared link"
            }"##,
        )
        .unwrap();
        assert!(!att.is_file());
        assert!(att.file_bytes().is_none());
    }

    #[test]
    fn bad_base64_yields_none() {
        let att = Attachment {
            odata_type: "#microsoft.graph.fileAttachment".to_string(),
            name: "x.pdf".to_string(),
            content_bytes: Some("!!not base64!!".to_string()),
        };
        assert!(att.file_bytes().is_none());
    }

    #[test]
    fn folder_match_is_exact_and_case_sensitive() {
        let folders = vec![
            MailFolder {
                id: "1".into(),
                display_name: "invoices".into(),
            },
            MailFolder {
                id: "2".into(),
                display_name: "Invoices".into(),
            },
        ];
        assert_eq!(first_match(folders.clone(), "Invoices").unwrap().id, "2");
        assert!(first_match(folders.clone(), "Invoice").is_none());
        assert_eq!(first_match(folders, "invoices").unwrap().id, "1");
    }

    #[test]
    fn extracts_graph_error_message() {
        let body = r##"{"error":{"code":"InvalidAuthenticationToken","message":"Access token is empty."}}"##;
        assert_eq!(
            graph_error_message(body).as_deref(),
            Some("Access token is empty.")
        );
        assert!(graph_error_message("<html>gateway timeout</html>").is_none());
    }
}
