use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::error::{MailError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct LabelList {
    #[serde(default)]
    labels: Vec<Label>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    raw: Option<String>,
}

/// Blocking client for a Gmail-style mailbox REST API. One instance is
/// reused serially across a batch.
pub struct MailboxClient {
    http: Client,
    api_base: Url,
    user_id: String,
    access_token: String,
}

impl MailboxClient {
    pub fn new(api_base: &str, user_id: &str, access_token: String) -> Result<Self> {
        let mut base = api_base.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let api_base = Url::parse(&base)?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            api_base,
            user_id: user_id.to_string(),
            access_token,
        })
    }

    /// Search query that excludes messages carrying the processed marker.
    pub fn processed_exclusion_query(label_name: &str) -> String {
        format!("-label:{label_name}")
    }

    pub fn list_message_ids(&self, query: &str, limit: Option<usize>) -> Result<Vec<String>> {
        let url = self.endpoint(&["messages"])?;
        let mut request = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .query(&[("q", query)]);
        if let Some(limit) = limit {
            request = request.query(&[("maxResults", limit.to_string())]);
        }
        let list: MessageList = request.send()?.error_for_status()?.json()?;
        let ids: Vec<String> = list.messages.into_iter().map(|msg| msg.id).collect();
        debug!(count = ids.len(), query, "listed messages");
        Ok(ids)
    }

    /// Raw transport representation of one message, decoded from base64url.
    pub fn fetch_raw(&self, message_id: &str) -> Result<Vec<u8>> {
        let url = self.endpoint(&["messages", message_id])?;
        let message: RawMessage = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .query(&[("format", "raw")])
            .send()?
            .error_for_status()?
            .json()?;
        let raw = message
            .raw
            .ok_or_else(|| MailError::Parse(format!("message {message_id} had no raw payload")))?;
        URL_SAFE_NO_PAD
            .decode(raw.trim_end_matches('='))
            .map_err(|err| MailError::Parse(format!("message {message_id} raw payload: {err}")))
    }

    pub fn list_labels(&self) -> Result<Vec<Label>> {
        let url = self.endpoint(&["labels"])?;
        let list: LabelList = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(list.labels)
    }

    pub fn create_label(&self, name: &str) -> Result<Label> {
        let url = self.endpoint(&["labels"])?;
        let label: Label = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&json!({
                "name": name,
                "labelListVisibility": "labelShow",
                "messageListVisibility": "show",
            }))
            .send()?
            .error_for_status()?
            .json()?;
        Ok(label)
    }

    /// Look up a label by name, creating it when absent. Idempotent.
    pub fn ensure_label(&self, name: &str) -> Result<Label> {
        if let Some(label) = self
            .list_labels()?
            .into_iter()
            .find(|label| label.name == name)
        {
            return Ok(label);
        }
        debug!(name, "creating processed label");
        self.create_label(name)
    }

    pub fn add_label(&self, message_id: &str, label_id: &str) -> Result<()> {
        let url = self.endpoint(&["messages", message_id, "modify"])?;
        self.http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "addLabelIds": [label_id] }))
            .send()?
            .error_for_status()?;
        Ok(())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut path = format!("users/{}", self.user_id);
        for segment in segments {
            path.push('/');
            path.push_str(segment);
        }
        Ok(self.api_base.join(&path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::MailboxClient;

    #[test]
    fn exclusion_query_uses_label_name() {
        assert_eq!(
            MailboxClient::processed_exclusion_query("MG_PROCESSED"),
            "-label:MG_PROCESSED"
        );
    }

    #[test]
    fn endpoint_joins_under_user() {
        let client =
            MailboxClient::new("https://mail.example.com/v1", "me", "token".to_string())
                .expect("client");
        let url = client.endpoint(&["messages", "abc", "modify"]).expect("url");
        assert_eq!(
            url.as_str(),
            "https://mail.example.com/v1/users/me/messages/abc/modify"
        );
    }
}
