use std::time::Duration;

use mailglean_core::{name, MessageExtraction};
use reqwest::blocking::Client;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::error::Result;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// One contact upsert derived from a message's extraction output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    pub message_id: String,
    pub email: String,
    pub name: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertStatus {
    Ok,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub email: String,
    pub message_id: String,
    pub status: UpsertStatus,
}

impl UpsertOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == UpsertStatus::Ok
    }
}

/// Pairing policy for the unpaired extraction lists: one record per distinct
/// email in first-occurrence order, each paired with the message's first
/// name (rendered "Last, First") and first address. The per-field lists have
/// no positional correspondence, so any richer pairing would be guesswork.
pub fn contact_records(batch: &[MessageExtraction]) -> Vec<ContactRecord> {
    let mut records = Vec::new();
    for entry in batch {
        let first_name = entry.result.names.first().map(|raw| name::last_first(raw));
        let first_address = entry.result.addresses.first().cloned();
        let mut seen: Vec<&str> = Vec::new();
        for email in &entry.result.emails {
            if seen.contains(&email.as_str()) {
                continue;
            }
            seen.push(email);
            records.push(ContactRecord {
                message_id: entry.message_id.clone(),
                email: email.clone(),
                name: first_name.clone(),
                address: first_address.clone(),
            });
        }
    }
    records
}

/// Blocking CRM upsert client, keyed by email address.
pub struct CrmClient {
    http: Client,
    endpoint: Url,
    api_key: String,
}

impl CrmClient {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let mut base = endpoint.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let endpoint = Url::parse(&base)?;
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()?;
        Ok(Self {
            http,
            endpoint,
            api_key: api_key.to_string(),
        })
    }

    /// Upsert every record, never aborting on a failure: each outcome is
    /// recorded and the remaining records are still attempted.
    pub fn upsert_batch(&self, batch: &[MessageExtraction]) -> Vec<UpsertOutcome> {
        let records = contact_records(batch);
        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            let status = match self.upsert(&record) {
                Ok(()) => {
                    debug!(email = %record.email, "contact upserted");
                    UpsertStatus::Ok
                }
                Err(err) => {
                    warn!(email = %record.email, error = %err, "contact upsert failed");
                    UpsertStatus::Failed(err.to_string())
                }
            };
            outcomes.push(UpsertOutcome {
                email: record.email,
                message_id: record.message_id,
                status,
            });
        }
        outcomes
    }

    fn upsert(&self, record: &ContactRecord) -> Result<()> {
        let url = self.endpoint.join(&format!("{}/", record.email))?;
        let mut properties = vec![json!({ "property": "email", "value": record.email })];
        if let Some(name) = &record.name {
            properties.push(json!({ "property": "firstname", "value": name }));
        }
        if let Some(address) = &record.address {
            properties.push(json!({ "property": "address", "value": address }));
        }
        self.http
            .post(url)
            .query(&[("hapikey", self.api_key.as_str())])
            .json(&json!({ "properties": properties }))
            .send()?
            .error_for_status()?;
        Ok(())
    }
}
