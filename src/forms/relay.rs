//! Outbound form submissions to the third-party relay

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::FormsConfig;

/// Failure submitting a form
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("form relay access key is not configured")]
    MissingKey,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to decode relay response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("relay rejected the submission: {0}")]
    Rejected(String),
}

/// Body returned by the relay
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// A form whose fields can be relayed
pub trait FormFields: Clone + Default {
    /// Payload fields, without the access key
    fn payload(&self) -> Map<String, Value>;
}

/// Contact form fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl FormFields for ContactForm {
    fn payload(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("name".into(), self.name.clone().into());
        map.insert("email".into(), self.email.clone().into());
        map.insert("subject".into(), self.subject.clone().into());
        map.insert("message".into(), self.message.clone().into());
        map
    }
}

/// Resume request fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub member_name: String,
}

impl ResumeRequest {
    pub fn for_member(member: Option<&str>) -> Self {
        Self {
            member_name: member.unwrap_or_default().trim().to_string(),
            ..Default::default()
        }
    }

    /// Subject line, naming the member when one was requested
    pub fn subject(&self) -> String {
        if self.member_name.trim().is_empty() {
            "Resume Request".to_string()
        } else {
            format!("Resume Request - {}", self.member_name.trim())
        }
    }
}

impl FormFields for ResumeRequest {
    fn payload(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("category".into(), "New form from Resume Request".into());
        map.insert("email".into(), self.email.clone().into());
        map.insert("company".into(), self.company.clone().into());
        map.insert("memberName".into(), self.member_name.clone().into());
        map.insert("subject".into(), self.subject().into());
        map
    }
}

/// Client for the form relay endpoint
#[derive(Debug, Clone)]
pub struct FormRelay {
    client: Client,
    endpoint: String,
    access_key: String,
}

impl FormRelay {
    pub fn new(config: &FormsConfig) -> Result<Self, RelayError> {
        if config.access_key.trim().is_empty() {
            return Err(RelayError::MissingKey);
        }
        let client = Client::builder()
            .user_agent(concat!("showcase-rs/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            access_key: config.access_key.clone(),
        })
    }

    /// Post a form; succeeds only when the relay reports `success: true`
    pub async fn submit<F: FormFields>(&self, form: &F) -> Result<RelayReply, RelayError> {
        let mut payload = Map::new();
        payload.insert("access_key".into(), self.access_key.clone().into());
        payload.extend(form.payload());

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&Value::Object(payload))
            .send()
            .await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        let reply: RelayReply = serde_json::from_slice(&bytes)?;
        if !reply.success {
            let message = reply
                .message
                .clone()
                .unwrap_or_else(|| format!("status {}", status));
            return Err(RelayError::Rejected(message));
        }

        tracing::info!("Form relayed successfully");
        Ok(reply)
    }
}
