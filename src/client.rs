use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::error::ContactError;
use crate::submission::{SubmissionRequest, SubmissionResult};

/// Header carrying the host's anti-forgery token.
pub const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Serialize)]
struct WebchatBody<'a> {
    message: &'a str,
}

#[derive(Serialize)]
struct PhoneBody<'a> {
    phone: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

/// Anything that can deliver a submission and return the backend's verdict.
#[async_trait]
pub trait ContactBackend: Send + Sync {
    async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionResult, ContactError>;
}

#[derive(Clone)]
pub struct ContactClient {
    client: Client,
    base_url: String,
    csrf_token: Option<String>,
}

impl ContactClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            csrf_token: None,
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            csrf_token: config.csrf_token.clone(),
        })
    }

    pub fn with_csrf_token(mut self, token: &str) -> Self {
        self.csrf_token = Some(token.to_string());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ContactBackend for ContactClient {
    async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionResult, ContactError> {
        let url = format!("{}{}", self.base_url, request.endpoint());
        debug!(tab = request.tab().as_str(), %url, "posting submission");

        let mut builder = self.client.post(&url);
        builder = match request {
            SubmissionRequest::Webchat { message } => builder.json(&WebchatBody {
                message: message.as_str(),
            }),
            SubmissionRequest::Phone { phone, note } => builder.json(&PhoneBody {
                phone: phone.as_str(),
                message: note.as_deref(),
            }),
        };
        if let Some(token) = &self.csrf_token {
            builder = builder.header(CSRF_HEADER, token);
        }

        let response = builder.send().await?;

        // Failures come back as 400/500 with a JSON body, so the status is not
        // checked; an undecodable body is the only transport-level failure here.
        let status = response.status();
        let body = response.text().await?;
        let result = serde_json::from_str::<SubmissionResult>(&body).map_err(|e| {
            ContactError::Transport(format!("malformed response (status {}): {}", status, e))
        })?;

        Ok(result)
    }
}
