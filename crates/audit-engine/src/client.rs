//! OpenAI chat-completion client for compliance audits
//!
//! One blocking request per audit: a two-message (system + user) chat
//! completion with a fixed token ceiling. No retry; failures surface to
//! the caller.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::AuditConfig;
use crate::prompt::{build_user_prompt, SYSTEM_PROMPT};
use crate::report::AuditReport;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Audit configuration error: {0}")]
    Config(String),

    #[error("Request to audit service failed: {0}")]
    Http(String),

    #[error("Audit service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Audit service returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for AuditError {
    fn from(err: reqwest::Error) -> Self {
        AuditError::Http(err.to_string())
    }
}

/// The narrow seam between extraction/similarity and the audit backend:
/// a reference checklist text and a candidate text in, a structured
/// report out.
#[async_trait]
pub trait AuditService: Send + Sync {
    async fn audit(&self, isarp_checklist: &str, input_text: &str)
        -> Result<AuditReport, AuditError>;
}

/// Chat completion request body.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

/// Chat completion response body (only what we read).
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// [`AuditService`] backed by the OpenAI chat-completions API.
#[derive(Debug)]
pub struct OpenAiAuditor {
    config: AuditConfig,
    http: reqwest::Client,
}

impl OpenAiAuditor {
    pub fn new(config: AuditConfig) -> Result<Self, AuditError> {
        if config.api_key.is_empty() {
            return Err(AuditError::Config("API key is empty".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| AuditError::Config(e.to_string()))?;

        Ok(Self { config, http })
    }
}

#[async_trait]
impl AuditService for OpenAiAuditor {
    async fn audit(
        &self,
        isarp_checklist: &str,
        input_text: &str,
    ) -> Result<AuditReport, AuditError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user",
                    content: build_user_prompt(isarp_checklist, input_text),
                },
            ],
            max_tokens: self.config.max_tokens,
        };

        info!(model = %self.config.model, "submitting audit request");
        debug!(
            checklist_len = isarp_checklist.len(),
            input_len = input_text.len()
        );

        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuditError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or(AuditError::EmptyResponse)?;

        Ok(AuditReport::parse(&content))
    }
}
