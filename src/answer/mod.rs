//! Answer service: the backend that turns a question into text and charts
//!
//! The core widget never talks to it. The page submits the built question
//! through an [`AnswerService`], and whatever comes back is interpreted here:
//! an `error` field becomes [`AnswerError::Service`], chart entries that are
//! not `data:image` URIs are dropped.

mod error;

pub use error::AnswerError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Prefix every displayable chart entry must carry
pub const CHART_URI_PREFIX: &str = "data:image";

// ============================================================================
// Wire types
// ============================================================================

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: UserMessage,
    #[serde(default)]
    pub history: Vec<HistoryMessage>,
}

impl ChatRequest {
    /// A single-turn request carrying just the question
    pub fn question(text: impl Into<String>) -> Self {
        Self {
            message: UserMessage {
                text: text.into(),
                files: Vec::new(),
            },
            history: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMessage {
    pub text: String,
    #[serde(default)]
    pub files: Vec<FileData>,
}

/// Base64 attachment; the page never sends any but the schema allows it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileData {
    pub data: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: String,
    pub content: String,
}

/// Raw response body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub text_answer: String,
    /// Kept untyped so malformed entries can be dropped instead of failing
    #[serde(default)]
    pub charts: Option<Vec<Value>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A successful, display-ready answer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Answer {
    /// Markdown text
    pub text: String,
    /// `data:image/...` URIs, in the order returned
    pub charts: Vec<String>,
}

/// Keep only string entries that are `data:image` URIs
pub fn filter_charts(charts: &[Value]) -> Vec<String> {
    charts
        .iter()
        .filter_map(|chart| match chart {
            Value::String(uri) if uri.starts_with(CHART_URI_PREFIX) => Some(uri.clone()),
            other => {
                tracing::debug!(entry = %truncate(other), "dropping non-image chart entry");
                None
            }
        })
        .collect()
}

fn truncate(value: &Value) -> String {
    let text = value.to_string();
    match text.char_indices().nth(40) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text,
    }
}

/// Turn a decoded response into an answer or a service error
pub fn interpret(response: ChatResponse) -> Result<Answer, AnswerError> {
    if let Some(error) = response.error {
        return Err(AnswerError::Service(error));
    }
    let charts = filter_charts(response.charts.as_deref().unwrap_or_default());
    Ok(Answer {
        text: response.text_answer,
        charts,
    })
}

// ============================================================================
// Service
// ============================================================================

/// Something that answers questions
#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn submit(&self, question: &str) -> Result<Answer, AnswerError>;
}

/// HTTP client for the answer backend
#[derive(Debug, Clone)]
pub struct HttpAnswerClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAnswerClient {
    /// Create a client for `base_url` (without the `/chat` suffix)
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AnswerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AnswerError::from_network_error)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Full URL of the chat endpoint
    pub fn endpoint(&self) -> String {
        format!("{}/chat", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl AnswerService for HttpAnswerClient {
    async fn submit(&self, question: &str) -> Result<Answer, AnswerError> {
        let url = self.endpoint();
        tracing::info!(%url, question, "submitting question");

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest::question(question))
            .send()
            .await
            .map_err(AnswerError::from_network_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "answer service returned an error status");
            return Err(AnswerError::from_http_status(status, body));
        }

        let body = response
            .text()
            .await
            .map_err(AnswerError::from_network_error)?;
        let decoded: ChatResponse =
            serde_json::from_str(&body).map_err(|e| AnswerError::Decode(e.to_string()))?;
        let answer = interpret(decoded)?;
        tracing::info!(
            text_len = answer.text.len(),
            charts = answer.charts.len(),
            "answer received"
        );
        Ok(answer)
    }
}
