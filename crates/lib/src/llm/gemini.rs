//! Gemini `generateContent` client
//! (https://generativelanguage.googleapis.com/v1beta/models by default).
//! One message in, one reply out; no streaming, no retries.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of translating one message: the reply text or the reason it failed.
pub type Outcome = Result<String, TranslateError>;

/// Why a translation failed. `Display` is the reason recorded for the failure.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    /// Network error, timeout, refused connection, DNS failure, or a body that could not be read.
    #[error("Unexpected error calling the upstream API")]
    Transport(#[source] reqwest::Error),
    /// Upstream answered with anything other than 200.
    #[error("Upstream API failed with status code {0}")]
    Status(u16),
    /// 200 response without `candidates[0].content.parts[0].text`.
    #[error("Upstream response format error")]
    Format,
}

/// Turns a user message into an [`Outcome`]. The gateway only talks to this trait.
#[async_trait]
pub trait ReplyBackend: Send + Sync {
    async fn translate(&self, message: &str) -> Outcome;
}

/// Client for the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Build a client with a bounded per-request timeout. `base_url` is the models collection URL.
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.trim().to_string(),
            api_key,
            client,
        })
    }

    /// `{base}/{model}:generateContent` (the key goes in the query string at send time).
    pub fn generate_url(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }

    /// POST :generateContent — exactly one attempt.
    pub async fn generate(&self, message: &str) -> Outcome {
        let body = GenerateContentRequest::from_message(message);
        let res = self
            .client
            .post(self.generate_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                // without_url: the URL carries the API key
                let e = e.without_url();
                log::warn!("upstream request failed: {}", e);
                TranslateError::Transport(e)
            })?;

        let status = res.status();
        log::info!("upstream status: {}", status.as_u16());
        if status != StatusCode::OK {
            let body = res.text().await.unwrap_or_default();
            log::info!("upstream raw response: {}", body);
            return Err(TranslateError::Status(status.as_u16()));
        }
        let body = res.text().await.map_err(|e| {
            let e = e.without_url();
            log::warn!("reading upstream response failed: {}", e);
            TranslateError::Transport(e)
        })?;
        log::info!("upstream raw response: {}", body);
        extract_reply(&body)
    }
}

#[async_trait]
impl ReplyBackend for GeminiClient {
    async fn translate(&self, message: &str) -> Outcome {
        self.generate(message).await
    }
}

/// Decode a 200 body and take the first candidate's first part. Any shape mismatch is `Format`.
pub fn extract_reply(body: &str) -> Outcome {
    let data: GenerateContentResponse = serde_json::from_str(body).map_err(|e| {
        log::warn!("error parsing upstream response: {}", e);
        TranslateError::Format
    })?;
    data.into_reply().ok_or_else(|| {
        log::warn!("upstream response has no candidate text");
        TranslateError::Format
    })
}

/// Request body: `{"contents":[{"parts":[{"text": ...}]}]}`.
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// Wrap the message verbatim in one content block with one part.
    pub fn from_message(message: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: message.to_string(),
                }],
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Content,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if present.
    pub fn into_reply(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .next()
            .map(|p| p.text)
    }
}
