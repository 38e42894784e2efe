//! OpenAI-compatible HTTP chat backend.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::provider::{CompletionRequest, InferenceProvider};
use crate::{InferenceError, Result};

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Provider backed by an OpenAI-compatible `/chat/completions` endpoint.
///
/// The request is sent with temperature 0.0 and a hard client timeout. A
/// timeout maps to [`InferenceError::Timeout`], HTTP 429 to
/// [`InferenceError::QuotaExceeded`], and everything else to
/// [`InferenceError::Service`]. There is no internal retry.
pub struct HttpProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl HttpProvider {
    /// Create a provider for the given endpoint.
    ///
    /// `base_url` is the API root, e.g. `https://api.example.com/v1`.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InferenceError::Service(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }
}

impl InferenceProvider for HttpProvider {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            max_tokens: request.max_tokens,
            temperature: 0.0,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!(url = %url, model = %self.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .map_err(map_transport_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(InferenceError::QuotaExceeded);
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(InferenceError::Service(format!("HTTP {status}: {body}")));
        }

        let chat: ChatResponse = response
            .json()
            .map_err(|e| InferenceError::Service(e.to_string()))?;

        chat.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| InferenceError::Service("empty response".to_string()))
    }
}

fn map_transport_error(e: reqwest::Error) -> InferenceError {
    if e.is_timeout() {
        InferenceError::Timeout
    } else {
        InferenceError::Service(e.to_string())
    }
}
