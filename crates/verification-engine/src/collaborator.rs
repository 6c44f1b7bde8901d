//! LLM collaborator: takes a prompt, returns free-form text
//!
//! [`OllamaClient`] speaks the Ollama `/api/generate` protocol with
//! streaming disabled. Tests substitute their own [`LlmCollaborator`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, VerificationError};

/// Default collaborator endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/api/generate";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "llama3";

/// Text generation service the verification prompt is sent to
#[async_trait]
pub trait LlmCollaborator: Send + Sync {
    /// Send `prompt` and return the raw generated text
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// HTTP client for an Ollama-compatible generate endpoint
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            model: model.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new(DEFAULT_OLLAMA_URL, DEFAULT_MODEL)
    }
}

#[async_trait]
impl LlmCollaborator for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!("POST {} model={} prompt_len={}", self.url, self.model, prompt.len());

        let response = self
            .http
            .post(&self.url)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| VerificationError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(VerificationError::Upstream(format!(
                "status {}: {}",
                status, snippet
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| VerificationError::Upstream(e.to_string()))?;

        let parsed: GenerateResponse = serde_json::from_slice(&body).map_err(|e| {
            VerificationError::MalformedResponse(format!("generate response: {}", e))
        })?;

        Ok(parsed.response)
    }
}
