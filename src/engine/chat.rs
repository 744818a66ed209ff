//! HTTP client for an Ollama chat model server

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{status_error, ChatModel};
use crate::error::EngineError;

/// Client for Ollama's `/api/generate` endpoint
pub struct OllamaChat {
    base_url: String,
    client: reqwest::blocking::Client,
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

#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    name: String,
}

impl OllamaChat {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, EngineError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| EngineError::Connection(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

impl ChatModel for OllamaChat {
    fn models(&self) -> Result<Vec<String>, EngineError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| EngineError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let parsed: TagsResponse = response
            .json()
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        let mut names: Vec<String> = parsed.models.into_iter().map(|m| m.name).collect();
        names.sort();
        Ok(names)
    }

    fn generate(&self, model: &str, prompt: &str) -> Result<String, EngineError> {
        let url = format!("{}/api/generate", self.base_url);
        debug!("Prompting {} with {} chars", model, prompt.len());

        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .map_err(|e| EngineError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        Ok(parsed.response)
    }
}
