//! Ollama inference backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use tome_core::{defaults, Error, GenerationBackend, Result};

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = defaults::OLLAMA_URL;

/// Default generation model.
pub const DEFAULT_GEN_MODEL: &str = defaults::GEN_MODEL;

/// Ollama inference backend.
///
/// Talks to the `/api/generate` endpoint with `stream: false`, so every
/// call is a single request/response pair.
pub struct OllamaBackend {
    client: Client,
    base_url: String,
    gen_model: String,
    gen_timeout_secs: u64,
}

impl OllamaBackend {
    /// Create a new Ollama backend with default settings.
    pub fn new() -> Self {
        Self::with_config(
            DEFAULT_OLLAMA_URL.to_string(),
            DEFAULT_GEN_MODEL.to_string(),
        )
    }

    /// Create a new Ollama backend with custom configuration.
    pub fn with_config(base_url: String, gen_model: String) -> Self {
        let gen_timeout = std::env::var("TOME_GEN_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::GEN_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(gen_timeout))
            .build()
            .expect("Failed to create HTTP client");

        info!(
            "Initializing Ollama backend: url={}, gen={}",
            base_url, gen_model
        );

        Self {
            client,
            base_url,
            gen_model,
            gen_timeout_secs: gen_timeout,
        }
    }

    /// Create from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `OLLAMA_URL` | `http://localhost:11434` |
    /// | `OLLAMA_GEN_MODEL` | `llama3` |
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("OLLAMA_URL").unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string());
        let gen_model =
            std::env::var("OLLAMA_GEN_MODEL").unwrap_or_else(|_| DEFAULT_GEN_MODEL.to_string());

        Self::with_config(base_url, gen_model)
    }
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Request payload for the Ollama `/api/generate` endpoint.
#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

/// Response from the Ollama `/api/generate` endpoint.
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();

        debug!(
            subsystem = "inference",
            component = "ollama",
            op = "generate",
            model = %self.gen_model,
            prompt_len = prompt.len(),
            "Starting generation"
        );

        let request = GenerateRequest {
            model: self.gen_model.clone(),
            prompt: prompt.to_string(),
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .timeout(Duration::from_secs(self.gen_timeout_secs))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        let content = result.response.trim().to_string();
        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            subsystem = "inference",
            component = "ollama",
            response_len = content.len(),
            duration_ms = elapsed,
            "Generation complete"
        );
        if elapsed > 30000 {
            warn!(
                duration_ms = elapsed,
                prompt_len = prompt.len(),
                slow = true,
                "Slow generation operation"
            );
        }
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.gen_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_generate_sends_expected_wire_format() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3",
                "stream": false,
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"response": "  A summary.  "})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let backend = OllamaBackend::with_config(server.uri(), "llama3".to_string());
        let out = backend.generate("Summarize this").await.unwrap();
        // Response is trimmed at the client boundary
        assert_eq!(out, "A summary.");
    }

    #[tokio::test]
    async fn test_generate_non_success_status_is_inference_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let backend = OllamaBackend::with_config(server.uri(), "llama3".to_string());
        let err = backend.generate("prompt").await.unwrap_err();
        match err {
            Error::Inference(msg) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("model not loaded"));
            }
            other => panic!("Expected Inference error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_malformed_body_is_inference_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let backend = OllamaBackend::with_config(server.uri(), "llama3".to_string());
        let err = backend.generate("prompt").await.unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }

    #[test]
    fn test_model_name() {
        let backend = OllamaBackend::with_config(
            "http://localhost:11434".to_string(),
            "llama3".to_string(),
        );
        assert_eq!(backend.model_name(), "llama3");
    }
}
