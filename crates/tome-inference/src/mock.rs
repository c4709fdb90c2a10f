//! Mock generation backend for deterministic testing.
//!
//! Generates canned responses without any network access, and records every
//! prompt it receives so tests can assert on what was sent.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use tome_core::{Error, GenerationBackend, Result};

/// Mock generation backend.
#[derive(Clone)]
pub struct MockBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<String>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    fixed_responses: HashMap<String, String>,
    default_response: String,
    fail: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            fixed_responses: HashMap::new(),
            default_response: "Mock summary".to_string(),
            fail: false,
        }
    }
}

impl MockBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the response returned for any prompt without a specific mapping.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Map a response to prompts containing the given substring.
    pub fn with_response_for(
        mut self,
        prompt_contains: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .fixed_responses
            .insert(prompt_contains.into(), response.into());
        self
    }

    /// Make every call fail with an inference error.
    pub fn with_failure(mut self) -> Self {
        Arc::make_mut(&mut self.config).fail = true;
        self
    }

    /// Prompts received so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.call_log.lock().unwrap().clone()
    }

    /// Number of generate calls made.
    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.call_log.lock().unwrap().push(prompt.to_string());

        if self.config.fail {
            return Err(Error::Inference("Mock backend failure".to_string()));
        }

        for (needle, response) in &self.config.fixed_responses {
            if prompt.contains(needle) {
                return Ok(response.clone());
            }
        }

        Ok(self.config.default_response.clone())
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
