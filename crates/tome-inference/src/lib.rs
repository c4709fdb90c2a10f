//! # tome-inference
//!
//! Language-model client for tome.
//!
//! The only backend is Ollama's generate API: a single POST with
//! `{model, prompt, stream: false}` returning `{response}`. The response is
//! normalized to a plain `String` at this boundary — callers never see the
//! provider's wire shape.

pub mod mock;
pub mod ollama;
pub mod prompts;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;
