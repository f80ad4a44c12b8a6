//! LLM integration for Habit Coach.
//!
//! A single provider is supported: the GitHub Models chat completions
//! endpoint, reached over plain HTTPS with `reqwest`. Callers depend on the
//! `LlmProvider` trait so the plan service can be exercised with stubs.

pub mod github;

pub use github::{GitHubModelsClient, NO_RESPONSE};

use async_trait::async_trait;

use crate::error::LlmError;

/// A one-shot text completion backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Model used when the caller does not override it.
    fn model_name(&self) -> &str;

    /// Send `prompt` as the only user message and return the first reply.
    ///
    /// One attempt per call; no retries.
    async fn complete(&self, prompt: &str, model: Option<&str>) -> Result<String, LlmError>;
}
