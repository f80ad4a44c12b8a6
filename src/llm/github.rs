//! GitHub Models chat completions client.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::LlmProvider;
use crate::config::GitHubModelsConfig;
use crate::error::LlmError;

/// Returned when the endpoint answers successfully but without any message.
pub const NO_RESPONSE: &str = "No response received";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Chat completions client authenticated with a bearer token.
#[derive(Clone)]
pub struct GitHubModelsClient {
    client: reqwest::Client,
    config: GitHubModelsConfig,
}

impl GitHubModelsClient {
    pub fn new(client: reqwest::Client, config: GitHubModelsConfig) -> Self {
        Self { client, config }
    }

    fn transport_error(&self, e: reqwest::Error) -> LlmError {
        LlmError::Transport {
            url: self.config.api_url.clone(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl LlmProvider for GitHubModelsClient {
    fn model_name(&self) -> &str {
        &self.config.default_model
    }

    async fn complete(&self, prompt: &str, model: Option<&str>) -> Result<String, LlmError> {
        let token = self
            .config
            .api_token
            .as_ref()
            .map(|t| t.expose_secret())
            .filter(|t| !t.trim().is_empty())
            .ok_or(LlmError::MissingToken)?;
        let model = model.unwrap_or(&self.config.default_model);

        let request = ChatCompletionRequest {
            model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!(model, prompt_chars = prompt.len(), "Sending chat completion");

        let response = self
            .client
            .post(&self.config.api_url)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", &self.config.api_version)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), model, "Chat completion failed");
            return Err(LlmError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::InvalidResponse {
                url: self.config.api_url.clone(),
                reason: e.to_string(),
            })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content);

        match content {
            Some(text) => {
                debug!(model, response_chars = text.len(), "Chat completion received");
                Ok(text)
            }
            None => {
                warn!(model, "Chat completion returned no message");
                Ok(NO_RESPONSE.to_string())
            }
        }
    }
}
