//! Completion dispatcher: one request in, one trimmed completion (or a typed
//! error) out. No retries, no backoff; every failure is scoped to the request
//! that caused it.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::ProviderConfig;
use crate::error::DispatchError;
use crate::prompt::PromptPayload;

const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Client for an OpenAI-compatible chat-completion endpoint. Built once at
/// startup and shared read-only across in-flight requests; reqwest's client
/// pools connections internally, so cloning the Arc is all the handlers need.
pub struct OpenAiClient {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl OpenAiClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn credential_configured(&self) -> bool {
        self.config.has_credential()
    }

    /// Send the assembled payload and return the first choice's text, trimmed.
    ///
    /// Fails with `MissingCredential` before touching the network when no API
    /// key is configured. Any provider-side failure becomes
    /// `DispatchError::Provider` carrying the underlying message for the logs;
    /// the caller substitutes its own user-facing fallback text.
    pub async fn dispatch(&self, payload: &PromptPayload) -> Result<String, DispatchError> {
        if !self.config.has_credential() {
            return Err(DispatchError::MissingCredential);
        }

        let mut messages = vec![WireMessage {
            role: "system",
            content: &payload.system,
        }];
        messages.extend(payload.messages.iter().map(|turn| WireMessage {
            role: turn.role.as_str(),
            content: &turn.content,
        }));

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        info!(
            "Dispatching completion request: model={}, messages={}",
            self.config.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(self.config.api_url("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach completion endpoint: {}", e);
                DispatchError::Provider(format!("request failed: {e}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read completion response: {}", e);
            DispatchError::Provider(format!("failed to read response: {e}"))
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| body.chars().take(200).collect());
            error!("Completion endpoint returned {}: {}", status, message);
            return Err(DispatchError::Provider(format!("{status}: {message}")));
        }

        let decoded: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse completion response: {}", e);
            DispatchError::Provider(format!("failed to parse response: {e}"))
        })?;

        let content = decoded
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                error!("Completion response contained no choices");
                DispatchError::Provider("response contained no choices".to_string())
            })?;

        let content = content.trim().to_string();
        info!("Completion succeeded: {} chars", content.chars().count());
        Ok(content)
    }

    /// Lightweight reachability probe for /api/health: hits the models
    /// listing and reports whether the endpoint answered 2xx.
    pub async fn health_check(&self) -> Result<bool, DispatchError> {
        debug!("Probing provider at {}", self.config.api_url("models"));

        let mut request = self.client.get(self.config.api_url("models"));
        if self.config.has_credential() {
            request = request.bearer_auth(&self.config.api_key);
        }

        let response = request.send().await.map_err(|e| {
            debug!("Provider probe failed: {}", e);
            DispatchError::Provider(format!("health check failed: {e}"))
        })?;

        Ok(response.status().is_success())
    }
}
