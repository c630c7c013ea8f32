use crate::config::CompletionSettings;
use crate::errors::AppError;
use crate::models::{ChatRole, ChatTurn};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Input for a single text-completion call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System instruction placed before the conversation.
    pub system: String,
    /// Prior turns, oldest first.
    pub history: Vec<ChatTurn>,
    /// The message being answered.
    pub user_message: String,
}

/// External text-generation service used for conversational replies.
///
/// Implementations report every failure (transport, status, unexpected
/// response shape) as an error; callers decide how to fall back.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    async fn complete(&self, request: CompletionRequest) -> Result<String, AppError>;
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAiCompletionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    settings: CompletionSettings,
}

impl OpenAiCompletionClient {
    /// Creates a new `OpenAiCompletionClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the API, without the `/chat/completions` suffix.
    /// * `api_key` - Bearer credential.
    /// * `settings` - Model, output length, temperature and timeout.
    pub fn new(
        base_url: String,
        api_key: String,
        settings: CompletionSettings,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create completion client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            settings,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl TextCompletion for OpenAiCompletionClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, AppError> {
        let mut messages = Vec::with_capacity(request.history.len() + 2);
        messages.push(WireMessage {
            role: ChatRole::System.as_str(),
            content: &request.system,
        });
        messages.extend(request.history.iter().map(|turn| WireMessage {
            role: turn.role.as_str(),
            content: &turn.content,
        }));
        messages.push(WireMessage {
            role: ChatRole::User.as_str(),
            content: &request.user_message,
        });

        let body = ChatCompletionBody {
            model: &self.settings.model,
            messages,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        tracing::debug!(
            "Requesting completion from {} (model: {}, {} message(s))",
            self.endpoint(),
            self.settings.model,
            body.messages.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Completion API returned {}: {}",
                status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse completion response: {}", e))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AppError::ExternalApiError("Completion response has no choices".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation_trims_trailing_slash() {
        let client = OpenAiCompletionClient::new(
            "https://api.example.com/v1/".to_string(),
            "key".to_string(),
            CompletionSettings::default(),
        )
        .unwrap();
        assert_eq!(client.endpoint(), "https://api.example.com/v1/chat/completions");
    }

    #[test]
    fn test_response_without_content_is_rejected() {
        let parsed: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant"}}]}"#).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }
}
