//! OpenAI backend implementation.
//!
//! Uses the chat completions API. Topic lists are requested with a strict
//! `json_schema` response format.

use super::{
    Credentials, LlmError, OutputMode, ProviderSettings, PING_TIMEOUT, TOPIC_FIELD_DESCRIPTION,
    TOPIC_SCHEMA_NAME,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

pub const PROVIDER: &str = "OpenAI";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI backend for GPT models.
pub struct OpenAIBackend {
    pub model: String,
    credentials: Credentials,
    base_url: String,
    temperature: f32,
    client: Client,
}

impl OpenAIBackend {
    /// Create a new OpenAI backend.
    pub fn new(settings: ProviderSettings) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(LlmError::Client)?;

        Ok(Self {
            model: settings.model,
            credentials: settings.credentials,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            temperature: settings.temperature,
            client,
        })
    }

    pub(super) fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Get the API key from config or environment.
    pub(super) fn api_key(&self) -> Result<String, LlmError> {
        self.credentials.resolve(PROVIDER)
    }

    pub(super) async fn complete(
        &self,
        prompt: &str,
        mode: OutputMode,
    ) -> Result<String, LlmError> {
        let api_key = self.api_key()?;
        let request = self.build_request(prompt, mode);
        self.send(&api_key, &request, None).await
    }

    /// Minimal "Hello" completion.
    pub(super) async fn ping(&self) -> Result<String, LlmError> {
        let api_key = self.api_key()?;
        let mut request = self.build_request("Hello", OutputMode::Text);
        request.max_tokens = Some(10);
        self.send(&api_key, &request, Some(PING_TIMEOUT)).await
    }

    fn build_request(&self, prompt: &str, mode: OutputMode) -> OpenAIRequest {
        let response_format = match mode {
            OutputMode::Text => None,
            OutputMode::TopicList => Some(json!({
                "type": "json_schema",
                "json_schema": {
                    "name": TOPIC_SCHEMA_NAME,
                    "strict": true,
                    "schema": {
                        "type": "object",
                        "properties": {
                            "topics": {
                                "type": "array",
                                "description": TOPIC_FIELD_DESCRIPTION,
                                "items": { "type": "string" }
                            }
                        },
                        "required": ["topics"],
                        "additionalProperties": false
                    }
                }
            })),
        };

        OpenAIRequest {
            model: self.model.clone(),
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
            max_tokens: None,
            response_format,
        }
    }

    async fn send(
        &self,
        api_key: &str,
        request: &OpenAIRequest,
        timeout: Option<std::time::Duration>,
    ) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %self.model, structured = request.response_format.is_some(), "sending OpenAI request");

        let mut builder = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(request);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|source| LlmError::Transport {
            provider: PROVIDER,
            source,
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenAIError>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| if body.is_empty() { "Unknown error".to_string() } else { body });
            return Err(LlmError::Api {
                provider: PROVIDER,
                status,
                message,
            });
        }

        let openai_response: OpenAIResponse =
            response.json().await.map_err(|source| LlmError::Decode {
                provider: PROVIDER,
                source,
            })?;

        openai_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(LlmError::Empty { provider: PROVIDER })
    }
}

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessageResponse,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessageResponse {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    error: OpenAIErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorDetail {
    message: String,
}
