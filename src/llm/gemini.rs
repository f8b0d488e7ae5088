//! Gemini backend implementation.
//!
//! Calls `models/{model}:generateContent` on the Generative Language API.

use super::{
    Credentials, LlmError, OutputMode, ProviderSettings, PING_TIMEOUT, TOPIC_FIELD_DESCRIPTION,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

pub const PROVIDER: &str = "Gemini";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini backend for Google's hosted models.
pub struct GeminiBackend {
    pub model: String,
    credentials: Credentials,
    base_url: String,
    temperature: f32,
    client: Client,
}

impl GeminiBackend {
    /// Create a new Gemini backend.
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

    pub(super) async fn ping(&self) -> Result<String, LlmError> {
        let api_key = self.api_key()?;
        let mut request = self.build_request("Hello", OutputMode::Text);
        request.generation_config.max_output_tokens = Some(10);
        self.send(&api_key, &request, Some(PING_TIMEOUT)).await
    }

    fn build_request<'a>(
        &self,
        prompt: &'a str,
        mode: OutputMode,
    ) -> GeminiRequest<'a> {
        let (response_mime_type, response_schema) = match mode {
            OutputMode::Text => (None, None),
            OutputMode::TopicList => (
                Some("application/json"),
                Some(json!({
                    "type": "OBJECT",
                    "properties": {
                        "topics": {
                            "type": "ARRAY",
                            "description": TOPIC_FIELD_DESCRIPTION,
                            "items": { "type": "STRING" }
                        }
                    },
                    "required": ["topics"]
                })),
            ),
        };

        GeminiRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: None,
                response_mime_type,
                response_schema,
            },
        }
    }

    async fn send(
        &self,
        api_key: &str,
        request: &GeminiRequest<'_>,
        timeout: Option<std::time::Duration>,
    ) -> Result<String, LlmError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        debug!(
            model = %self.model,
            structured = request.generation_config.response_schema.is_some(),
            "sending Gemini request"
        );

        let mut builder = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
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
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| if body.is_empty() { "Unknown error".to_string() } else { body });
            return Err(LlmError::Api {
                provider: PROVIDER,
                status,
                message,
            });
        }

        let gemini_response: GeminiResponse =
            response.json().await.map_err(|source| LlmError::Decode {
                provider: PROVIDER,
                source,
            })?;

        // Text may be split across several parts of the first candidate.
        let text: String = gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(LlmError::Empty { provider: PROVIDER });
        }
        Ok(text.to_string())
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}
