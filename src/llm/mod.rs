//! LLM backend implementations.
//!
//! Scripts and topics are generated by hosted chat models. Each backend
//! exposes free-text generation, topic-list structured output and a small
//! ping used by `scriptgen doctor`.

pub mod error;
pub mod gemini;
pub mod openai;

pub use error::LlmError;

use crate::config::BackendConfig;
use serde::Deserialize;
use std::time::Duration;

/// Timeout for the doctor's connectivity ping.
pub const PING_TIMEOUT: Duration = Duration::from_secs(30);

/// Where a backend finds its API key.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Key from the config file; takes precedence over the environment.
    pub api_key: Option<String>,
    /// Environment variable consulted when the config has no key.
    pub env_var: String,
}

impl Credentials {
    /// Resolve the key without touching the network.
    pub fn resolve(&self, provider: &'static str) -> Result<String, LlmError> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(&self.env_var).ok())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LlmError::MissingApiKey {
                provider,
                env_var: self.env_var.clone(),
            })
    }
}

/// Connection settings shared by every provider.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub model: String,
    pub credentials: Credentials,
    pub base_url: String,
    pub temperature: f32,
    pub timeout: Duration,
}

/// How the model should shape its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Text,
    TopicList,
}

/// Enum-based backend for LLM providers.
pub enum Backend {
    OpenAI(openai::OpenAIBackend),
    Gemini(gemini::GeminiBackend),
}

impl Backend {
    /// Generate free text from a prompt.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        match self {
            Backend::OpenAI(b) => b.complete(prompt, OutputMode::Text).await,
            Backend::Gemini(b) => b.complete(prompt, OutputMode::Text).await,
        }
    }

    /// Generate a list of topics, with the list shape enforced by the provider.
    pub async fn generate_topic_list(&self, prompt: &str) -> Result<Vec<String>, LlmError> {
        let raw = match self {
            Backend::OpenAI(b) => b.complete(prompt, OutputMode::TopicList).await?,
            Backend::Gemini(b) => b.complete(prompt, OutputMode::TopicList).await?,
        };
        parse_topic_list(self.name(), &raw)
    }

    /// Send a tiny request to verify the key and connectivity.
    pub async fn ping(&self) -> Result<String, LlmError> {
        match self {
            Backend::OpenAI(b) => b.ping().await,
            Backend::Gemini(b) => b.ping().await,
        }
    }

    /// Fail early if no API key is available.
    pub fn ensure_credentials(&self) -> Result<(), LlmError> {
        match self {
            Backend::OpenAI(b) => b.api_key().map(|_| ()),
            Backend::Gemini(b) => b.api_key().map(|_| ()),
        }
    }

    /// Get the backend name.
    pub fn name(&self) -> &'static str {
        match self {
            Backend::OpenAI(_) => openai::PROVIDER,
            Backend::Gemini(_) => gemini::PROVIDER,
        }
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        match self {
            Backend::OpenAI(b) => &b.model,
            Backend::Gemini(b) => &b.model,
        }
    }

    /// The environment variable this backend reads its key from.
    pub fn env_var(&self) -> &str {
        match self {
            Backend::OpenAI(b) => &b.credentials().env_var,
            Backend::Gemini(b) => &b.credentials().env_var,
        }
    }
}

/// Create a backend from configuration.
pub fn create_backend(config: &BackendConfig) -> Result<Backend, LlmError> {
    let settings = config.settings();
    match config {
        BackendConfig::OpenAI { .. } => Ok(Backend::OpenAI(openai::OpenAIBackend::new(settings)?)),
        BackendConfig::Gemini { .. } => Ok(Backend::Gemini(gemini::GeminiBackend::new(settings)?)),
    }
}

#[derive(Debug, Deserialize)]
struct TopicList {
    topics: Vec<String>,
}

/// Name of the structured-output schema sent to providers.
const TOPIC_SCHEMA_NAME: &str = "topics_response";
const TOPIC_FIELD_DESCRIPTION: &str = "A list of topics for the niche";

/// Parse the JSON object the providers return in topic-list mode.
fn parse_topic_list(provider: &'static str, raw: &str) -> Result<Vec<String>, LlmError> {
    let list: TopicList =
        serde_json::from_str(raw.trim()).map_err(|source| LlmError::Schema { provider, source })?;
    Ok(list
        .topics
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(api_key: Option<&str>, env_var: &str) -> Credentials {
        Credentials {
            api_key: api_key.map(str::to_string),
            env_var: env_var.to_string(),
        }
    }

    #[test]
    fn test_config_key_wins() {
        let creds = credentials(Some(" sk-from-config "), "SCRIPTGEN_TEST_NEVER_SET_A");
        assert_eq!(creds.resolve("OpenAI").unwrap(), "sk-from-config");
    }

    #[test]
    fn test_missing_key_is_reported() {
        let creds = credentials(None, "SCRIPTGEN_TEST_NEVER_SET_B");
        let err = creds.resolve("OpenAI").unwrap_err();
        assert!(err.is_missing_credentials());
        assert!(err.to_string().contains("SCRIPTGEN_TEST_NEVER_SET_B"));
    }

    #[test]
    fn test_blank_config_key_falls_through() {
        let creds = credentials(Some("   "), "SCRIPTGEN_TEST_NEVER_SET_C");
        assert!(creds.resolve("Gemini").unwrap_err().is_missing_credentials());
    }

    #[test]
    fn test_parse_topic_list() {
        let topics =
            parse_topic_list("Gemini", r#"{"topics": [" One ", "", "Two"]}"#).unwrap();
        assert_eq!(topics, vec!["One", "Two"]);
    }

    #[test]
    fn test_parse_topic_list_rejects_other_shapes() {
        let err = parse_topic_list("OpenAI", r#"["One", "Two"]"#).unwrap_err();
        assert!(matches!(err, LlmError::Schema { provider: "OpenAI", .. }));
    }
}
