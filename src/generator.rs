//! Script and topic generators: prompt, model call, formatting.

use crate::format::{clean_script, label_topics};
use crate::llm::Backend;
use crate::prompt::PromptRenderer;
use crate::request::{ScriptRequest, TopicRequest};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Turns a [`ScriptRequest`] into a finished script.
#[derive(Clone)]
pub struct ScriptGenerator {
    backend: Arc<Backend>,
    prompts: PromptRenderer,
}

impl ScriptGenerator {
    pub fn new(backend: Arc<Backend>, prompts: PromptRenderer) -> Self {
        Self { backend, prompts }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub async fn generate_script(&self, request: &ScriptRequest) -> Result<String> {
        let prompt = self.prompts.script_prompt(request)?;
        info!(
            backend = self.backend.name(),
            model = self.backend.model(),
            length = %request.length,
            style = %request.style,
            "generating script"
        );
        let raw = self.backend.generate(&prompt).await?;
        debug!(chars = raw.len(), "script received");
        Ok(clean_script(&raw))
    }
}

/// Turns a [`TopicRequest`] into labeled `Topic N: ...` lines.
#[derive(Clone)]
pub struct TopicGenerator {
    backend: Arc<Backend>,
    prompts: PromptRenderer,
    structured: bool,
}

impl TopicGenerator {
    pub fn new(backend: Arc<Backend>, prompts: PromptRenderer, structured: bool) -> Self {
        Self {
            backend,
            prompts,
            structured,
        }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub async fn generate_topics(&self, request: &TopicRequest) -> Result<Vec<String>> {
        let prompt = self.prompts.topic_prompt(request)?;
        info!(
            backend = self.backend.name(),
            model = self.backend.model(),
            niche = %request.niche,
            count = request.count,
            structured = self.structured,
            "generating topics"
        );
        let raw = if self.structured {
            self.backend.generate_topic_list(&prompt).await?.join("\n")
        } else {
            self.backend.generate(&prompt).await?
        };
        let topics = label_topics(&raw);
        debug!(topics = topics.len(), "topics received");
        Ok(topics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::gemini::GeminiBackend;
    use crate::llm::openai::OpenAIBackend;
    use crate::llm::{Credentials, LlmError, ProviderSettings};
    use crate::request::{Niche, ScriptLength, ScriptStyle};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(base_url: &str, api_key: Option<&str>) -> ProviderSettings {
        ProviderSettings {
            model: "test-model".to_string(),
            credentials: Credentials {
                api_key: api_key.map(str::to_string),
                env_var: "SCRIPTGEN_TEST_GENERATOR_UNSET".to_string(),
            },
            base_url: base_url.to_string(),
            temperature: 0.7,
            timeout: Duration::from_secs(5),
        }
    }

    fn openai(base_url: &str, api_key: Option<&str>) -> Arc<Backend> {
        Arc::new(Backend::OpenAI(OpenAIBackend::new(settings(base_url, api_key)).unwrap()))
    }

    fn gemini(base_url: &str, api_key: Option<&str>) -> Arc<Backend> {
        Arc::new(Backend::Gemini(GeminiBackend::new(settings(base_url, api_key)).unwrap()))
    }

    fn prompts() -> PromptRenderer {
        PromptRenderer::new().unwrap()
    }

    fn gemini_text(text: &str) -> serde_json::Value {
        json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
    }

    #[tokio::test]
    async fn test_script_prompt_reaches_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("perfect cup of coffee"))
            .and(body_string_contains("30 seconds"))
            .and(body_string_contains("Dramatic"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "  [Close-up] Steam rises.  " } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let generator = ScriptGenerator::new(openai(&server.uri(), Some("sk-test")), prompts());
        let request = ScriptRequest::new(
            "How to make the perfect cup of coffee",
            ScriptLength::ThirtySeconds,
            ScriptStyle::Dramatic,
        )
        .unwrap();
        let script = generator.generate_script(&request).await.unwrap();
        assert_eq!(script, "[Close-up] Steam rises.");
    }

    #[tokio::test]
    async fn test_free_text_topics_are_labeled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("list of 3 engaging"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(gemini_text("Robots that paint\n\nTopic 2: AI chefs\nTalking pets")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let generator = TopicGenerator::new(gemini(&server.uri(), Some("g-test")), prompts(), false);
        let request = TopicRequest::new(Niche::AiTools, 3).unwrap();
        let topics = generator.generate_topics(&request).await.unwrap();
        assert_eq!(
            topics,
            vec!["Topic 1: Robots that paint", "Topic 2: AI chefs", "Topic 3: Talking pets"]
        );
    }

    #[tokio::test]
    async fn test_structured_topics_are_labeled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("responseSchema"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(gemini_text(r#"{"topics": ["Budget hacks", "Index funds"]}"#)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let generator = TopicGenerator::new(gemini(&server.uri(), Some("g-test")), prompts(), true);
        let request = TopicRequest::new(Niche::PersonalFinance, 2).unwrap();
        let topics = generator.generate_topics(&request).await.unwrap();
        assert_eq!(topics, vec!["Topic 1: Budget hacks", "Topic 2: Index funds"]);
    }

    #[tokio::test]
    async fn test_missing_credentials_are_detectable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let generator = ScriptGenerator::new(openai(&server.uri(), None), prompts());
        let request =
            ScriptRequest::new("anything", ScriptLength::TenSeconds, ScriptStyle::Casual).unwrap();
        let err = generator.generate_script(&request).await.unwrap_err();
        let llm_err = err.downcast_ref::<LlmError>().expect("LlmError");
        assert!(llm_err.is_missing_credentials());
    }
}
