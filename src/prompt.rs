//! Prompt templates for script and topic generation.

use crate::request::{ScriptRequest, TopicRequest};
use handlebars::{Handlebars, RenderError, RenderErrorReason, TemplateError};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

pub const SCRIPT: &str = "script";
pub const TOPICS: &str = "topics";

const SCRIPT_TEMPLATE: &str = r#"You are an expert scriptwriter for short-form social media videos.

Write a {{style}} video script about: {{topic}}

The script must take about {{length}} to read aloud at a natural pace.

Rules:
- Open with a hook in the first sentence
- Keep the tone {{style}} from start to finish
- Write only the words to be spoken, plus short scene directions in [brackets]
- End with a clear call to action
- No title, no preamble, no notes after the script"#;

const TOPIC_TEMPLATE: &str = r#"You are a content creator that specializes in making short AI generated videos for social media.

You will be given a niche and a number of topics to generate.

Your task:
- Generate a list of {{number_of_topics}} engaging, relevant topics for the "{{niche}}" niche.
- Each topic should be short, catchy, and suitable as a video idea.
- Do not include any explanations or extra text, just the list."#;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("no value for template placeholder {0}")]
    Unresolved(String),
    #[error("invalid prompt template: {0}")]
    Template(#[from] TemplateError),
    #[error("failed to render prompt: {0}")]
    Render(RenderError),
}

impl From<RenderError> for PromptError {
    fn from(err: RenderError) -> Self {
        match err.reason() {
            RenderErrorReason::MissingVariable(name) => {
                PromptError::Unresolved(name.clone().unwrap_or_default())
            }
            _ => PromptError::Render(err),
        }
    }
}

/// Registered prompt templates.
///
/// Strict mode turns a missing variable into [`PromptError::Unresolved`].
/// Values go into the prompt verbatim: no HTML escaping, and a value
/// containing `{{...}}` is never expanded.
#[derive(Clone)]
pub struct PromptRenderer {
    engine: Arc<Handlebars<'static>>,
}

impl PromptRenderer {
    pub fn new() -> Result<Self, PromptError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_template_string(SCRIPT, SCRIPT_TEMPLATE)?;
        handlebars.register_template_string(TOPICS, TOPIC_TEMPLATE)?;
        Ok(Self {
            engine: Arc::new(handlebars),
        })
    }

    pub fn render(&self, name: &str, data: &Value) -> Result<String, PromptError> {
        Ok(self.engine.render(name, data)?)
    }

    /// Build the prompt for a script request.
    pub fn script_prompt(&self, request: &ScriptRequest) -> Result<String, PromptError> {
        self.render(
            SCRIPT,
            &json!({
                "topic": request.prompt.trim(),
                "length": request.length.label(),
                "style": request.style.label(),
            }),
        )
    }

    /// Build the prompt for a topic request.
    pub fn topic_prompt(&self, request: &TopicRequest) -> Result<String, PromptError> {
        self.render(
            TOPICS,
            &json!({
                "number_of_topics": request.count,
                "niche": request.niche.label(),
            }),
        )
    }
}
