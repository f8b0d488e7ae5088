//! HTML rendering for the web form.

use crate::request::{Niche, ScriptLength, ScriptStyle, TOPIC_COUNT_RANGE};
use handlebars::{Handlebars, RenderError, TemplateError};
use serde_json::{json, Value};
use std::sync::Arc;

const PAGE: &str = "page";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
}

impl NoticeKind {
    fn class(self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Warning => "warning",
            NoticeKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Warning, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, text: text.into() }
    }
}

/// Everything one rendering of the page shows. Form fields echo the last
/// submission.
#[derive(Debug, Clone)]
pub struct Page {
    pub missing_keys: Vec<String>,
    pub prompt: String,
    pub length: ScriptLength,
    pub style: ScriptStyle,
    pub niche: String,
    pub count: u32,
    pub notice: Option<Notice>,
    pub script: Option<String>,
    pub topics: Option<String>,
}

impl Page {
    fn data(&self) -> Value {
        let listed = Niche::LISTED;
        json!({
            "missing_keys": self.missing_keys,
            "notice": self.notice.as_ref().map(|notice| json!({
                "class": notice.kind.class(),
                "text": notice.text,
            })),
            "prompt": self.prompt,
            "lengths": options(ScriptLength::ALL.iter().map(|l| l.label()), self.length.label()),
            "styles": options(ScriptStyle::ALL.iter().map(|s| s.label()), self.style.label()),
            "niches": options(listed.iter().map(|n| n.label()), &self.niche),
            "min": TOPIC_COUNT_RANGE.start(),
            "max": TOPIC_COUNT_RANGE.end(),
            "count": self.count,
            "script": self.script,
            "topics": self.topics,
        })
    }
}

fn options<'a>(labels: impl Iterator<Item = &'a str>, selected: &str) -> Vec<Value> {
    labels
        .map(|label| json!({ "label": label, "selected": label == selected }))
        .collect()
}

/// The page template, registered once and shared by every request.
#[derive(Clone)]
pub struct PageRenderer {
    engine: Arc<Handlebars<'static>>,
}

impl PageRenderer {
    pub fn new() -> Result<Self, TemplateError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_template_string(PAGE, PAGE_TEMPLATE)?;
        Ok(Self {
            engine: Arc::new(handlebars),
        })
    }

    pub fn render(&self, page: &Page) -> Result<String, RenderError> {
        self.engine.render(PAGE, &page.data())
    }
}

const PAGE_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>AI Video Script Generator</title>
<style>
body { font-family: system-ui, sans-serif; max-width: 56rem; margin: 2rem auto; padding: 0 1rem; }
label { display: block; margin-top: .75rem; font-weight: 600; }
textarea, select, input { width: 100%; box-sizing: border-box; margin-top: .25rem; }
button { margin-top: 1rem; padding: .5rem 1rem; }
section { margin-top: 2rem; }
.notice { padding: .75rem; margin: 1rem 0; border-radius: .25rem; }
.success { background: #e6f4ea; }
.warning { background: #fff4e5; }
.error { background: #fdecea; }
footer { margin-top: 3rem; color: #666; border-top: 1px solid #ddd; padding-top: 1rem; }
</style>
</head>
<body>
<h1>AI Video Script Generator</h1>
<p>Generate engaging video scripts from simple prompts using AI!</p>
{{#each missing_keys}}
<div class="notice error">Please set your {{this}} in the .env file</div>
{{/each}}
{{#if notice}}
<div class="notice {{notice.class}}">{{notice.text}}</div>
{{/if}}
<section>
<h2>Script Generation</h2>
<form method="post" action="/script">
<label for="prompt">Enter your video idea or topic:</label>
<textarea id="prompt" name="prompt" rows="4" placeholder="e.g. 'How to make the perfect cup of coffee' or 'The history of space exploration'">{{prompt}}</textarea>
<label for="length">Script Length</label>
<select id="length" name="length">{{#each lengths}}<option value="{{label}}"{{#if selected}} selected{{/if}}>{{label}}</option>{{/each}}</select>
<label for="style">Script Style</label>
<select id="style" name="style">{{#each styles}}<option value="{{label}}"{{#if selected}} selected{{/if}}>{{label}}</option>{{/each}}</select>
<button type="submit">Generate Script</button>
</form>
{{#if script}}
<h3>Generated Script</h3>
<textarea id="script" rows="16" readonly>{{script}}</textarea>
<form method="post" action="/download">
<textarea name="script" hidden>{{script}}</textarea>
<button type="submit">Download Script</button>
</form>
{{/if}}
</section>
<section>
<h2>Topic Generation</h2>
<form method="post" action="/topics">
<label for="niche">Niche</label>
<select id="niche" name="niche">{{#each niches}}<option value="{{label}}"{{#if selected}} selected{{/if}}>{{label}}</option>{{/each}}</select>
<label for="count">Number of topics</label>
<input id="count" name="count" type="number" min="{{min}}" max="{{max}}" value="{{count}}">
<button type="submit">Generate Topics</button>
</form>
{{#if topics}}
<h3>Generated Topics</h3>
<textarea id="topics" rows="12" readonly>{{topics}}</textarea>
{{/if}}
</section>
<footer>Create engaging video scripts from simple prompts!</footer>
</body>
</html>
"#;
