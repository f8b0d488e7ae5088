//! HTTP server for the web form.
//!
//! Results are never stored on the server: the generated script is rendered
//! into the page and posted back by the download button.

use crate::config::Defaults;
use crate::generator::{ScriptGenerator, TopicGenerator};
use crate::llm::LlmError;
use crate::request::{
    GenerateResponse, Niche, RequestError, ScriptLength, ScriptRequest, ScriptStyle, TopicRequest,
};
use crate::web::page::{Notice, Page, PageRenderer};
use anyhow::{Context as AnyhowContext, Result};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// File name offered by the download button.
pub const DOWNLOAD_FILENAME: &str = "video_script.txt";

/// Shared state: the generators hold the process-wide backend handles and
/// the page template is registered once.
pub struct AppState {
    scripts: ScriptGenerator,
    topics: TopicGenerator,
    pages: PageRenderer,
    defaults: Defaults,
}

impl AppState {
    pub fn new(
        scripts: ScriptGenerator,
        topics: TopicGenerator,
        defaults: Defaults,
    ) -> Result<Self> {
        let pages = PageRenderer::new().context("Failed to register page template")?;
        Ok(Self {
            scripts,
            topics,
            pages,
            defaults,
        })
    }

    /// Environment variables that still need to be set, checked on every page
    /// render so a key added to the environment later is picked up.
    fn missing_keys(&self) -> Vec<String> {
        let mut missing = Vec::new();
        for backend in [self.scripts.backend(), self.topics.backend()] {
            if backend.ensure_credentials().is_err() {
                let var = backend.env_var().to_string();
                if !missing.contains(&var) {
                    missing.push(var);
                }
            }
        }
        missing
    }

    fn blank_page(&self) -> Page {
        Page {
            missing_keys: self.missing_keys(),
            prompt: String::new(),
            length: self.defaults.web_length,
            style: self.defaults.style,
            niche: Niche::default().label().to_string(),
            count: self.defaults.topic_count,
            notice: None,
            script: None,
            topics: None,
        }
    }

    fn respond(&self, page: &Page) -> Response {
        match self.pages.render(page) {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                error!(error = %e, "page rendering failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
            }
        }
    }
}

pub async fn run(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind web server to {}", addr))?;
    run_with_listener(listener, state).await
}

pub async fn run_with_listener(listener: TcpListener, state: AppState) -> Result<()> {
    let router = build_router(Arc::new(state));
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "scriptgen web form listening on http://{}", addr);
    }
    axum::serve(listener, router.into_make_service())
        .await
        .context("Web server failed")
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/script", post(script_handler))
        .route("/topics", post(topics_handler))
        .route("/download", post(download_handler))
        .route("/api/script", post(api_script_handler))
        .route("/api/topics", post(api_topics_handler))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

async fn index_handler(State(state): State<Arc<AppState>>) -> Response {
    state.respond(&state.blank_page())
}

#[derive(Debug, Deserialize)]
struct ScriptForm {
    #[serde(default)]
    prompt: String,
    length: ScriptLength,
    style: ScriptStyle,
}

async fn script_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ScriptForm>,
) -> Response {
    let mut page = state.blank_page();
    page.length = form.length;
    page.style = form.style;

    match ScriptRequest::new(form.prompt.clone(), form.length, form.style) {
        Err(e) => page.notice = Some(Notice::warning(e.to_string())),
        Ok(request) => match state.scripts.generate_script(&request).await {
            Ok(script) => {
                page.notice = Some(Notice::success("Script generated successfully!"));
                page.script = Some(script);
            }
            Err(e) => {
                error!(error = %e, "script generation failed");
                page.notice = Some(Notice::error(format!("Error generating script: {}", e)));
            }
        },
    }
    page.prompt = form.prompt;
    state.respond(&page)
}

#[derive(Debug, Deserialize)]
struct TopicForm {
    #[serde(default)]
    niche: String,
    count: u32,
}

fn topic_request(niche: &str, count: u32) -> Result<TopicRequest, RequestError> {
    let niche = Niche::listed(niche).ok_or_else(|| RequestError::UnknownNiche(niche.to_string()))?;
    TopicRequest::new(niche, count)
}

async fn topics_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<TopicForm>,
) -> Response {
    let mut page = state.blank_page();
    page.count = form.count;

    match topic_request(&form.niche, form.count) {
        Err(e) => {
            warn!(error = %e, "rejected topic form");
            page.notice = Some(Notice::warning(e.to_string()));
        }
        Ok(request) => {
            page.niche = request.niche.label().to_string();
            match state.topics.generate_topics(&request).await {
                Ok(topics) => {
                    page.notice = Some(Notice::success("Topics generated successfully!"));
                    page.topics = Some(topics.join("\n"));
                }
                Err(e) => {
                    error!(error = %e, "topic generation failed");
                    page.notice = Some(Notice::error(format!("Error generating topics: {}", e)));
                }
            }
        }
    }
    state.respond(&page)
}

#[derive(Debug, Deserialize)]
struct DownloadForm {
    #[serde(default)]
    script: String,
}

/// Browsers submit textarea content with CRLF line breaks; the file keeps the
/// script's own `\n`.
async fn download_handler(Form(form): Form<DownloadForm>) -> impl IntoResponse {
    let script = form.script.replace("\r\n", "\n");
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", DOWNLOAD_FILENAME),
            ),
        ],
        script,
    )
}

/// Missing credentials are a server setup problem; anything else came from
/// the provider.
fn failure_status(err: &anyhow::Error) -> StatusCode {
    match err.downcast_ref::<LlmError>() {
        Some(e) if e.is_missing_credentials() => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_GATEWAY,
    }
}

#[derive(Debug, Deserialize)]
struct ApiScriptBody {
    prompt: String,
    length: Option<ScriptLength>,
    style: Option<ScriptStyle>,
}

async fn api_script_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ApiScriptBody>,
) -> (StatusCode, Json<GenerateResponse>) {
    let request = match ScriptRequest::new(
        body.prompt,
        body.length.unwrap_or(state.defaults.web_length),
        body.style.unwrap_or(state.defaults.style),
    ) {
        Ok(request) => request,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(GenerateResponse::error(e.to_string()))),
    };

    match state.scripts.generate_script(&request).await {
        Ok(script) => (StatusCode::OK, Json(GenerateResponse::script(script))),
        Err(e) => {
            error!(error = %e, "script generation failed");
            (failure_status(&e), Json(GenerateResponse::error(e.to_string())))
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiTopicsBody {
    niche: String,
    count: Option<u32>,
}

async fn api_topics_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ApiTopicsBody>,
) -> (StatusCode, Json<GenerateResponse>) {
    let count = body.count.unwrap_or(state.defaults.topic_count);
    let request = match topic_request(&body.niche, count) {
        Ok(request) => request,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(GenerateResponse::error(e.to_string()))),
    };

    match state.topics.generate_topics(&request).await {
        Ok(topics) => (StatusCode::OK, Json(GenerateResponse::topics(topics))),
        Err(e) => {
            error!(error = %e, "topic generation failed");
            (failure_status(&e), Json(GenerateResponse::error(e.to_string())))
        }
    }
}
