//! Environment and credential diagnostics.
//!
//! Checks that a `.env` file and API keys are present, that keys look sane,
//! and optionally pings each configured backend.

use crate::config::{BackendConfig, Config};
use crate::llm::{create_backend, Backend, LlmError};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Pass,
    Warn,
    Fail,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Status::Pass => "ok",
            Status::Warn => "warn",
            Status::Fail => "FAIL",
        };
        write!(f, "[{:>4}]", tag)
    }
}

/// Outcome of one diagnostic step.
#[derive(Debug, Clone)]
pub struct Check {
    pub label: String,
    pub status: Status,
    pub details: Vec<String>,
}

impl Check {
    fn new(label: impl Into<String>, status: Status) -> Self {
        Self {
            label: label.into(),
            status,
            details: Vec::new(),
        }
    }

    fn detail(mut self, line: impl Into<String>) -> Self {
        self.details.push(line.into());
        self
    }
}

/// All checks from one `doctor` run.
#[derive(Debug, Default)]
pub struct Report {
    pub checks: Vec<Check>,
}

impl Report {
    /// True when no check failed. Warnings do not count.
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.status != Status::Fail)
    }

    pub fn print(&self) {
        println!("scriptgen doctor");
        println!("================\n");
        for check in &self.checks {
            println!("{} {}", check.status, check.label);
            for line in &check.details {
                println!("       {}", line);
            }
        }

        println!();
        if self.passed() {
            println!("All checks passed. Your setup is ready.");
            println!("\nTry:");
            println!("  scriptgen \"How to make the perfect cup of coffee\"");
            println!("  scriptgen topics --niche \"AI Tools\" --count 5");
            println!("  scriptgen serve");
        } else {
            println!("Some checks failed.");
            println!("\nCommon solutions:");
            println!("1. Put your keys in a .env file (OPENAI_API_KEY=..., GEMINI_API_KEY=...)");
            println!("2. Verify the key is correct and active");
            println!("3. Check your account billing and remaining credits");
            println!("4. Check your network connection");
        }
    }
}

/// Run every check. Network pings are skipped when `skip_network` is set.
pub async fn run(config: &Config, dir: &Path, skip_network: bool) -> Report {
    let mut report = Report::default();
    report.checks.push(check_env_file(dir));

    for (role, backend_config) in [
        ("scripts", &config.script_backend),
        ("topics", &config.topic_backend),
    ] {
        let backend = match create_backend(backend_config) {
            Ok(backend) => backend,
            Err(e) => {
                report
                    .checks
                    .push(Check::new(format!("{} backend", role), Status::Fail).detail(e.to_string()));
                continue;
            }
        };

        let key_check = check_credentials(role, backend_config, &backend);
        let have_key = key_check.status != Status::Fail;
        report.checks.push(key_check);

        if have_key && !skip_network {
            report.checks.push(check_connection(role, &backend).await);
        }
    }

    report
}

fn check_env_file(dir: &Path) -> Check {
    let path = dir.join(".env");
    if path.is_file() {
        Check::new(".env file found", Status::Pass)
    } else {
        Check::new(".env file not found", Status::Warn)
            .detail(format!("Keys must come from the environment or the config file ({})", path.display()))
    }
}

fn check_credentials(role: &str, config: &BackendConfig, backend: &Backend) -> Check {
    let label = format!("{} API key for {} ({})", backend.name(), role, backend.env_var());
    let key = match config.settings().credentials.resolve(backend.name()) {
        Ok(key) => key,
        Err(e) => {
            return Check::new(label, Status::Fail)
                .detail(e.to_string())
                .detail(format!("Add {}=your_key_here to your .env file", backend.env_var()));
        }
    };

    let check = Check::new(label, Status::Pass).detail(format!("Key found: {}", mask_key(&key)));
    match key_format_warning(config, &key) {
        Some(warning) => Check {
            status: Status::Warn,
            ..check.detail(warning)
        },
        None => check,
    }
}

/// Shape checks for keys with a known prefix.
fn key_format_warning(config: &BackendConfig, key: &str) -> Option<&'static str> {
    match config {
        BackendConfig::OpenAI { .. } if !key.starts_with("sk-") => {
            Some("Key format looks incorrect: OpenAI API keys start with 'sk-'")
        }
        _ => None,
    }
}

async fn check_connection(role: &str, backend: &Backend) -> Check {
    let label = format!("{} connection for {} ({})", backend.name(), role, backend.model());
    match backend.ping().await {
        Ok(reply) => Check::new(label, Status::Pass).detail(format!("Response: {}", reply)),
        Err(e) => {
            let mut check = Check::new(label, Status::Fail).detail(e.to_string());
            if let Some(hint) = e.hint() {
                check = check.detail(hint);
            }
            if matches!(e, LlmError::Transport { .. }) {
                check = check.detail("Network error - check your connection and proxy settings");
            }
            check
        }
    }
}

/// Show only the start and end of a key.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 14 {
        return "*".repeat(chars.len().max(4));
    }
    let head: String = chars[..10].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn openai_config(base_url: &str, api_key: Option<&str>) -> BackendConfig {
        BackendConfig::OpenAI {
            model: "gpt-4o-mini".into(),
            api_key: api_key.map(str::to_string),
            api_key_env: "SCRIPTGEN_TEST_DOCTOR_UNSET".into(),
            base_url: base_url.into(),
            temperature: 0.7,
            timeout_secs: 5,
        }
    }

    fn gemini_config(base_url: &str, api_key: Option<&str>) -> BackendConfig {
        BackendConfig::Gemini {
            model: "gemini-2.0-flash".into(),
            api_key: api_key.map(str::to_string),
            api_key_env: "SCRIPTGEN_TEST_DOCTOR_UNSET".into(),
            base_url: base_url.into(),
            temperature: 0.7,
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("sk-proj-abcdefghijklmnop1234"), "sk-proj-ab...1234");
        assert_eq!(mask_key("short"), "*****");
        assert_eq!(mask_key(""), "****");
    }

    #[test]
    fn test_openai_key_prefix_warning() {
        let config = openai_config("http://unused", None);
        assert!(key_format_warning(&config, "abc123").is_some());
        assert!(key_format_warning(&config, "sk-abc123").is_none());
        let config = gemini_config("http://unused", None);
        assert!(key_format_warning(&config, "AIza123").is_none());
    }

    #[tokio::test]
    async fn test_missing_keys_fail_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.script_backend = openai_config(&server.uri(), None);
        config.topic_backend = gemini_config(&server.uri(), None);
        let dir = tempfile::tempdir().unwrap();

        let report = run(&config, dir.path(), false).await;
        assert!(!report.passed());
        assert_eq!(report.checks[0].status, Status::Warn);
        assert_eq!(report.checks.len(), 3);
        assert!(report.checks[1..].iter().all(|c| c.status == Status::Fail));
    }

    #[tokio::test]
    async fn test_ping_failure_carries_hint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(402).set_body_json(json!({
                "error": { "message": "You exceeded your current quota" }
            })))
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.script_backend = openai_config(&server.uri(), Some("sk-test-key-1234567890"));
        config.topic_backend = gemini_config(&server.uri(), Some("AIza-test-key-1234567890"));
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "OPENAI_API_KEY=sk-test\n").unwrap();

        let report = run(&config, dir.path(), false).await;
        assert!(!report.passed());
        assert_eq!(report.checks[0].status, Status::Pass);
        let connection = &report.checks[2];
        assert_eq!(connection.status, Status::Fail);
        assert!(connection.details.iter().any(|d| d.contains("billing")));
    }

    #[tokio::test]
    async fn test_skip_network_passes_with_keys() {
        let mut config = Config::default();
        config.script_backend = openai_config("http://127.0.0.1:9", Some("sk-test-key-1234567890"));
        config.topic_backend = gemini_config("http://127.0.0.1:9", Some("AIza-test-key-1234567890"));
        let dir = tempfile::tempdir().unwrap();

        let report = run(&config, dir.path(), true).await;
        assert!(report.passed());
        assert_eq!(report.checks.len(), 3);
        assert!(report.checks[1].details[0].contains("sk-test-ke...7890"));
    }
}
