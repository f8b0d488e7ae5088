//! Configuration management for scriptgen.
//!
//! Configuration is loaded from `~/.config/scriptgen/config.toml` unless a
//! path is given on the command line. Every field has a default, so a missing
//! file or a partial file is fine.

use crate::llm::{gemini, openai, Credentials, ProviderSettings};
use crate::request::{ScriptLength, ScriptStyle};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend used for video scripts.
    #[serde(default = "default_script_backend")]
    pub script_backend: BackendConfig,
    /// Backend used for topic lists.
    #[serde(default = "default_topic_backend")]
    pub topic_backend: BackendConfig,
    /// Default request options.
    #[serde(default)]
    pub defaults: Defaults,
    /// Web form settings.
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            script_backend: default_script_backend(),
            topic_backend: default_topic_backend(),
            defaults: Defaults::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Backend configuration for LLM providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// OpenAI chat completions.
    #[serde(rename = "openai")]
    OpenAI {
        /// Model name (default: gpt-4o-mini).
        #[serde(default = "default_openai_model")]
        model: String,
        /// API key (prefer the environment variable).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api_key: Option<String>,
        /// Environment variable holding the key (default: OPENAI_API_KEY).
        #[serde(default = "default_openai_key_env")]
        api_key_env: String,
        #[serde(default = "default_openai_base_url")]
        base_url: String,
        #[serde(default = "default_temperature")]
        temperature: f32,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    /// Google Gemini.
    Gemini {
        /// Model name (default: gemini-2.0-flash).
        #[serde(default = "default_gemini_model")]
        model: String,
        /// API key (prefer the environment variable).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api_key: Option<String>,
        /// Environment variable holding the key (default: GEMINI_API_KEY).
        #[serde(default = "default_gemini_key_env")]
        api_key_env: String,
        #[serde(default = "default_gemini_base_url")]
        base_url: String,
        #[serde(default = "default_temperature")]
        temperature: f32,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

impl BackendConfig {
    /// Get the backend type as a string.
    pub fn backend_type(&self) -> &'static str {
        match self {
            BackendConfig::OpenAI { .. } => "openai",
            BackendConfig::Gemini { .. } => "gemini",
        }
    }

    /// Get the model name.
    pub fn model_name(&self) -> &str {
        match self {
            BackendConfig::OpenAI { model, .. } => model,
            BackendConfig::Gemini { model, .. } => model,
        }
    }

    /// Connection settings for building a backend.
    pub fn settings(&self) -> ProviderSettings {
        match self {
            BackendConfig::OpenAI {
                model,
                api_key,
                api_key_env,
                base_url,
                temperature,
                timeout_secs,
            }
            | BackendConfig::Gemini {
                model,
                api_key,
                api_key_env,
                base_url,
                temperature,
                timeout_secs,
            } => ProviderSettings {
                model: model.clone(),
                credentials: Credentials {
                    api_key: api_key.clone(),
                    env_var: api_key_env.clone(),
                },
                base_url: base_url.clone(),
                temperature: *temperature,
                timeout: Duration::from_secs(*timeout_secs),
            },
        }
    }
}

fn default_script_backend() -> BackendConfig {
    BackendConfig::OpenAI {
        model: default_openai_model(),
        api_key: None,
        api_key_env: default_openai_key_env(),
        base_url: default_openai_base_url(),
        temperature: default_temperature(),
        timeout_secs: default_timeout_secs(),
    }
}

fn default_topic_backend() -> BackendConfig {
    BackendConfig::Gemini {
        model: default_gemini_model(),
        api_key: None,
        api_key_env: default_gemini_key_env(),
        base_url: default_gemini_base_url(),
        temperature: default_temperature(),
        timeout_secs: default_timeout_secs(),
    }
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_openai_base_url() -> String {
    openai::DEFAULT_BASE_URL.to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_gemini_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_gemini_base_url() -> String {
    gemini::DEFAULT_BASE_URL.to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    60
}

/// Defaults applied when a request leaves an option out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Script length for the CLI.
    #[serde(default = "default_cli_length")]
    pub length: ScriptLength,
    /// Script length preselected in the web form.
    #[serde(default = "default_web_length")]
    pub web_length: ScriptLength,
    #[serde(default)]
    pub style: ScriptStyle,
    /// Directory the CLI writes scripts into.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_topic_count")]
    pub topic_count: u32,
    /// Request topic lists as structured JSON instead of free text.
    #[serde(default)]
    pub structured_topics: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            length: default_cli_length(),
            web_length: default_web_length(),
            style: ScriptStyle::default(),
            output_dir: default_output_dir(),
            topic_count: default_topic_count(),
            structured_topics: false,
        }
    }
}

fn default_cli_length() -> ScriptLength {
    ScriptLength::SixtySeconds
}

fn default_web_length() -> ScriptLength {
    ScriptLength::TenSeconds
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}

fn default_topic_count() -> u32 {
    10
}

/// Web form settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
        }
    }
}

fn default_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8501))
}

impl Config {
    /// Get the config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("scriptgen"))
            .context("Could not determine config directory")
    }

    /// Get the default config file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Resolve an optional override against the default location.
    pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::config_path(),
        }
    }

    /// Load configuration, using defaults if the file does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(path)?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(matches!(config.script_backend, BackendConfig::OpenAI { .. }));
        assert!(matches!(config.topic_backend, BackendConfig::Gemini { .. }));
        assert_eq!(config.defaults.length, ScriptLength::SixtySeconds);
        assert_eq!(config.defaults.web_length, ScriptLength::TenSeconds);
        assert_eq!(config.defaults.style, ScriptStyle::Educational);
        assert_eq!(config.server.addr.port(), 8501);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("openai"));
        assert!(toml.contains("gemini"));
        assert!(toml.contains("60 seconds"));
        assert!(!toml.contains("api_key ="));
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
[script_backend]
type = "gemini"
model = "gemini-1.5-pro"

[defaults]
length = "2 minutes"
style = "Dramatic"
structured_topics = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.script_backend.backend_type(), "gemini");
        assert_eq!(config.script_backend.model_name(), "gemini-1.5-pro");
        assert_eq!(config.topic_backend.model_name(), "gemini-2.0-flash");
        assert_eq!(config.defaults.length, ScriptLength::TwoMinutes);
        assert_eq!(config.defaults.style, ScriptStyle::Dramatic);
        assert!(config.defaults.structured_topics);
        assert_eq!(config.defaults.topic_count, 10);

        let settings = config.script_backend.settings();
        assert_eq!(settings.credentials.env_var, "GEMINI_API_KEY");
        assert_eq!(settings.base_url, gemini::DEFAULT_BASE_URL);
        assert_eq!(settings.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_unknown_length_is_rejected() {
        let toml = "[defaults]\nlength = \"3 hours\"\n";
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.defaults.topic_count, 10);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.defaults.topic_count = 5;
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.defaults.topic_count, 5);
        assert_eq!(loaded.script_backend.model_name(), "gpt-4o-mini");
    }
}
