//! Errors reported by the LLM backends.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    /// No key in the config file or the environment. Raised before any request.
    #[error(
        "{provider} API key not found. Set the {env_var} environment variable \
         or add api_key to the config file."
    )]
    MissingApiKey {
        provider: &'static str,
        env_var: String,
    },

    #[error("{provider} API request failed with status {status}: {message}")]
    Api {
        provider: &'static str,
        status: StatusCode,
        message: String,
    },

    #[error("Failed to connect to {provider} API: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse {provider} response: {source}")]
    Decode {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned output that does not match the topic list schema: {source}")]
    Schema {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Empty response from {provider}")]
    Empty { provider: &'static str },

    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl LlmError {
    /// Whether this error means no credentials were available.
    pub fn is_missing_credentials(&self) -> bool {
        matches!(self, LlmError::MissingApiKey { .. })
    }

    /// A troubleshooting hint for provider HTTP errors, if one applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            LlmError::Api { status, .. } => status_hint(*status),
            _ => None,
        }
    }
}

/// Human-readable meaning of the status codes providers use for account problems.
pub fn status_hint(status: StatusCode) -> Option<&'static str> {
    match status.as_u16() {
        401 => Some("Authentication failed - check your API key"),
        402 => Some("Payment required - check your billing"),
        403 => Some("Access forbidden - check your API key permissions"),
        429 => Some("Rate limit exceeded or quota exceeded"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_hints() {
        assert!(status_hint(StatusCode::UNAUTHORIZED).unwrap().contains("API key"));
        assert!(status_hint(StatusCode::PAYMENT_REQUIRED).unwrap().contains("billing"));
        assert!(status_hint(StatusCode::FORBIDDEN).unwrap().contains("permissions"));
        assert!(status_hint(StatusCode::TOO_MANY_REQUESTS).unwrap().contains("Rate limit"));
        assert_eq!(status_hint(StatusCode::INTERNAL_SERVER_ERROR), None);
    }

    #[test]
    fn test_hint_only_for_api_errors() {
        let err = LlmError::Api {
            provider: "OpenAI",
            status: StatusCode::TOO_MANY_REQUESTS,
            message: "slow down".into(),
        };
        assert!(err.hint().is_some());
        assert!(!err.is_missing_credentials());

        let err = LlmError::MissingApiKey {
            provider: "Gemini",
            env_var: "GEMINI_API_KEY".into(),
        };
        assert!(err.hint().is_none());
        assert!(err.is_missing_credentials());
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
