//! Request and response types shared by the CLI and the web form.
//!
//! Option enums carry the human-readable labels the model sees in the prompt
//! ("60 seconds", "Educational"), so the same string works on the command line,
//! in a form field and in the config file.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

/// Topic counts the form accepts.
pub const TOPIC_COUNT_RANGE: RangeInclusive<u32> = 1..=20;

/// Target spoken length of a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum ScriptLength {
    #[serde(rename = "5 seconds")]
    #[value(name = "5 seconds", alias = "5s")]
    FiveSeconds,
    #[serde(rename = "10 seconds")]
    #[value(name = "10 seconds", alias = "10s")]
    TenSeconds,
    #[serde(rename = "15 seconds")]
    #[value(name = "15 seconds", alias = "15s")]
    FifteenSeconds,
    #[serde(rename = "30 seconds")]
    #[value(name = "30 seconds", alias = "30s")]
    ThirtySeconds,
    #[serde(rename = "60 seconds")]
    #[value(name = "60 seconds", alias = "60s")]
    SixtySeconds,
    #[serde(rename = "90 seconds")]
    #[value(name = "90 seconds", alias = "90s")]
    NinetySeconds,
    #[serde(rename = "2 minutes")]
    #[value(name = "2 minutes", alias = "2m")]
    TwoMinutes,
}

impl ScriptLength {
    pub const ALL: [ScriptLength; 7] = [
        ScriptLength::FiveSeconds,
        ScriptLength::TenSeconds,
        ScriptLength::FifteenSeconds,
        ScriptLength::ThirtySeconds,
        ScriptLength::SixtySeconds,
        ScriptLength::NinetySeconds,
        ScriptLength::TwoMinutes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ScriptLength::FiveSeconds => "5 seconds",
            ScriptLength::TenSeconds => "10 seconds",
            ScriptLength::FifteenSeconds => "15 seconds",
            ScriptLength::ThirtySeconds => "30 seconds",
            ScriptLength::SixtySeconds => "60 seconds",
            ScriptLength::NinetySeconds => "90 seconds",
            ScriptLength::TwoMinutes => "2 minutes",
        }
    }
}

impl fmt::Display for ScriptLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tone of a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum ScriptStyle {
    #[default]
    Educational,
    Entertainment,
    Professional,
    Casual,
    Dramatic,
}

impl ScriptStyle {
    pub const ALL: [ScriptStyle; 5] = [
        ScriptStyle::Educational,
        ScriptStyle::Entertainment,
        ScriptStyle::Professional,
        ScriptStyle::Casual,
        ScriptStyle::Dramatic,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ScriptStyle::Educational => "Educational",
            ScriptStyle::Entertainment => "Entertainment",
            ScriptStyle::Professional => "Professional",
            ScriptStyle::Casual => "Casual",
            ScriptStyle::Dramatic => "Dramatic",
        }
    }
}

impl fmt::Display for ScriptStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Content category for topic generation.
///
/// The web form only offers the listed niches; the CLI also accepts any
/// free-text niche as [`Niche::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Niche {
    #[default]
    AiTools,
    TechNews,
    PersonalFinance,
    Motivation,
    HealthFitness,
    History,
    ScienceFacts,
    Travel,
    Custom(String),
}

impl Niche {
    pub const LISTED: [Niche; 8] = [
        Niche::AiTools,
        Niche::TechNews,
        Niche::PersonalFinance,
        Niche::Motivation,
        Niche::HealthFitness,
        Niche::History,
        Niche::ScienceFacts,
        Niche::Travel,
    ];

    pub fn label(&self) -> &str {
        match self {
            Niche::AiTools => "AI Tools",
            Niche::TechNews => "Tech News",
            Niche::PersonalFinance => "Personal Finance",
            Niche::Motivation => "Motivation",
            Niche::HealthFitness => "Health & Fitness",
            Niche::History => "History",
            Niche::ScienceFacts => "Science Facts",
            Niche::Travel => "Travel",
            Niche::Custom(label) => label,
        }
    }

    /// Look up one of the listed niches by label, ignoring case.
    pub fn listed(label: &str) -> Option<Niche> {
        let label = label.trim();
        Self::LISTED
            .into_iter()
            .find(|niche| niche.label().eq_ignore_ascii_case(label))
    }
}

impl FromStr for Niche {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(RequestError::EmptyNiche);
        }
        Ok(Self::listed(trimmed).unwrap_or_else(|| Niche::Custom(trimmed.to_string())))
    }
}

impl fmt::Display for Niche {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Invalid user input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Please enter a prompt for script generation.")]
    EmptyPrompt,
    #[error("Please choose a niche for topic generation.")]
    EmptyNiche,
    #[error("Unknown niche: {0}")]
    UnknownNiche(String),
    #[error("Topic count must be between {min} and {max}, got {count}")]
    CountOutOfRange { count: u32, min: u32, max: u32 },
}

/// A request for one video script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRequest {
    /// The video idea or topic, as typed by the user.
    pub prompt: String,
    pub length: ScriptLength,
    pub style: ScriptStyle,
}

impl ScriptRequest {
    pub fn new(
        prompt: impl Into<String>,
        length: ScriptLength,
        style: ScriptStyle,
    ) -> Result<Self, RequestError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(RequestError::EmptyPrompt);
        }
        Ok(Self {
            prompt,
            length,
            style,
        })
    }
}

/// A request for a numbered list of video topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRequest {
    pub niche: Niche,
    pub count: u32,
}

impl TopicRequest {
    pub fn new(niche: Niche, count: u32) -> Result<Self, RequestError> {
        if !TOPIC_COUNT_RANGE.contains(&count) {
            return Err(RequestError::CountOutOfRange {
                count,
                min: *TOPIC_COUNT_RANGE.start(),
                max: *TOPIC_COUNT_RANGE.end(),
            });
        }
        Ok(Self { niche, count })
    }
}

/// JSON body returned by the web API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The generated text, if successful.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Labeled topic lines, for topic requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    /// Error message, if the request failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerateResponse {
    pub fn script(text: String) -> Self {
        Self {
            text: Some(text),
            topics: None,
            error: None,
        }
    }

    pub fn topics(topics: Vec<String>) -> Self {
        Self {
            text: Some(topics.join("\n")),
            topics: Some(topics),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            text: None,
            topics: None,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_labels_round_trip_through_serde() {
        for length in ScriptLength::ALL {
            let json = serde_json::to_string(&length).unwrap();
            assert_eq!(json, format!("\"{}\"", length.label()));
            let parsed: ScriptLength = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, length);
        }
    }

    #[test]
    fn test_length_accepts_short_alias() {
        let parsed = ScriptLength::from_str("60s", true).unwrap();
        assert_eq!(parsed, ScriptLength::SixtySeconds);
        let parsed = ScriptLength::from_str("2 minutes", false).unwrap();
        assert_eq!(parsed, ScriptLength::TwoMinutes);
    }

    #[test]
    fn test_style_rejects_unknown_value() {
        assert!(ScriptStyle::from_str("Sarcastic", true).is_err());
        assert!(serde_json::from_str::<ScriptStyle>("\"Sarcastic\"").is_err());
    }

    #[test]
    fn test_niche_parses_listed_and_custom() {
        assert_eq!("health & fitness".parse::<Niche>().unwrap(), Niche::HealthFitness);
        assert_eq!(
            " Retro Gaming ".parse::<Niche>().unwrap(),
            Niche::Custom("Retro Gaming".to_string())
        );
        assert_eq!("   ".parse::<Niche>(), Err(RequestError::EmptyNiche));
        assert_eq!(Niche::listed("Retro Gaming"), None);
    }

    #[test]
    fn test_script_request_rejects_blank_prompt() {
        let err = ScriptRequest::new("  \n", ScriptLength::TenSeconds, ScriptStyle::Casual)
            .unwrap_err();
        assert_eq!(err, RequestError::EmptyPrompt);
    }

    #[test]
    fn test_topic_request_enforces_count_range() {
        assert!(TopicRequest::new(Niche::History, 1).is_ok());
        assert!(TopicRequest::new(Niche::History, 20).is_ok());
        assert!(matches!(
            TopicRequest::new(Niche::History, 0),
            Err(RequestError::CountOutOfRange { count: 0, .. })
        ));
        assert!(TopicRequest::new(Niche::History, 21).is_err());
    }

    #[test]
    fn test_generate_response_topics() {
        let resp = GenerateResponse::topics(vec!["Topic 1: a".into(), "Topic 2: b".into()]);
        assert_eq!(resp.text.as_deref(), Some("Topic 1: a\nTopic 2: b"));
        assert!(resp.error.is_none());
        let json = serde_json::to_string(&GenerateResponse::error("boom")).unwrap();
        assert_eq!(json, r#"{"error":"boom"}"#);
    }
}
