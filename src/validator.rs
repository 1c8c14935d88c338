//! Turns raw model output into a typed [`AnalysisResult`].
//!
//! The completion text is untrusted: it is fence-stripped, parsed as JSON and
//! checked key by key before any typed conversion. Anything that does not
//! survive those steps is [`AppError::UpstreamMalformed`].

use std::str::FromStr;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::article::truncate_chars;
use crate::error::{AppError, Result};

pub const DEFAULT_CONFIDENCE: f64 = 0.85;

const REQUIRED_KEYS: [&str; 5] = [
    "main_topic",
    "key_findings",
    "techniques",
    "category",
    "summary",
];
const CATEGORY_KEYS: [&str; 4] = ["domain", "subcategory", "complexity", "article_type"];
const SUMMARY_KEYS: [&str; 2] = ["brief", "key_points"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Complexity {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ArticleType {
    Theory,
    Application,
    Survey,
    Tutorial,
}

impl FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Complexity::Beginner),
            "intermediate" => Ok(Complexity::Intermediate),
            "advanced" => Ok(Complexity::Advanced),
            other => Err(format!("unknown complexity '{}'", other)),
        }
    }
}

impl FromStr for ArticleType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "theory" => Ok(ArticleType::Theory),
            "application" => Ok(ArticleType::Application),
            "survey" => Ok(ArticleType::Survey),
            "tutorial" => Ok(ArticleType::Tutorial),
            other => Err(format!("unknown article_type '{}'", other)),
        }
    }
}

impl TryFrom<String> for Complexity {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for ArticleType {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub domain: String,
    pub subcategory: String,
    pub complexity: Complexity,
    pub article_type: ArticleType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryInfo {
    pub brief: String,
    pub key_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub main_topic: String,
    #[serde(default)]
    pub methodology: Option<String>,
    pub key_findings: Vec<String>,
    pub techniques: Vec<String>,
    pub category: CategoryInfo,
    pub summary: SummaryInfo,
    /// Reported next to the analysis in responses, not inside it.
    #[serde(skip, default = "default_confidence")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

/// Removes a leading ```` ```lang ```` and trailing ```` ``` ```` if present.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Parses sanitized completion text into a JSON object.
pub fn parse_payload(text: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(text).map_err(|e| {
        AppError::UpstreamMalformed(format!(
            "Failed to parse LLM response as JSON: {}. Response: {}",
            e,
            truncate_chars(text, 200)
        ))
    })?;

    if !value.is_object() {
        return Err(AppError::UpstreamMalformed(
            "LLM response is not a JSON object".to_string(),
        ));
    }
    Ok(value)
}

/// Structural check: every required key, nested ones included, is present.
pub fn validate_payload(payload: &Value) -> Result<()> {
    for key in REQUIRED_KEYS {
        if payload.get(key).is_none() {
            return Err(missing(key));
        }
    }
    for key in CATEGORY_KEYS {
        if payload["category"].get(key).is_none() {
            return Err(missing(&format!("category.{}", key)));
        }
    }
    for key in SUMMARY_KEYS {
        if payload["summary"].get(key).is_none() {
            return Err(missing(&format!("summary.{}", key)));
        }
    }
    Ok(())
}

fn missing(path: &str) -> AppError {
    AppError::UpstreamMalformed(format!("Missing required key in LLM response: {}", path))
}

/// Model-reported confidence clamped to [0, 1], or the default.
pub fn extract_confidence(payload: &Value) -> f64 {
    payload
        .get("confidence")
        .and_then(Value::as_f64)
        .filter(|c| c.is_finite())
        .map(|c| c.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_CONFIDENCE)
}

/// Typed conversion of an already validated payload.
pub fn to_result(payload: &Value) -> Result<AnalysisResult> {
    let mut result = AnalysisResult::deserialize(payload)
        .map_err(|e| AppError::UpstreamMalformed(format!("Invalid analysis payload: {}", e)))?;
    result.confidence = extract_confidence(payload);
    Ok(result)
}

/// Full pipeline over raw completion text.
pub fn validate(raw: &str) -> Result<(Value, AnalysisResult)> {
    let payload = parse_payload(strip_code_fences(raw))?;
    validate_payload(&payload)?;
    let result = to_result(&payload)?;
    Ok((payload, result))
}
