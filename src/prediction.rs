//! Turning free-form model output into a structured odds prediction.
//!
//! Models are asked for a bare JSON object but routinely wrap it in
//! commentary, so the parser locates the first brace-delimited span and only
//! then attempts a strict JSON parse.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::models::{OddsValue, Prediction};
use crate::odds;

/// Greedy match keeps everything between the first `{` and the last `}`,
/// which survives nested objects inside the span.
static JSON_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[\s\S]*\}").expect("valid regex"));

const SNIPPET_LEN: usize = 200;

#[derive(Debug, Error, PartialEq)]
pub enum PredictionParseError {
    #[error("Model returned an empty response. Please try again.")]
    EmptyResponse,
    #[error("Qwen rate limit reached. Wait a moment or choose a different model.")]
    RateLimited,
    #[error("Model response did not contain JSON. Please retry or switch models.")]
    NoJson,
    #[error("Model response was not valid JSON. Please retry or switch models.")]
    InvalidJson,
}

/// Which representation the caller wants the three odds fields in. The
/// parser itself has no preference; normalization is caller policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OddsFormat {
    Decimal,
    Moneyline,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPrediction {
    home_win: OddsValue,
    draw: OddsValue,
    away_win: OddsValue,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    reasoning: Option<String>,
}

/// Model identifiers this crate knows how to drive. `disable_thinking` maps
/// to the DashScope `enable_thinking: false` parameter, needed for the small
/// models that otherwise stream reasoning tokens instead of an answer.
#[derive(Debug, Clone, Copy)]
pub struct ModelConfig {
    pub id: &'static str,
    pub disable_thinking: bool,
}

pub const MODEL_CONFIGS: &[ModelConfig] = &[
    ModelConfig {
        id: "qwen-turbo",
        disable_thinking: false,
    },
    ModelConfig {
        id: "qwen3-max",
        disable_thinking: false,
    },
    ModelConfig {
        id: "qwen3-8b",
        disable_thinking: true,
    },
];

pub const DEFAULT_MODEL: &str = "qwen3-8b";

/// Unknown model names fall back to the default rather than failing the
/// request.
pub fn resolve_model(requested: Option<&str>) -> ModelConfig {
    let wanted = requested.unwrap_or(DEFAULT_MODEL);
    MODEL_CONFIGS
        .iter()
        .copied()
        .find(|m| m.id == wanted)
        .unwrap_or_else(|| {
            MODEL_CONFIGS
                .iter()
                .copied()
                .find(|m| m.id == DEFAULT_MODEL)
                .expect("default model present in table")
        })
}

/// Extracts and parses the prediction object from raw model output, then
/// normalizes the odds fields to `format`.
pub fn parse_prediction(
    content: &str,
    model: &str,
    format: OddsFormat,
) -> Result<Prediction, PredictionParseError> {
    let raw = parse_model_json(content)?;

    Ok(Prediction {
        home_win: normalize_field(raw.home_win, format),
        draw: normalize_field(raw.draw, format),
        away_win: normalize_field(raw.away_win, format),
        confidence: raw.confidence.unwrap_or(0.0),
        reasoning: raw.reasoning.unwrap_or_default(),
        model: model.to_string(),
        timestamp: Utc::now(),
    })
}

fn parse_model_json(content: &str) -> Result<RawPrediction, PredictionParseError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(PredictionParseError::EmptyResponse);
    }
    // DashScope reports rate limiting as plain text, not an HTTP error.
    if trimmed
        .get(..8)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("too many"))
    {
        return Err(PredictionParseError::RateLimited);
    }

    let Some(span) = JSON_SPAN.find(trimmed) else {
        return Err(PredictionParseError::NoJson);
    };

    serde_json::from_str::<RawPrediction>(span.as_str()).map_err(|err| {
        let snippet: String = trimmed.chars().take(SNIPPET_LEN).collect();
        warn!("failed to parse model JSON: {err}; raw snippet: {snippet}");
        PredictionParseError::InvalidJson
    })
}

fn normalize_field(value: OddsValue, format: OddsFormat) -> OddsValue {
    match (format, value) {
        (OddsFormat::Decimal, OddsValue::Moneyline(raw)) => {
            match odds::american_to_decimal(&raw) {
                Some(decimal) => OddsValue::Decimal(decimal),
                None => OddsValue::Moneyline(raw),
            }
        }
        (OddsFormat::Moneyline, OddsValue::Decimal(decimal)) => {
            match odds::decimal_to_american(decimal) {
                Some(moneyline) => OddsValue::Moneyline(moneyline),
                None => OddsValue::Decimal(decimal),
            }
        }
        (_, value) => value,
    }
}

/// Prompt asking for a decimal-odds prediction over the supplied match
/// context. The context is pre-serialized JSON (fixture plus versioned team
/// stats) so the model sees exactly what the engine saw.
pub fn build_prediction_prompt(match_context: &serde_json::Value) -> String {
    format!(
        r#"You are a sports betting analyst. Analyze the provided Premier League match using ONLY the statistics supplied below.
Rules:
1. Do NOT use online search, browsing tools, or any external knowledge of actual bookmaker odds or final match outcomes.
2. Base your reasoning strictly on the completed-season and pre-match statistics that stop before kickoff.
3. Return decimal odds only.

Match context:
{context}

Respond with JSON in this exact shape:
{{
  "homeWin": <decimal odds>,
  "draw": <decimal odds>,
  "awayWin": <decimal odds>,
  "confidence": <percentage>,
  "reasoning": "<brief explanation>"
}}"#,
        context = serde_json::to_string_pretty(match_context).unwrap_or_default()
    )
}

/// Follow-up prompt asking the model to explain a prediction it already made.
/// Free-text answer, no JSON expected.
pub fn build_explanation_prompt(
    match_context: &serde_json::Value,
    prediction: &Prediction,
    question: Option<&str>,
) -> String {
    format!(
        r#"You previously produced the decimal odds below for this Premier League match. The user now wants deeper insight using ONLY the historical stats provided (no web searches or bookmaker data). Reference the prediction values explicitly.

Match context:
{context}

Your prediction:
{prediction}

User question: {question}

Respond with concise paragraphs (no JSON) that answer the user question and include:
1. Key statistical drivers for each outcome.
2. Why the specific odds values make sense relative to each other.
3. Any caveats or data limitations."#,
        context = serde_json::to_string_pretty(match_context).unwrap_or_default(),
        prediction = serde_json::to_string_pretty(prediction).unwrap_or_default(),
        question = question.unwrap_or("Explain the prediction in more detail.")
    )
}

pub const SYSTEM_PROMPT: &str = "You are a professional sports betting analyst with expertise in Premier League football. Provide accurate, data-driven odds predictions.";
