//! Generative-model client for the DashScope (Qwen) text-generation API.
//!
//! The response envelope is either `output.choices[0].message.content` or
//! the older `output.text`; both are accepted. Retrying after a parse
//! failure is left to the caller.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::AppConfig;
use crate::http_client::http_client;
use crate::models::Prediction;
use crate::prediction::{
    ModelConfig, OddsFormat, SYSTEM_PROMPT, build_explanation_prompt, build_prediction_prompt,
    parse_prediction, resolve_model,
};

#[derive(Debug, Clone)]
pub struct Explanation {
    pub explanation: String,
    pub model: String,
    pub timestamp: DateTime<Utc>,
}

/// Asks the model for a decimal-odds prediction over `match_context` and
/// parses the reply. `match_context` is the JSON the selector assembled:
/// fixture details plus versioned team statistics.
pub fn generate_prediction(
    cfg: &AppConfig,
    match_context: &Value,
    requested_model: Option<&str>,
    format: OddsFormat,
) -> Result<Prediction> {
    let model = resolve_model(requested_model);
    let prompt = build_prediction_prompt(match_context);
    let content = request_completion(cfg, &model, &prompt)?;
    let prediction = parse_prediction(&content, model.id, format)?;
    Ok(prediction)
}

/// Follow-up free-text explanation of an existing prediction.
pub fn generate_explanation(
    cfg: &AppConfig,
    match_context: &Value,
    prediction: &Prediction,
    question: Option<&str>,
    requested_model: Option<&str>,
) -> Result<Explanation> {
    let model = resolve_model(requested_model);
    let prompt = build_explanation_prompt(match_context, prediction, question);
    let content = request_completion(cfg, &model, &prompt)?;
    Ok(Explanation {
        explanation: content,
        model: model.id.to_string(),
        timestamp: Utc::now(),
    })
}

fn request_completion(cfg: &AppConfig, model: &ModelConfig, prompt: &str) -> Result<String> {
    let api_key = cfg.llm_api_key()?;

    let mut parameters = json!({ "result_format": "message" });
    if model.disable_thinking {
        parameters["enable_thinking"] = Value::Bool(false);
    }

    let payload = json!({
        "model": model.id,
        "input": {
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt }
            ]
        },
        "parameters": parameters
    });

    let client = http_client()?;
    let resp = client
        .post(&cfg.llm_api_base)
        .bearer_auth(api_key)
        .json(&payload)
        .send()
        .context("qwen api request failed")?;

    let status = resp.status();
    let body = resp.text().context("failed reading qwen api body")?;
    if !status.is_success() {
        let message = serde_json::from_str::<QwenError>(&body)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| status.to_string());
        return Err(anyhow!("Qwen API error: {message}"));
    }

    let envelope: QwenResponse = serde_json::from_str(&body).context("invalid qwen api json")?;
    extract_content(envelope)
}

fn extract_content(envelope: QwenResponse) -> Result<String> {
    let Some(output) = envelope.output else {
        return Err(anyhow!("No content found in Qwen API response"));
    };
    if let Some(content) = output
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .filter(|c| !c.is_empty())
    {
        return Ok(content);
    }
    output
        .text
        .filter(|t| !t.is_empty())
        .ok_or_else(|| anyhow!("No content found in Qwen API response"))
}

#[derive(Debug, Deserialize)]
struct QwenResponse {
    #[serde(default)]
    output: Option<QwenOutput>,
}

#[derive(Debug, Deserialize)]
struct QwenOutput {
    #[serde(default)]
    choices: Vec<QwenChoice>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QwenChoice {
    message: QwenMessage,
}

#[derive(Debug, Deserialize)]
struct QwenMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct QwenError {
    #[serde(default)]
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_content_wins_over_text() {
        let raw = r#"{"output":{"choices":[{"message":{"content":"{\"homeWin\":2.0}"}}],"text":"legacy"}}"#;
        let envelope: QwenResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(extract_content(envelope).unwrap(), "{\"homeWin\":2.0}");
    }

    #[test]
    fn legacy_text_field_is_accepted() {
        let raw = r#"{"output":{"text":"plain answer"}}"#;
        let envelope: QwenResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(extract_content(envelope).unwrap(), "plain answer");
    }

    #[test]
    fn missing_output_is_an_error() {
        let envelope: QwenResponse = serde_json::from_str("{}").unwrap();
        assert!(extract_content(envelope).is_err());
    }
}
