use std::env;

use anyhow::{Result, anyhow};
use chrono::{Datelike, Utc};

const DEFAULT_FOOTBALL_API_BASE: &str = "https://v3.football.api-sports.io";
const DEFAULT_LLM_API_BASE: &str =
    "https://dashscope.aliyuncs.com/api/v1/services/aigc/text-generation/generation";

// Premier League in API-Football.
const DEFAULT_LEAGUE_ID: u32 = 39;

/// Placeholder values shipped in .env.example; treated the same as unset.
const KEY_PLACEHOLDERS: &[&str] = &["your_api_football_key_here", "your_qwen_api_key_here"];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub football_api_base: String,
    pub football_api_key: Option<String>,
    pub llm_api_base: String,
    pub llm_api_key: Option<String>,
    pub league_id: u32,
    pub season: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let football_api_base = env::var("FOOTBALL_API_BASE")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_FOOTBALL_API_BASE.to_string());
        let football_api_key = env_key("FOOTBALL_API_KEY");
        let llm_api_base = env::var("QWEN_API_BASE")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_LLM_API_BASE.to_string());
        let llm_api_key = env_key("QWEN_API_KEY");
        let league_id = env::var("FOOTBALL_LEAGUE_ID")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_LEAGUE_ID);
        let season = env::var("FOOTBALL_SEASON")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or_else(|| Utc::now().year() as u32);

        Self {
            football_api_base,
            football_api_key,
            llm_api_base,
            llm_api_key,
            league_id,
            season,
        }
    }

    pub fn has_football_api_key(&self) -> bool {
        self.football_api_key.is_some()
    }

    pub fn has_llm_api_key(&self) -> bool {
        self.llm_api_key.is_some()
    }

    pub fn football_api_key(&self) -> Result<&str> {
        self.football_api_key.as_deref().ok_or_else(|| {
            anyhow!("Football API key not configured. Please set FOOTBALL_API_KEY in .env file")
        })
    }

    pub fn llm_api_key(&self) -> Result<&str> {
        self.llm_api_key.as_deref().ok_or_else(|| {
            anyhow!("Qwen API key not configured. Please set QWEN_API_KEY in .env file")
        })
    }
}

fn env_key(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && !KEY_PLACEHOLDERS.contains(&s.as_str()))
}
