//! Live sports-data client for API-Football (api-sports.io v3).
//!
//! Every endpoint answers with a `{ "response": [...] }` envelope and
//! authenticates via the `x-apisports-key` header. Errors carry the HTTP
//! status plus a body snippet; nothing is retried here.

use anyhow::{Context, Result, anyhow};
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use serde_json::Value;

use crate::config::AppConfig;
use crate::http_client::{USER_AGENT_STRING, http_client};
use crate::models::{ApiEnvelope, BookmakerOdds, Fixture, OddsSet};

const ERROR_SNIPPET_LEN: usize = 220;

/// Optional filters for the fixtures listing; mirrors the query parameters
/// the upstream endpoint accepts.
#[derive(Debug, Clone, Default)]
pub struct FixtureQuery {
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub next: Option<u32>,
}

pub fn fetch_fixtures(cfg: &AppConfig, query: &FixtureQuery) -> Result<Vec<Fixture>> {
    let mut params = vec![
        ("league".to_string(), cfg.league_id.to_string()),
        ("season".to_string(), cfg.season.to_string()),
    ];
    if let Some(date) = query.date.as_deref() {
        params.push(("date".to_string(), date.to_string()));
    } else if query.from.is_some() || query.to.is_some() {
        if let Some(from) = query.from.as_deref() {
            params.push(("from".to_string(), from.to_string()));
        }
        if let Some(to) = query.to.as_deref() {
            params.push(("to".to_string(), to.to_string()));
        }
    } else {
        let next = query.next.unwrap_or(10);
        params.push(("next".to_string(), next.to_string()));
    }

    let envelope: ApiEnvelope<Fixture> = get_json(cfg, "/fixtures", &params)?;
    Ok(envelope.response)
}

pub fn fetch_fixture_by_id(cfg: &AppConfig, id: u64) -> Result<Option<Fixture>> {
    let params = vec![("id".to_string(), id.to_string())];
    let envelope: ApiEnvelope<Fixture> = get_json(cfg, "/fixtures", &params)?;
    Ok(envelope.response.into_iter().next())
}

pub fn fetch_standings(cfg: &AppConfig) -> Result<Vec<StandingRow>> {
    let params = vec![
        ("league".to_string(), cfg.league_id.to_string()),
        ("season".to_string(), cfg.season.to_string()),
    ];
    let envelope: ApiEnvelope<StandingsEntry> = get_json(cfg, "/standings", &params)?;
    let mut rows = Vec::new();
    for entry in envelope.response {
        for group in entry.league.standings {
            rows.extend(group);
        }
    }
    Ok(rows)
}

pub fn fetch_team_statistics(
    cfg: &AppConfig,
    team_id: u32,
    season: u32,
) -> Result<Option<TeamStatistics>> {
    let params = vec![
        ("team".to_string(), team_id.to_string()),
        ("league".to_string(), cfg.league_id.to_string()),
        ("season".to_string(), season.to_string()),
    ];
    // This endpoint wraps a single object rather than an array.
    let body: Value = get_json(cfg, "/teams/statistics", &params)?;
    let response = body.get("response").cloned().unwrap_or(Value::Null);
    if response.is_null() || response.as_object().is_some_and(|o| o.is_empty()) {
        return Ok(None);
    }
    let stats: TeamStatistics =
        serde_json::from_value(response).context("invalid team statistics json")?;
    Ok(Some(stats))
}

/// Fetches 1X2 odds for one fixture and distills the first bookmaker's
/// match-winner market into a decimal odds set.
pub fn fetch_odds(cfg: &AppConfig, fixture_id: u64) -> Result<Option<BookmakerOdds>> {
    let params = vec![("fixture".to_string(), fixture_id.to_string())];
    let envelope: ApiEnvelope<OddsResponse> = get_json(cfg, "/odds", &params)?;

    for entry in envelope.response {
        for bookmaker in entry.bookmakers {
            let Some(bet) = bookmaker
                .bets
                .iter()
                .find(|b| b.name.eq_ignore_ascii_case("Match Winner"))
            else {
                continue;
            };
            if let Some(odds) = extract_match_winner(&bet.values) {
                return Ok(Some(BookmakerOdds {
                    bookmaker: bookmaker.name,
                    odds,
                }));
            }
        }
    }
    Ok(None)
}

fn extract_match_winner(values: &[OddsBetValue]) -> Option<OddsSet> {
    let mut home = None;
    let mut draw = None;
    let mut away = None;
    for value in values {
        let Ok(price) = value.odd.trim().parse::<f64>() else {
            continue;
        };
        match value.value.to_ascii_lowercase().as_str() {
            "home" | "1" => home = Some(price),
            "draw" | "x" => draw = Some(price),
            "away" | "2" => away = Some(price),
            _ => {}
        }
    }
    match (home, draw, away) {
        (Some(home_win), Some(draw), Some(away_win)) => Some(OddsSet {
            home_win,
            draw,
            away_win,
        }),
        _ => None,
    }
}

fn get_json<T: serde::de::DeserializeOwned>(
    cfg: &AppConfig,
    endpoint: &str,
    params: &[(String, String)],
) -> Result<T> {
    let api_key = cfg.football_api_key()?;
    let url = format!("{}{endpoint}", cfg.football_api_base);

    let client = http_client()?;
    let resp = client
        .get(&url)
        .query(params)
        .header("x-apisports-key", api_key)
        .header(USER_AGENT, USER_AGENT_STRING)
        .send()
        .with_context(|| format!("football api request failed: {endpoint}"))?;

    let status = resp.status();
    let body = resp.text().context("failed reading football api body")?;
    if !status.is_success() {
        let snippet = body
            .trim()
            .replace(['\n', '\r'], " ")
            .chars()
            .take(ERROR_SNIPPET_LEN)
            .collect::<String>();
        return Err(anyhow!("Football API error: {status} {snippet}"));
    }

    serde_json::from_str(&body).with_context(|| format!("invalid football api json: {endpoint}"))
}

#[derive(Debug, Deserialize)]
struct StandingsEntry {
    league: StandingsLeague,
}

#[derive(Debug, Deserialize)]
struct StandingsLeague {
    #[serde(default)]
    standings: Vec<Vec<StandingRow>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StandingRow {
    pub rank: u32,
    pub team: StandingTeam,
    #[serde(default)]
    pub form: Option<String>,
    pub points: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StandingTeam {
    pub id: u32,
    pub name: String,
}

/// The slice of the `/teams/statistics` payload the engine cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamStatistics {
    #[serde(default)]
    pub form: Option<String>,
    pub fixtures: StatFixtures,
    pub goals: StatGoals,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatFixtures {
    pub wins: StatTotal,
    pub draws: StatTotal,
    pub loses: StatTotal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatTotal {
    #[serde(default)]
    pub total: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatGoals {
    #[serde(rename = "for")]
    pub goals_for: StatGoalSide,
    pub against: StatGoalSide,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatGoalSide {
    pub total: StatTotal,
}

#[derive(Debug, Deserialize)]
struct OddsResponse {
    #[serde(default)]
    bookmakers: Vec<OddsBookmaker>,
}

#[derive(Debug, Deserialize)]
struct OddsBookmaker {
    name: String,
    #[serde(default)]
    bets: Vec<OddsBet>,
}

#[derive(Debug, Deserialize)]
struct OddsBet {
    name: String,
    #[serde(default)]
    values: Vec<OddsBetValue>,
}

#[derive(Debug, Deserialize)]
struct OddsBetValue {
    value: String,
    odd: String,
}
