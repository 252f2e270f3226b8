use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixture identifier. Live API-Football fixtures carry numeric ids; bundled
/// sample fixtures carry string tags like "sample-epl-001". The numeric vs
/// non-numeric shape is the sole discriminator for "is this sample data".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FixtureId {
    Numeric(u64),
    Tag(String),
}

impl FixtureId {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<u64>() {
            Ok(id) => Self::Numeric(id),
            Err(_) => Self::Tag(raw.trim().to_string()),
        }
    }

    pub fn numeric(&self) -> Option<u64> {
        match self {
            Self::Numeric(id) => Some(*id),
            Self::Tag(tag) => tag.parse::<u64>().ok(),
        }
    }

    pub fn is_sample(&self) -> bool {
        self.numeric().is_none()
    }
}

impl fmt::Display for FixtureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Tag(tag) => f.write_str(tag),
        }
    }
}

/// One scheduled match, in the API-Football envelope shape. The bundled
/// sample fixtures use the same layout so both sources deserialize here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub fixture: FixtureMeta,
    pub league: LeagueMeta,
    pub teams: FixtureTeams,
    #[serde(default)]
    pub goals: Option<FixtureGoals>,
}

impl Fixture {
    pub fn home_name(&self) -> &str {
        &self.teams.home.name
    }

    pub fn away_name(&self) -> &str {
        &self.teams.away.name
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureMeta {
    pub id: FixtureId,
    pub date: String,
    #[serde(default)]
    pub venue: Option<Venue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueMeta {
    pub id: u32,
    pub name: String,
    pub season: u32,
    #[serde(default)]
    pub round: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureTeams {
    pub home: TeamRef,
    pub away: TeamRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRef {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FixtureGoals {
    #[serde(default)]
    pub home: Option<u8>,
    #[serde(default)]
    pub away: Option<u8>,
}

/// 1X2 odds in decimal form, the canonical representation at rest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OddsSet {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
}

/// A single odds value as produced by the model: either decimal odds or a
/// signed moneyline string. Normalized by the prediction parser according to
/// the caller's format policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OddsValue {
    Decimal(f64),
    Moneyline(String),
}

impl OddsValue {
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Self::Decimal(value) => Some(*value),
            Self::Moneyline(raw) => crate::odds::american_to_decimal(raw),
        }
    }
}

/// Model-generated odds prediction. Immutable once produced; lives for a
/// single request/response cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub home_win: OddsValue,
    pub draw: OddsValue,
    pub away_win: OddsValue,
    pub confidence: f64,
    pub reasoning: String,
    pub model: String,
    pub timestamp: DateTime<Utc>,
}

impl Prediction {
    /// Collapses the three outcome fields into a decimal odds set, if all of
    /// them convert.
    pub fn decimal_odds(&self) -> Option<OddsSet> {
        Some(OddsSet {
            home_win: self.home_win.as_decimal()?,
            draw: self.draw.as_decimal()?,
            away_win: self.away_win.as_decimal()?,
        })
    }
}

/// Bookmaker odds for one fixture, as stored in the bundled sample set and
/// as distilled from the live odds endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmakerOdds {
    pub bookmaker: String,
    pub odds: OddsSet,
}

/// Season record summary shown in prompts and stats panels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSeasonSummary {
    pub season: u32,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub form: Option<String>,
    pub goals_for: u32,
    pub goals_against: u32,
    /// "12W-8D-18L" style record string.
    pub record: String,
}

/// Versioned team statistics: the last completed season plus a pre-match
/// partial record for the current season. The pre-match half may be absent
/// when the source has nothing before kickoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionedTeamStats {
    #[serde(default)]
    pub season_completed: Option<TeamSeasonSummary>,
    #[serde(default)]
    pub season_pre_match: Option<TeamSeasonSummary>,
}

/// Standard `{ "response": [...] }` envelope every API-Football endpoint
/// returns.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub response: Vec<T>,
}
