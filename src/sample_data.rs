//! Bundled historical sample dataset, embedded at compile time and parsed
//! once into an immutable process-wide handle.
//!
//! Three collections: fixtures, bookmaker odds keyed by fixture id, and
//! versioned team statistics keyed by team id. An odds index keyed by the
//! home/away team-name pair is derived at load time so odds can still be
//! cross-referenced when live and sample fixture ids disagree.

use std::collections::HashMap;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;

use crate::models::{BookmakerOdds, Fixture, VersionedTeamStats};

const SAMPLE_FIXTURES_JSON: &str = include_str!("../data/sample_fixtures.json");
const SAMPLE_ODDS_JSON: &str = include_str!("../data/sample_odds.json");
const SAMPLE_TEAM_STATS_JSON: &str = include_str!("../data/sample_team_stats.json");

static SAMPLE: OnceCell<SampleData> = OnceCell::new();

#[derive(Debug)]
pub struct SampleData {
    fixtures: Vec<Fixture>,
    odds_by_fixture: HashMap<String, BookmakerOdds>,
    odds_by_teams: HashMap<String, BookmakerOdds>,
    stats_by_team: HashMap<u32, VersionedTeamStats>,
}

/// Read-only handle to the parsed dataset. Loaded on first use; no writers
/// after that.
pub fn sample_data() -> Result<&'static SampleData> {
    SAMPLE.get_or_try_init(SampleData::load)
}

impl SampleData {
    fn load() -> Result<Self> {
        let fixtures: Vec<Fixture> =
            serde_json::from_str(SAMPLE_FIXTURES_JSON).context("invalid sample fixtures json")?;
        let odds_by_fixture: HashMap<String, BookmakerOdds> =
            serde_json::from_str(SAMPLE_ODDS_JSON).context("invalid sample odds json")?;
        let raw_stats: HashMap<String, VersionedTeamStats> =
            serde_json::from_str(SAMPLE_TEAM_STATS_JSON)
                .context("invalid sample team stats json")?;

        let mut stats_by_team = HashMap::new();
        for (team_id, stats) in raw_stats {
            let id = team_id
                .parse::<u32>()
                .with_context(|| format!("non-numeric team id in sample stats: {team_id}"))?;
            stats_by_team.insert(id, stats);
        }

        // Join odds to fixtures so a live fixture with a different id can
        // still find the sample entry for the same pairing.
        let mut odds_by_teams = HashMap::new();
        for fixture in &fixtures {
            let fixture_id = fixture.fixture.id.to_string();
            if let Some(entry) = odds_by_fixture.get(&fixture_id) {
                odds_by_teams.insert(
                    team_key(fixture.home_name(), fixture.away_name()),
                    entry.clone(),
                );
            }
        }

        Ok(Self {
            fixtures,
            odds_by_fixture,
            odds_by_teams,
            stats_by_team,
        })
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn fixture_by_id(&self, id: &str) -> Option<&Fixture> {
        self.fixtures
            .iter()
            .find(|f| f.fixture.id.to_string() == id)
    }

    pub fn odds_by_fixture_id(&self, id: &str) -> Option<&BookmakerOdds> {
        self.odds_by_fixture.get(id)
    }

    pub fn odds_by_team_names(&self, home: &str, away: &str) -> Option<&BookmakerOdds> {
        self.odds_by_teams.get(&team_key(home, away))
    }

    pub fn team_stats(&self, team_id: u32) -> Option<&VersionedTeamStats> {
        self.stats_by_team.get(&team_id)
    }
}

fn team_key(home: &str, away: &str) -> String {
    format!(
        "{}|{}",
        home.trim().to_lowercase(),
        away.trim().to_lowercase()
    )
}
