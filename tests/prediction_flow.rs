//! End-to-end engine flow over the bundled sample data: resolve a fixture,
//! parse a canned model response, and compare it against the sample
//! bookmaker odds. No network access anywhere.

use odds_lab::compare::{Outcome, compare_odds};
use odds_lab::config::AppConfig;
use odds_lab::models::FixtureId;
use odds_lab::prediction::{OddsFormat, parse_prediction};
use odds_lab::selector::{self, DataSource, FixtureFilters};

fn offline_config() -> AppConfig {
    AppConfig {
        football_api_base: "http://127.0.0.1:9".to_string(),
        football_api_key: None,
        llm_api_base: "http://127.0.0.1:9".to_string(),
        llm_api_key: None,
        league_id: 39,
        season: 2022,
    }
}

#[test]
fn sample_fixture_predict_and_compare_round() {
    let cfg = offline_config();

    let lookup = selector::get_fixture(&cfg, &FixtureId::parse("sample-epl-001"))
        .expect("selector should not fail")
        .expect("bundled fixture exists");
    assert_eq!(lookup.source, DataSource::Sample);
    let fixture = lookup.fixture;

    let home_stats = selector::get_team_statistics(&cfg, fixture.teams.home.id).unwrap();
    let away_stats = selector::get_team_statistics(&cfg, fixture.teams.away.id).unwrap();
    let context =
        selector::build_match_context(&fixture, home_stats.as_ref(), away_stats.as_ref());
    assert_eq!(context["homeTeam"], "Crystal Palace");

    // Stand-in for the live model call.
    let content = r#"{"homeWin":4.5,"draw":3.6,"awayWin":1.9,"confidence":70,"reasoning":"away favorite"}"#;
    let prediction = parse_prediction(content, "qwen3-8b", OddsFormat::Decimal).unwrap();

    let odds_lookup = selector::get_odds(&cfg, &fixture).unwrap();
    let bookmaker = odds_lookup.odds.expect("sample odds exist for 001");
    assert_eq!(odds_lookup.source, Some(DataSource::Sample));

    let predicted = prediction.decimal_odds().expect("all fields decimal");
    let result = compare_odds(Some(&predicted), Some(&bookmaker.odds)).unwrap();
    // Draw matches exactly (3.6 both sides), so it must be the closest.
    assert_eq!(result.closest_outcome, Outcome::Draw);
    assert!(result.accuracy > 90.0);
}

#[test]
fn listing_and_lookup_agree_on_ids() {
    let cfg = offline_config();
    let fixtures = selector::list_fixtures(&FixtureFilters::default()).unwrap();
    for fixture in fixtures {
        let found = selector::get_fixture(&cfg, &fixture.fixture.id)
            .unwrap()
            .expect("listed fixture resolves");
        assert_eq!(found.fixture.home_name(), fixture.home_name());
    }
}
