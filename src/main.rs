use std::env;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use odds_lab::compare::{Outcome, compare_odds};
use odds_lab::config::AppConfig;
use odds_lab::football_api::{self, FixtureQuery};
use odds_lab::llm_api;
use odds_lab::models::{Fixture, FixtureId, Prediction};
use odds_lab::odds::format_moneyline_with_probability;
use odds_lab::prediction::OddsFormat;
use odds_lab::selector::{self, DataSource, FixtureFilters};

const USAGE: &str = "usage: odds_lab <command>

commands:
  fixtures [date|from to]        list bundled sample fixtures
  fixtures live [date]           list fixtures from the live API
  predict <fixture-id> [model]   generate a model odds prediction
  compare <fixture-id> [model]   compare a prediction against bookmaker odds
  explain <fixture-id> [model]   predict, then ask the model to explain itself";

fn main() -> ExitCode {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        println!("{USAGE}");
        return Ok(());
    };

    let cfg = AppConfig::from_env();
    match command {
        "fixtures" => cmd_fixtures(&cfg, &args[1..]),
        "predict" => {
            let (fixture, prediction) = predict(&cfg, &args[1..])?;
            print_prediction(&fixture, &prediction);
            Ok(())
        }
        "compare" => cmd_compare(&cfg, &args[1..]),
        "explain" => cmd_explain(&cfg, &args[1..]),
        other => Err(anyhow!("unknown command: {other}\n{USAGE}")),
    }
}

fn cmd_fixtures(cfg: &AppConfig, args: &[String]) -> Result<()> {
    // "fixtures live [date]" bypasses the sample listing and asks the
    // upstream API directly.
    if args.first().map(String::as_str) == Some("live") {
        let query = FixtureQuery {
            date: args.get(1).cloned(),
            ..Default::default()
        };
        let fixtures = football_api::fetch_fixtures(cfg, &query)?;
        print_fixtures(&fixtures);
        return Ok(());
    }

    let filters = match args {
        [] => FixtureFilters::default(),
        [date] => FixtureFilters {
            date: Some(date.clone()),
            ..Default::default()
        },
        [from, to, ..] => FixtureFilters {
            from: Some(from.clone()),
            to: Some(to.clone()),
            ..Default::default()
        },
    };

    print_fixtures(&selector::list_fixtures(&filters)?);
    Ok(())
}

fn print_fixtures(fixtures: &[Fixture]) {
    for fixture in fixtures {
        let venue = fixture
            .fixture
            .venue
            .as_ref()
            .and_then(|v| v.name.as_deref())
            .unwrap_or("unknown venue");
        let marker = if fixture.fixture.id.is_sample() {
            " [sample]"
        } else {
            ""
        };
        println!(
            "{:<16} {}  {} vs {}  ({venue}){marker}",
            fixture.fixture.id.to_string(),
            fixture.fixture.date,
            fixture.home_name(),
            fixture.away_name(),
        );
    }
}

fn predict(cfg: &AppConfig, args: &[String]) -> Result<(Fixture, Prediction)> {
    let raw_id = args
        .first()
        .ok_or_else(|| anyhow!("missing fixture id\n{USAGE}"))?;
    let model = args.get(1).map(String::as_str);

    let id = FixtureId::parse(raw_id);
    let lookup = selector::get_fixture(cfg, &id)?
        .ok_or_else(|| anyhow!("fixture {id} not found in live or sample data"))?;
    if lookup.source == DataSource::Sample {
        println!("(using bundled sample fixture data)");
    }
    let fixture = lookup.fixture;

    let home_stats = selector::get_team_statistics(cfg, fixture.teams.home.id)?;
    let away_stats = selector::get_team_statistics(cfg, fixture.teams.away.id)?;
    let context =
        selector::build_match_context(&fixture, home_stats.as_ref(), away_stats.as_ref());

    let prediction = llm_api::generate_prediction(cfg, &context, model, OddsFormat::Decimal)
        .context("prediction failed")?;
    Ok((fixture, prediction))
}

fn print_prediction(fixture: &Fixture, prediction: &Prediction) {
    println!(
        "{} vs {} ({} prediction):",
        fixture.home_name(),
        fixture.away_name(),
        prediction.model
    );
    let rows = [
        ("home win", &prediction.home_win),
        ("draw", &prediction.draw),
        ("away win", &prediction.away_win),
    ];
    for (label, value) in rows {
        match value.as_decimal() {
            Some(decimal) => {
                println!("  {label:<9} {}", format_moneyline_with_probability(decimal))
            }
            None => println!("  {label:<9} N/A"),
        }
    }
    println!("  confidence: {:.0}%", prediction.confidence);
    println!("  reasoning: {}", prediction.reasoning);
}

fn cmd_compare(cfg: &AppConfig, args: &[String]) -> Result<()> {
    let (fixture, prediction) = predict(cfg, args)?;
    print_prediction(&fixture, &prediction);

    let lookup = selector::get_odds(cfg, &fixture)?;
    let Some(bookmaker_odds) = lookup.odds else {
        println!(
            "{}",
            lookup
                .message
                .unwrap_or_else(|| "No odds available.".to_string())
        );
        return Ok(());
    };

    println!(
        "\nBookmaker odds ({}, {:?} source):",
        bookmaker_odds.bookmaker,
        lookup.source.expect("source set when odds present")
    );

    let predicted = prediction.decimal_odds();
    let result = compare_odds(predicted.as_ref(), Some(&bookmaker_odds.odds))?;
    for outcome in Outcome::ALL {
        let entry = result.outcome(outcome);
        println!(
            "  {:<9} predicted {:.2} vs actual {:.2}  (diff {:.2}, {:.1}%)",
            outcome.label(),
            entry.predicted,
            entry.actual,
            entry.difference,
            entry.percentage_diff
        );
    }
    println!("  accuracy: {:.2}%", result.accuracy);
    println!("  closest outcome: {}", result.closest_outcome);
    Ok(())
}

fn cmd_explain(cfg: &AppConfig, args: &[String]) -> Result<()> {
    let (fixture, prediction) = predict(cfg, args)?;
    print_prediction(&fixture, &prediction);

    let home_stats = selector::get_team_statistics(cfg, fixture.teams.home.id)?;
    let away_stats = selector::get_team_statistics(cfg, fixture.teams.away.id)?;
    let context =
        selector::build_match_context(&fixture, home_stats.as_ref(), away_stats.as_ref());
    let model = args.get(1).map(String::as_str);

    let explanation = llm_api::generate_explanation(cfg, &context, &prediction, None, model)?;
    println!("\n{}", explanation.explanation);
    Ok(())
}
