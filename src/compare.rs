//! Comparison of a predicted odds set against real bookmaker odds.
//!
//! Both inputs must already be in decimal form; callers working in moneyline
//! convert through [`crate::odds`] first.

use serde::Serialize;
use thiserror::Error;

use crate::models::OddsSet;

#[derive(Debug, Error, PartialEq)]
pub enum CompareError {
    #[error("Missing required data for comparison")]
    MissingData,
    /// Bookmaker odds are always > 1.0 upstream; enforce that here instead of
    /// dividing by whatever arrived.
    #[error("Actual odds for {outcome} are not valid decimal odds: {value}")]
    InvalidActualOdds { outcome: Outcome, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
}

impl Outcome {
    /// Declaration order; also the tie-break order for the closest outcome.
    pub const ALL: [Outcome; 3] = [Outcome::HomeWin, Outcome::Draw, Outcome::AwayWin];

    pub fn label(self) -> &'static str {
        match self {
            Outcome::HomeWin => "home win",
            Outcome::Draw => "draw",
            Outcome::AwayWin => "away win",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeComparison {
    pub predicted: f64,
    pub actual: f64,
    pub difference: f64,
    pub percentage_diff: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OddsComparison {
    pub home_win: OutcomeComparison,
    pub draw: OutcomeComparison,
    pub away_win: OutcomeComparison,
    /// `max(0, 100 - average percentage diff)`, so wildly wrong predictions
    /// bottom out at zero instead of going negative.
    pub accuracy: f64,
    pub average_difference: f64,
    pub closest_outcome: Outcome,
}

impl OddsComparison {
    pub fn outcome(&self, outcome: Outcome) -> &OutcomeComparison {
        match outcome {
            Outcome::HomeWin => &self.home_win,
            Outcome::Draw => &self.draw,
            Outcome::AwayWin => &self.away_win,
        }
    }
}

/// Compares predicted and actual decimal odds per outcome and in aggregate.
///
/// Ties for the closest outcome keep the earliest declared key (home win
/// before draw before away win); only a strictly smaller percentage
/// difference displaces the current minimum.
pub fn compare_odds(
    predicted: Option<&OddsSet>,
    actual: Option<&OddsSet>,
) -> Result<OddsComparison, CompareError> {
    let (Some(predicted), Some(actual)) = (predicted, actual) else {
        return Err(CompareError::MissingData);
    };

    for outcome in Outcome::ALL {
        let value = pick(actual, outcome);
        if !value.is_finite() || value <= 1.0 {
            return Err(CompareError::InvalidActualOdds { outcome, value });
        }
    }

    let home_win = compare_outcome(predicted.home_win, actual.home_win);
    let draw = compare_outcome(predicted.draw, actual.draw);
    let away_win = compare_outcome(predicted.away_win, actual.away_win);

    let avg_percentage_diff =
        (home_win.percentage_diff + draw.percentage_diff + away_win.percentage_diff) / 3.0;
    let accuracy = (100.0 - avg_percentage_diff).max(0.0);

    let mut closest = Outcome::HomeWin;
    let mut closest_diff = home_win.percentage_diff;
    for (outcome, entry) in [(Outcome::Draw, &draw), (Outcome::AwayWin, &away_win)] {
        if entry.percentage_diff < closest_diff {
            closest = outcome;
            closest_diff = entry.percentage_diff;
        }
    }

    Ok(OddsComparison {
        home_win,
        draw,
        away_win,
        accuracy,
        average_difference: avg_percentage_diff,
        closest_outcome: closest,
    })
}

fn compare_outcome(predicted: f64, actual: f64) -> OutcomeComparison {
    let difference = (predicted - actual).abs();
    OutcomeComparison {
        predicted,
        actual,
        difference,
        percentage_diff: difference / actual * 100.0,
    }
}

fn pick(set: &OddsSet, outcome: Outcome) -> f64 {
    match outcome {
        Outcome::HomeWin => set.home_win,
        Outcome::Draw => set.draw,
        Outcome::AwayWin => set.away_win,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(home_win: f64, draw: f64, away_win: f64) -> OddsSet {
        OddsSet {
            home_win,
            draw,
            away_win,
        }
    }

    #[test]
    fn exact_draw_match_is_closest_outcome() {
        let predicted = set(2.0, 3.0, 4.0);
        let actual = set(2.2, 3.0, 3.8);
        let result = compare_odds(Some(&predicted), Some(&actual)).unwrap();

        assert_eq!(result.draw.percentage_diff, 0.0);
        assert_eq!(result.closest_outcome, Outcome::Draw);
        assert!(result.accuracy > 90.0 && result.accuracy < 100.0);
    }

    #[test]
    fn missing_input_reports_missing_data() {
        let odds = set(2.0, 3.0, 4.0);
        assert_eq!(
            compare_odds(None, Some(&odds)),
            Err(CompareError::MissingData)
        );
        assert_eq!(
            compare_odds(Some(&odds), None),
            Err(CompareError::MissingData)
        );
    }

    #[test]
    fn ties_keep_the_earliest_declared_outcome() {
        // Identical percentage diff everywhere; home win is declared first.
        let predicted = set(2.2, 3.3, 4.4);
        let actual = set(2.0, 3.0, 4.0);
        let result = compare_odds(Some(&predicted), Some(&actual)).unwrap();
        assert_eq!(result.closest_outcome, Outcome::HomeWin);
    }

    #[test]
    fn accuracy_is_clamped_at_zero() {
        let predicted = set(50.0, 60.0, 70.0);
        let actual = set(2.0, 3.0, 4.0);
        let result = compare_odds(Some(&predicted), Some(&actual)).unwrap();
        assert_eq!(result.accuracy, 0.0);
    }

    #[test]
    fn invalid_actual_odds_are_rejected_before_dividing() {
        let predicted = set(2.0, 3.0, 4.0);
        let zero_draw = set(2.0, 0.0, 4.0);
        let err = compare_odds(Some(&predicted), Some(&zero_draw)).unwrap_err();
        assert_eq!(
            err,
            CompareError::InvalidActualOdds {
                outcome: Outcome::Draw,
                value: 0.0
            }
        );

        let nan_home = set(f64::NAN, 3.0, 4.0);
        assert!(compare_odds(Some(&predicted), Some(&nan_home)).is_err());
    }

    #[test]
    fn percentage_diff_is_relative_to_actual() {
        let predicted = set(2.2, 3.0, 4.0);
        let actual = set(2.0, 3.0, 4.0);
        let result = compare_odds(Some(&predicted), Some(&actual)).unwrap();
        assert!((result.home_win.percentage_diff - 10.0).abs() < 1e-9);
        assert!((result.home_win.difference - 0.2).abs() < 1e-9);
    }
}
