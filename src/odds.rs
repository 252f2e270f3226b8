//! Decimal / moneyline (American) odds conversion.
//!
//! Decimal odds are the canonical at-rest representation everywhere in this
//! crate; moneyline strings are derived on demand for display and transport.

/// Converts decimal odds to a signed moneyline string, e.g. 2.5 -> "+150",
/// 1.5 -> "-200". Returns `None` for non-finite input or odds at or below
/// even money (decimal <= 1.0), which encode no meaningful payout.
pub fn decimal_to_american(decimal: f64) -> Option<String> {
    if !decimal.is_finite() || decimal <= 1.0 {
        return None;
    }
    if decimal >= 2.0 {
        let moneyline = ((decimal - 1.0) * 100.0).round() as i64;
        Some(format!("+{moneyline}"))
    } else {
        let moneyline = (-100.0 / (decimal - 1.0)).round() as i64;
        Some(moneyline.to_string())
    }
}

/// Inverse of [`decimal_to_american`]. Accepts "+150", "-200", or a bare
/// number. Integer rounding of the moneyline value means the round trip is
/// close to, not exactly, the original decimal.
pub fn american_to_decimal(moneyline: &str) -> Option<f64> {
    let trimmed = moneyline.trim();
    let value = trimmed.strip_prefix('+').unwrap_or(trimmed).parse::<f64>().ok()?;
    if !value.is_finite() || value == 0.0 {
        return None;
    }
    if value > 0.0 {
        Some(1.0 + value / 100.0)
    } else {
        Some(1.0 + 100.0 / value.abs())
    }
}

/// Break-even win probability the decimal odds encode, as a percentage
/// rounded to one decimal place.
pub fn implied_probability(decimal: f64) -> Option<f64> {
    if !decimal.is_finite() || decimal <= 1.0 {
        return None;
    }
    Some((1000.0 / decimal).round() / 10.0)
}

/// Display form combining all three representations, matching the UI label:
/// "+150 (2.50 | 40.0%)". Falls back to "N/A" for unconvertible odds.
pub fn format_moneyline_with_probability(decimal: f64) -> String {
    let (Some(american), Some(implied)) =
        (decimal_to_american(decimal), implied_probability(decimal))
    else {
        return "N/A".to_string();
    };
    format!("{american} ({decimal:.2} | {implied:.1}%)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_money_is_plus_100() {
        assert_eq!(decimal_to_american(2.0).as_deref(), Some("+100"));
    }

    #[test]
    fn short_odds_go_negative() {
        assert_eq!(decimal_to_american(1.5).as_deref(), Some("-200"));
    }

    #[test]
    fn impossible_odds_have_no_moneyline() {
        assert!(decimal_to_american(1.0).is_none());
        assert!(decimal_to_american(0.8).is_none());
        assert!(decimal_to_american(f64::NAN).is_none());
        assert!(decimal_to_american(f64::INFINITY).is_none());
    }

    #[test]
    fn moneyline_parses_both_signs() {
        assert_eq!(american_to_decimal("+150"), Some(2.5));
        assert_eq!(american_to_decimal("-200"), Some(1.5));
        assert_eq!(american_to_decimal("100"), Some(2.0));
        assert!(american_to_decimal("0").is_none());
        assert!(american_to_decimal("nope").is_none());
    }

    #[test]
    fn round_trip_stays_within_rounding_tolerance() {
        for decimal in [1.1, 1.5, 1.85, 2.0, 2.5, 3.4, 4.0, 7.25, 15.0] {
            let american = decimal_to_american(decimal).expect("convertible");
            let back = american_to_decimal(&american).expect("parseable");
            // Rounding the moneyline to an integer bounds the error.
            assert!(
                (back - decimal).abs() < 0.01,
                "{decimal} -> {american} -> {back}"
            );
        }
    }

    #[test]
    fn implied_probability_of_even_money_is_fifty() {
        assert_eq!(implied_probability(2.0), Some(50.0));
        assert_eq!(implied_probability(4.0), Some(25.0));
        assert!(implied_probability(1.0).is_none());
    }

    #[test]
    fn display_format_includes_all_representations() {
        assert_eq!(format_moneyline_with_probability(2.5), "+150 (2.50 | 40.0%)");
        assert_eq!(format_moneyline_with_probability(0.5), "N/A");
    }
}
