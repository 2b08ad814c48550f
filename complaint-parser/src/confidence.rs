//! Heuristic confidence for a finished parse.

use complaint_core::{DurationUnit, DurationValue};

pub const NO_DURATION_WITH_SYMPTOM: f64 = 0.62;
pub const NO_DURATION_WITHOUT_SYMPTOM: f64 = 0.2;

pub const DURATION_BASE: f64 = 0.55;
pub const SYMPTOM_FOUND_BONUS: f64 = 0.18;
pub const SYMPTOM_MISSING_PENALTY: f64 = 0.25;
pub const DURATION_PRESENT_BONUS: f64 = 0.22;
pub const RANGE_BONUS: f64 = 0.03;
/// Day and hour are the most common units in acute complaints.
pub const COMMON_UNIT_BONUS: f64 = 0.02;

pub fn without_duration(has_symptom: bool) -> f64 {
    if has_symptom {
        NO_DURATION_WITH_SYMPTOM
    } else {
        NO_DURATION_WITHOUT_SYMPTOM
    }
}

pub fn with_duration(has_symptom: bool, value: &DurationValue, unit: DurationUnit) -> f64 {
    let mut score = DURATION_BASE + DURATION_PRESENT_BONUS;
    if has_symptom {
        score += SYMPTOM_FOUND_BONUS;
    } else {
        score -= SYMPTOM_MISSING_PENALTY;
    }
    if value.is_range() {
        score += RANGE_BONUS;
    }
    if matches!(unit, DurationUnit::Day | DurationUnit::Hour) {
        score += COMMON_UNIT_BONUS;
    }
    clamp_and_round(score)
}

/// Clamp to `[0, 1]` and round to two decimals so results compare exactly.
fn clamp_and_round(score: f64) -> f64 {
    (score.clamp(0.0, 1.0) * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_parse_with_common_unit() {
        let score = with_duration(true, &DurationValue::Single(3.0), DurationUnit::Day);
        assert_eq!(score, 0.97);
    }

    #[test]
    fn range_in_days_saturates_at_one() {
        let score = with_duration(true, &DurationValue::range(2.0, 3.0), DurationUnit::Day);
        assert_eq!(score, 1.0);
    }

    #[test]
    fn missing_symptom_lowers_score() {
        let score = with_duration(false, &DurationValue::Single(1.0), DurationUnit::Year);
        assert_eq!(score, 0.52);
    }

    #[test]
    fn no_duration_tiers() {
        assert_eq!(without_duration(true), 0.62);
        assert_eq!(without_duration(false), 0.2);
    }
}
