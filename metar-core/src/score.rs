//! Component scores and the composite risk level.
//!
//! Higher is riskier. Each function is a pure mapping from one observed
//! quantity to its contribution; [`crate::Observation::score`] sums them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Visibility thresholds in statute miles, scanned in ascending order.
const VISIBILITY_TABLE: [(f64, i64); 3] = [(1.0, 5), (2.0, 3), (3.0, 1)];

/// Wind speed above which every extra knot counts triple.
const WIND_KNEE_KT: i64 = 6;

const LOW_PRESSURE_MB: i32 = 1015;

/// Compares the Fahrenheit temperature against the (approximate) relative humidity.
pub fn temp_vs_rh(temp_f: f64, relative_humidity: i64) -> i64 {
    let rh = relative_humidity as f64;
    if temp_f < rh {
        7
    } else if temp_f < rh + 5.0 {
        5
    } else {
        2
    }
}

/// Widened to `i64` so that no `i32` input can overflow.
pub fn wind_speed(wind_speed_kt: i32) -> i64 {
    let kt = i64::from(wind_speed_kt);
    if kt < WIND_KNEE_KT {
        return kt;
    }
    kt + (kt - WIND_KNEE_KT) * 2
}

pub fn visibility(visibility_mi: f64) -> i64 {
    VISIBILITY_TABLE
        .iter()
        .find(|(threshold, _)| visibility_mi < *threshold)
        .map_or(0, |(_, score)| *score)
}

pub fn pressure(pressure_mb: i32) -> i64 {
    if pressure_mb <= LOW_PRESSURE_MB { 3 } else { 1 }
}

/// Categorical indicator for a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Green,
    Yellow,
    Red,
}

impl RiskLevel {
    /// `..=12` green, `13..=17` yellow, `18..` red.
    pub fn from_score(score: i64) -> Self {
        match score {
            ..=12 => RiskLevel::Green,
            13..=17 => RiskLevel::Yellow,
            _ => RiskLevel::Red,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RiskLevel::Green => "\u{1F49A}",
            RiskLevel::Yellow => "\u{1F49B}",
            RiskLevel::Red => "\u{2764}\u{FE0F}",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Green => "green",
            RiskLevel::Yellow => "yellow",
            RiskLevel::Red => "red",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wind_below_knee_scores_linearly() {
        assert_eq!(wind_speed(0), 0);
        assert_eq!(wind_speed(5), 5);
    }

    #[test]
    fn wind_above_knee_counts_excess_triple() {
        assert_eq!(wind_speed(6), 6);
        assert_eq!(wind_speed(10), 18);
        assert_eq!(wind_speed(20), 48);
    }

    #[test]
    fn extreme_wind_does_not_overflow() {
        let max = i64::from(i32::MAX);
        assert_eq!(wind_speed(i32::MAX), max + (max - 6) * 2);
        assert_eq!(wind_speed(1_000_000_000), 2_999_999_988);
    }

    #[test]
    fn visibility_uses_first_matching_threshold() {
        assert_eq!(visibility(0.5), 5);
        assert_eq!(visibility(1.0), 3);
        assert_eq!(visibility(1.5), 3);
        assert_eq!(visibility(2.5), 1);
        assert_eq!(visibility(3.0), 0);
        assert_eq!(visibility(5.0), 0);
    }

    #[test]
    fn pressure_boundary_is_inclusive() {
        assert_eq!(pressure(1010), 3);
        assert_eq!(pressure(1015), 3);
        assert_eq!(pressure(1016), 1);
        assert_eq!(pressure(1020), 1);
    }

    #[test]
    fn temp_vs_rh_tiers() {
        assert_eq!(temp_vs_rh(75.2, 100), 7);
        assert_eq!(temp_vs_rh(100.0, 100), 5);
        assert_eq!(temp_vs_rh(104.9, 100), 5);
        assert_eq!(temp_vs_rh(105.0, 100), 2);
    }

    #[test]
    fn risk_level_boundaries() {
        assert_eq!(RiskLevel::from_score(i64::MIN), RiskLevel::Green);
        assert_eq!(RiskLevel::from_score(12), RiskLevel::Green);
        assert_eq!(RiskLevel::from_score(13), RiskLevel::Yellow);
        assert_eq!(RiskLevel::from_score(17), RiskLevel::Yellow);
        assert_eq!(RiskLevel::from_score(18), RiskLevel::Red);
        assert_eq!(RiskLevel::from_score(i64::MAX), RiskLevel::Red);
    }

    #[test]
    fn emoji_markers_are_distinct() {
        assert_eq!(RiskLevel::Green.emoji(), "💚");
        assert_eq!(RiskLevel::Yellow.emoji(), "💛");
        assert!(RiskLevel::Red.emoji().starts_with('\u{2764}'));
    }
}
