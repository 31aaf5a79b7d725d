//! Daily luck from the day of the lunar cycle.

use crate::angles::normalize_degrees;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean synodic month in days.
pub const MEAN_SYNODIC_MONTH_DAYS: f64 = 29.530588;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LuckRating {
    Lucky,
    Unlucky,
    Neutral,
}

impl LuckRating {
    pub fn label(self) -> &'static str {
        match self {
            LuckRating::Lucky => "lucky",
            LuckRating::Unlucky => "unlucky",
            LuckRating::Neutral => "neutral",
        }
    }

    /// Display color of the rating banner.
    pub fn color(self) -> &'static str {
        match self {
            LuckRating::Lucky => "#009626",
            LuckRating::Unlucky => "#ff0036",
            LuckRating::Neutral => "#000",
        }
    }
}

impl fmt::Display for LuckRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 1-based day of the lunar cycle from the Moon-Sun elongation.
pub fn cycle_day(elongation: f64) -> u32 {
    let age_days = normalize_degrees(elongation) / 360.0 * MEAN_SYNODIC_MONTH_DAYS;
    age_days.floor() as u32 + 1
}

/// Luck for a given cycle day.
pub fn rate_cycle_day(day: u32) -> LuckRating {
    match day {
        1 | 2 | 7 | 14 | 17 => LuckRating::Lucky,
        5 | 15 | 25 => LuckRating::Unlucky,
        // Called out explicitly in the traditional table; same as the default.
        3 | 4 => LuckRating::Neutral,
        _ => LuckRating::Neutral,
    }
}

/// Luck for the lunar day at the given elongation.
pub fn rate(elongation: f64) -> LuckRating {
    rate_cycle_day(cycle_day(elongation))
}
