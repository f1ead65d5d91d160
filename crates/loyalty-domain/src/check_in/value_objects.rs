use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point multiplier earned by the streak length of the current check-in.
///
/// Tier lower bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Multiplier {
    Standard,
    OneAndHalf,
    Double,
    DoubleAndHalf,
    Triple,
}

impl Multiplier {
    pub fn for_streak(streak: u32) -> Self {
        match streak {
            29.. => Multiplier::Triple,
            22..=28 => Multiplier::DoubleAndHalf,
            15..=21 => Multiplier::Double,
            8..=14 => Multiplier::OneAndHalf,
            _ => Multiplier::Standard,
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Multiplier::Standard => 1.0,
            Multiplier::OneAndHalf => 1.5,
            Multiplier::Double => 2.0,
            Multiplier::DoubleAndHalf => 2.5,
            Multiplier::Triple => 3.0,
        }
    }

    /// Tiers whose product is rounded to the nearest whole point
    pub fn is_fractional(&self) -> bool {
        matches!(self, Multiplier::OneAndHalf | Multiplier::DoubleAndHalf)
    }

    /// Reverse of `value()`, used when reading stored check-ins
    pub fn from_value(value: f64) -> Option<Self> {
        [
            Multiplier::Standard,
            Multiplier::OneAndHalf,
            Multiplier::Double,
            Multiplier::DoubleAndHalf,
            Multiplier::Triple,
        ]
        .into_iter()
        .find(|m| m.value() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointsAward {
    pub multiplier: Multiplier,
    pub base_points: f64,
    pub points_earned: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreakTransition {
    /// No prior record for the wallet
    First,
    /// Exactly one day since the last check-in
    Continued,
    /// Two or more days since the last check-in
    Broken,
}

/// New streak state produced by an accepted check-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakAdvance {
    pub transition: StreakTransition,
    pub current_streak: u32,
    pub max_streak: u32,
    pub total_check_ins: u32,
    pub checked_in_at: DateTime<Utc>,
    pub days_since_last: Option<i64>,
}

impl StreakAdvance {
    pub fn is_first(&self) -> bool {
        self.transition == StreakTransition::First
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CheckInDecision {
    Accepted(StreakAdvance),
    AlreadyCheckedInToday {
        last_check_in: DateTime<Utc>,
        next_eligible_at: DateTime<Utc>,
    },
}
