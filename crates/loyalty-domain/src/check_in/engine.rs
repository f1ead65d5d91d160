use chrono::{DateTime, Duration, Utc};

use super::value_objects::{
    CheckInDecision, Multiplier, PointsAward, StreakAdvance, StreakTransition,
};
use crate::user::LoyaltyUser;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Domain service for check-in business rules
/// Pure functions of (prior state, now, NFT points); never reads the clock
pub struct CheckInEngine;

impl CheckInEngine {
    /// Decide whether a check-in at `now` is allowed and what streak it produces
    pub fn decide(prior: Option<&LoyaltyUser>, now: DateTime<Utc>) -> CheckInDecision {
        let Some(user) = prior else {
            return CheckInDecision::Accepted(StreakAdvance {
                transition: StreakTransition::First,
                current_streak: 1,
                max_streak: 1,
                total_check_ins: 1,
                checked_in_at: now,
                days_since_last: None,
            });
        };

        let last_check_in = user.last_check_in();
        let days_diff = Self::days_between(last_check_in, now);

        if days_diff == 0 {
            return CheckInDecision::AlreadyCheckedInToday {
                last_check_in,
                next_eligible_at: last_check_in + Duration::days(1),
            };
        }

        let (transition, current_streak) = if days_diff == 1 {
            (
                StreakTransition::Continued,
                user.current_streak().saturating_add(1),
            )
        } else {
            (StreakTransition::Broken, 1)
        };

        CheckInDecision::Accepted(StreakAdvance {
            transition,
            current_streak,
            max_streak: current_streak.max(user.max_streak()),
            total_check_ins: user.total_check_ins().saturating_add(1),
            checked_in_at: now,
            days_since_last: Some(days_diff),
        })
    }

    /// Points for a check-in at `current_streak` given the wallet's NFT total
    pub fn award(current_streak: u32, nft_total_points: f64) -> PointsAward {
        let multiplier = Multiplier::for_streak(current_streak);
        // NaN and negative totals both clamp to zero
        let base_points = if nft_total_points > 0.0 {
            nft_total_points
        } else {
            0.0
        };

        let product = base_points * multiplier.value();
        let points_earned = if multiplier.is_fractional() {
            product.round()
        } else {
            product
        };

        PointsAward {
            multiplier,
            base_points,
            points_earned,
        }
    }

    /// Whole 24h periods between two instants, in either direction
    pub fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
        let millis = later.signed_duration_since(earlier).num_milliseconds().abs();
        millis / MILLIS_PER_DAY
    }
}
