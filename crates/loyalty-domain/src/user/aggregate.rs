use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::check_in::StreakAdvance;
use crate::shared::{DomainError, UserId, WalletAddress};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoyaltyUser {
    id: UserId,
    wallet_address: WalletAddress,
    current_streak: u32,
    max_streak: u32,
    total_check_ins: u32,
    total_points: f64,
    last_check_in: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl LoyaltyUser {
    /// Create the record for a wallet's first check-in.
    ///
    /// The advance must come from the engine's first-check-in branch.
    pub fn first_check_in(
        wallet_address: WalletAddress,
        advance: &StreakAdvance,
    ) -> Result<Self, DomainError> {
        if !advance.is_first() {
            return Err(DomainError::DataIntegrity(format!(
                "Cannot create user {} from a {:?} streak transition",
                wallet_address, advance.transition
            )));
        }

        Ok(Self {
            id: UserId::new(),
            wallet_address,
            current_streak: advance.current_streak,
            max_streak: advance.max_streak,
            total_check_ins: advance.total_check_ins,
            total_points: 0.0,
            last_check_in: advance.checked_in_at,
            created_at: advance.checked_in_at,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: UserId,
        wallet_address: WalletAddress,
        current_streak: u32,
        max_streak: u32,
        total_check_ins: u32,
        total_points: f64,
        last_check_in: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            wallet_address,
            current_streak,
            max_streak,
            total_check_ins,
            total_points,
            last_check_in,
            created_at,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn wallet_address(&self) -> &WalletAddress {
        &self.wallet_address
    }

    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    pub fn max_streak(&self) -> u32 {
        self.max_streak
    }

    pub fn total_check_ins(&self) -> u32 {
        self.total_check_ins
    }

    pub fn total_points(&self) -> f64 {
        self.total_points
    }

    pub fn last_check_in(&self) -> DateTime<Utc> {
        self.last_check_in
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Apply an accepted check-in to an existing user
    pub fn apply(&mut self, advance: &StreakAdvance) {
        self.current_streak = advance.current_streak;
        self.max_streak = self.max_streak.max(advance.max_streak);
        self.total_check_ins = advance.total_check_ins;
        self.last_check_in = advance.checked_in_at;
    }

    /// Overwrite the point total with the value the store holds after an increment
    pub fn sync_total_points(&mut self, total_points: f64) {
        self.total_points = total_points;
    }
}
