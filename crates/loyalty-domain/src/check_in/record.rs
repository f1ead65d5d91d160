use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value_objects::{Multiplier, PointsAward};
use crate::shared::{CheckInId, UserId, WalletAddress};

/// Append-only record of one successful check-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInRecord {
    id: CheckInId,
    user_id: UserId,
    wallet_address: WalletAddress,
    streak_count: u32,
    points_earned: f64,
    multiplier: Multiplier,
    transaction_hash: Option<String>,
    created_at: DateTime<Utc>,
}

impl CheckInRecord {
    pub fn new(
        user_id: UserId,
        wallet_address: WalletAddress,
        streak_count: u32,
        award: &PointsAward,
        transaction_hash: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        // An empty hash from the client means "none"
        let transaction_hash = transaction_hash
            .map(|hash| hash.trim().to_string())
            .filter(|hash| !hash.is_empty());

        Self {
            id: CheckInId::new(),
            user_id,
            wallet_address,
            streak_count,
            points_earned: award.points_earned,
            multiplier: award.multiplier,
            transaction_hash,
            created_at,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: CheckInId,
        user_id: UserId,
        wallet_address: WalletAddress,
        streak_count: u32,
        points_earned: f64,
        multiplier: Multiplier,
        transaction_hash: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            wallet_address,
            streak_count,
            points_earned,
            multiplier,
            transaction_hash,
            created_at,
        }
    }

    pub fn id(&self) -> &CheckInId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn wallet_address(&self) -> &WalletAddress {
        &self.wallet_address
    }

    pub fn streak_count(&self) -> u32 {
        self.streak_count
    }

    pub fn points_earned(&self) -> f64 {
        self.points_earned
    }

    pub fn multiplier(&self) -> Multiplier {
        self.multiplier
    }

    pub fn transaction_hash(&self) -> Option<&str> {
        self.transaction_hash.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
