use async_trait::async_trait;

use super::LoyaltyUser;
use crate::shared::{DomainError, WalletAddress};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_wallet(
        &self,
        wallet_address: &WalletAddress,
    ) -> Result<Option<LoyaltyUser>, DomainError>;

    /// Insert a new user.
    ///
    /// Fails with `DomainError::ConstraintViolation` when the wallet already
    /// has a row.
    async fn create(&self, user: &LoyaltyUser) -> Result<(), DomainError>;

    /// Persist the streak fields of `user`, but only if the stored
    /// `total_check_ins` still equals `expected_total_check_ins`.
    ///
    /// Returns `false` when another check-in got there first.
    async fn record_check_in(
        &self,
        user: &LoyaltyUser,
        expected_total_check_ins: u32,
    ) -> Result<bool, DomainError>;

    /// Atomically add `points` to the stored total and return the new total.
    async fn add_points(
        &self,
        wallet_address: &WalletAddress,
        points: f64,
    ) -> Result<f64, DomainError>;

    /// Most recently active users first
    async fn list_recent(&self, limit: u32) -> Result<Vec<LoyaltyUser>, DomainError>;
}
