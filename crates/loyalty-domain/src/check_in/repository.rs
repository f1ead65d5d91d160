use async_trait::async_trait;

use super::CheckInRecord;
use crate::shared::{DomainError, WalletAddress};

#[async_trait]
pub trait CheckInRepository: Send + Sync {
    async fn save(&self, record: &CheckInRecord) -> Result<(), DomainError>;

    /// Check-ins for a wallet, newest first
    async fn find_by_wallet(
        &self,
        wallet_address: &WalletAddress,
        limit: u32,
    ) -> Result<Vec<CheckInRecord>, DomainError>;
}
