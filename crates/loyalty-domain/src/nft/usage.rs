use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::NftKey;
use crate::shared::{CheckInId, DomainError, NftUsageId, WalletAddress};

/// One NFT counted toward one check-in on one UTC day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftUsage {
    id: NftUsageId,
    key: NftKey,
    wallet_address: WalletAddress,
    check_in_id: CheckInId,
    usage_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl NftUsage {
    pub fn new(
        key: NftKey,
        wallet_address: WalletAddress,
        check_in_id: CheckInId,
        used_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NftUsageId::new(),
            key,
            wallet_address,
            check_in_id,
            usage_date: used_at.date_naive(),
            created_at: used_at,
        }
    }

    pub fn restore(
        id: NftUsageId,
        key: NftKey,
        wallet_address: WalletAddress,
        check_in_id: CheckInId,
        usage_date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            key,
            wallet_address,
            check_in_id,
            usage_date,
            created_at,
        }
    }

    pub fn id(&self) -> &NftUsageId {
        &self.id
    }

    pub fn key(&self) -> &NftKey {
        &self.key
    }

    pub fn wallet_address(&self) -> &WalletAddress {
        &self.wallet_address
    }

    pub fn check_in_id(&self) -> &CheckInId {
        &self.check_in_id
    }

    pub fn usage_date(&self) -> NaiveDate {
        self.usage_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[async_trait]
pub trait NftUsageRepository: Send + Sync {
    /// Insert a usage record.
    ///
    /// A second use of the same NFT on the same `usage_date` fails with
    /// `DomainError::ConstraintViolation`.
    async fn record(&self, usage: &NftUsage) -> Result<(), DomainError>;

    /// Keys among `keys` that already have a usage record on `date`
    async fn find_used_on(
        &self,
        keys: &[NftKey],
        date: NaiveDate,
    ) -> Result<Vec<NftKey>, DomainError>;

    async fn find_by_check_in(&self, check_in_id: &CheckInId) -> Result<Vec<NftUsage>, DomainError>;
}
