use async_trait::async_trait;

use super::NftPoints;
use crate::shared::{DomainError, WalletAddress};

/// Source of NFT-derived points for a wallet.
/// Implementations live in infrastructure; the domain only sees the contract.
#[async_trait]
pub trait NftPointsResolver: Send + Sync {
    async fn resolve(&self, wallet_address: &WalletAddress) -> Result<NftPoints, DomainError>;
}
