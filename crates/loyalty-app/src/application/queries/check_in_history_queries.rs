use futures::future::try_join_all;
use std::sync::Arc;

use super::clamp_limit;
use crate::application::dtos::{CheckInDto, CheckInHistoryDto, NftUsageDto};
use loyalty_domain::check_in::CheckInRepository;
use loyalty_domain::nft::NftUsageRepository;
use loyalty_domain::shared::{DomainError, WalletAddress};

pub const DEFAULT_HISTORY_LIMIT: u32 = 30;
pub const MAX_HISTORY_LIMIT: u32 = 100;

/// A wallet's append-only check-in log, joined with the NFTs each check-in used
pub struct CheckInHistoryQueryService {
    check_in_repo: Arc<dyn CheckInRepository>,
    nft_usage_repo: Arc<dyn NftUsageRepository>,
}

impl CheckInHistoryQueryService {
    pub fn new(
        check_in_repo: Arc<dyn CheckInRepository>,
        nft_usage_repo: Arc<dyn NftUsageRepository>,
    ) -> Self {
        Self {
            check_in_repo,
            nft_usage_repo,
        }
    }

    pub async fn history(
        &self,
        wallet_address: &str,
        limit: Option<u32>,
    ) -> Result<Vec<CheckInHistoryDto>, DomainError> {
        let wallet = WalletAddress::parse(wallet_address)?;
        let limit = clamp_limit(limit, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT);

        let check_ins = self.check_in_repo.find_by_wallet(&wallet, limit).await?;

        let entries = check_ins.iter().map(|check_in| async move {
            let usage = self.nft_usage_repo.find_by_check_in(check_in.id()).await?;
            Ok::<_, DomainError>(CheckInHistoryDto {
                check_in: CheckInDto::from(check_in),
                nft_usage: usage.iter().map(NftUsageDto::from).collect(),
            })
        });

        try_join_all(entries).await
    }
}
