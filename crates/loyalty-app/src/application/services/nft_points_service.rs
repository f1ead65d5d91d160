use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use loyalty_domain::nft::{
    EligibleNft, NftKey, NftPoints, NftPointsResolver, NftUsage, NftUsageRepository,
};
use loyalty_domain::shared::{CheckInId, DomainError, WalletAddress};

/// An NFT whose usage record could not be written for a reason other than
/// "already used today"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftUsageFailure {
    #[serde(flatten)]
    pub nft: NftKey,
    pub error: String,
}

/// Outcome of the best-effort usage recording step of a check-in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NftUsageReport {
    pub recorded: Vec<NftKey>,
    /// Claimed by another check-in earlier the same UTC day
    pub already_used: Vec<NftKey>,
    pub failed: Vec<NftUsageFailure>,
}

impl NftUsageReport {
    pub fn is_complete(&self) -> bool {
        self.already_used.is_empty() && self.failed.is_empty()
    }
}

/// Resolver front-end that enforces "one use per NFT per UTC day"
pub struct NftPointsService {
    resolver: Arc<dyn NftPointsResolver>,
    usage_repo: Arc<dyn NftUsageRepository>,
}

impl NftPointsService {
    pub fn new(
        resolver: Arc<dyn NftPointsResolver>,
        usage_repo: Arc<dyn NftUsageRepository>,
    ) -> Self {
        Self {
            resolver,
            usage_repo,
        }
    }

    /// Resolve the wallet's NFTs and drop any already used on `now`'s UTC date
    pub async fn resolve_available(
        &self,
        wallet_address: &WalletAddress,
        now: DateTime<Utc>,
    ) -> Result<NftPoints, DomainError> {
        let points = self.resolver.resolve(wallet_address).await?;
        if points.eligible_nfts.is_empty() {
            return Ok(points);
        }

        let keys: Vec<NftKey> = points.eligible_nfts.iter().map(EligibleNft::key).collect();
        let used: HashSet<NftKey> = self
            .usage_repo
            .find_used_on(&keys, now.date_naive())
            .await?
            .into_iter()
            .collect();

        if !used.is_empty() {
            debug!(
                "[nft] {} of {} NFTs for {} already used on {}",
                used.len(),
                keys.len(),
                wallet_address,
                now.date_naive()
            );
        }

        Ok(points.excluding(&used))
    }

    /// Record one usage row per eligible NFT. Never fails the caller.
    pub async fn record_usage(
        &self,
        points: &NftPoints,
        wallet_address: &WalletAddress,
        check_in_id: &CheckInId,
        used_at: DateTime<Utc>,
    ) -> NftUsageReport {
        let attempts = points.eligible_nfts.iter().map(|nft| {
            let usage = NftUsage::new(
                nft.key(),
                wallet_address.clone(),
                check_in_id.clone(),
                used_at,
            );
            async move {
                let result = self.usage_repo.record(&usage).await;
                (usage.key().clone(), result)
            }
        });

        let mut report = NftUsageReport::default();
        for (key, result) in join_all(attempts).await {
            match result {
                Ok(()) => report.recorded.push(key),
                Err(e) if e.is_constraint_violation() => {
                    warn!("[nft] {} already used today, skipped for {}", key, wallet_address);
                    report.already_used.push(key);
                }
                Err(e) => {
                    warn!("[nft] Failed to record usage of {}: {}", key, e);
                    report.failed.push(NftUsageFailure {
                        nft: key,
                        error: e.to_string(),
                    });
                }
            }
        }

        report
    }
}
