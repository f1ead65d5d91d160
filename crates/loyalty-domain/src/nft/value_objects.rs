use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Identity of a single NFT across all wallets
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NftKey {
    pub contract_address: String,
    pub token_id: String,
}

impl NftKey {
    pub fn new(contract_address: impl Into<String>, token_id: impl Into<String>) -> Self {
        Self {
            contract_address: contract_address.into().to_lowercase(),
            token_id: token_id.into(),
        }
    }
}

impl std::fmt::Display for NftKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.contract_address, self.token_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibleNft {
    pub token_id: String,
    pub contract_address: String,
    /// Per-NFT share of the wallet total, when the resolver reports one
    #[serde(default)]
    pub points: Option<f64>,
}

impl EligibleNft {
    pub fn key(&self) -> NftKey {
        NftKey::new(&self.contract_address, &self.token_id)
    }
}

/// What the resolver reports for a wallet
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NftPoints {
    pub total_points: f64,
    pub eligible_nfts: Vec<EligibleNft>,
}

impl NftPoints {
    pub fn none() -> Self {
        Self::default()
    }

    /// Drop NFTs in `used` and recompute the total from what remains.
    ///
    /// Returns `self` untouched when nothing was used, so a resolver total
    /// that isn't a plain per-NFT sum survives. When every NFT carries its
    /// own points the remaining ones are summed; otherwise the resolver total
    /// is split evenly and the remaining NFTs keep their shares.
    pub fn excluding(self, used: &HashSet<NftKey>) -> Self {
        if used.is_empty() || !self.eligible_nfts.iter().any(|nft| used.contains(&nft.key())) {
            return self;
        }

        let held = self.eligible_nfts.len();
        let fully_priced = self.eligible_nfts.iter().all(|nft| nft.points.is_some());
        let resolver_total = self.total_points.max(0.0);

        let eligible_nfts: Vec<EligibleNft> = self
            .eligible_nfts
            .into_iter()
            .filter(|nft| !used.contains(&nft.key()))
            .collect();

        let total_points = if fully_priced {
            eligible_nfts
                .iter()
                .filter_map(|nft| nft.points)
                .map(|points| points.max(0.0))
                .sum()
        } else {
            resolver_total * eligible_nfts.len() as f64 / held as f64
        };

        Self {
            total_points,
            eligible_nfts,
        }
    }
}
