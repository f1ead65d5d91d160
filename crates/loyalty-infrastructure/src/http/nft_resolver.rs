use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::{build_client, join_segments, HttpClientError};
use loyalty_domain::nft::{EligibleNft, NftPoints, NftPointsResolver};
use loyalty_domain::shared::{DomainError, WalletAddress};

/// Wire shape of `GET /wallets/{wallet}/nft-points`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NftPointsResponse {
    #[serde(default)]
    total_points: Option<f64>,
    #[serde(default)]
    eligible_nfts: Vec<EligibleNft>,
}

impl From<NftPointsResponse> for NftPoints {
    fn from(response: NftPointsResponse) -> Self {
        NftPoints {
            total_points: response.total_points.unwrap_or(0.0),
            eligible_nfts: response.eligible_nfts,
        }
    }
}

/// Resolves a wallet's NFT holdings over HTTP. No retries.
pub struct HttpNftPointsResolver {
    client: Client,
    base_url: Url,
}

impl HttpNftPointsResolver {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DomainError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| HttpClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        let client = build_client(timeout)?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, wallet_address: &WalletAddress) -> Result<Url, HttpClientError> {
        join_segments(
            &self.base_url,
            &["wallets", wallet_address.as_str(), "nft-points"],
        )
    }

    async fn fetch(&self, wallet_address: &WalletAddress) -> Result<NftPoints, HttpClientError> {
        let url = self.endpoint(wallet_address)?;
        debug!("Resolving NFT points: GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(HttpClientError::from_send)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HttpClientError::Status { status, body });
        }

        let payload: NftPointsResponse = response.json().await.map_err(HttpClientError::Decode)?;
        Ok(payload.into())
    }
}

#[async_trait]
impl NftPointsResolver for HttpNftPointsResolver {
    async fn resolve(&self, wallet_address: &WalletAddress) -> Result<NftPoints, DomainError> {
        let points = self.fetch(wallet_address).await?;

        debug!(
            "Resolved {} eligible NFTs ({} points) for {}",
            points.eligible_nfts.len(),
            points.total_points,
            wallet_address
        );
        Ok(points)
    }
}
