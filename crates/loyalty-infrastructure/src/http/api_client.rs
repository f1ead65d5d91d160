use log::debug;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::{build_client, join_segments, HttpClientError};
use loyalty_domain::shared::DomainError;

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: String,
}

/// Thin client for the loyalty HTTP API, used by the `loyalty-client` binary.
///
/// Users come back as raw JSON so the caller can print them verbatim.
pub struct LoyaltyApiClient {
    client: Client,
    base_url: Url,
}

impl LoyaltyApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DomainError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| HttpClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        let client = build_client(timeout)?;

        Ok(Self { client, base_url })
    }

    /// `GET /user-data`; `Ok(None)` when the wallet has never checked in
    pub async fn get_user_data(&self, wallet_address: &str) -> Result<Option<Value>, DomainError> {
        let mut url = join_segments(&self.base_url, &["user-data"])?;
        url.query_pairs_mut()
            .append_pair("wallet_address", wallet_address);

        let envelope: DataEnvelope<Option<Value>> = self.get_json(url).await?;
        Ok(envelope.data)
    }

    /// `GET /users?limit=N`
    pub async fn list_recent_users(&self, limit: u32) -> Result<Vec<Value>, DomainError> {
        let mut url = join_segments(&self.base_url, &["users"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());

        let envelope: DataEnvelope<Vec<Value>> = self.get_json(url).await?;
        Ok(envelope.data)
    }

    async fn get_json<T>(&self, url: Url) -> Result<T, HttpClientError>
    where
        T: for<'de> Deserialize<'de>,
    {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(HttpClientError::from_send)?;

        let response = ensure_success(response).await?;
        response.json().await.map_err(HttpClientError::Decode)
    }
}

/// Non-2xx responses carry `{error}`; surface that message when present.
async fn ensure_success(response: Response) -> Result<Response, HttpClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let raw = response.text().await.unwrap_or_default();
    let body = serde_json::from_str::<ErrorEnvelope>(&raw)
        .map(|envelope| envelope.error)
        .unwrap_or(raw);

    Err(HttpClientError::Status { status, body })
}
