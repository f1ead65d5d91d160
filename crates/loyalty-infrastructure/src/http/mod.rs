mod api_client;
mod error;
mod nft_resolver;

pub use api_client::LoyaltyApiClient;
pub use error::HttpClientError;
pub use nft_resolver::HttpNftPointsResolver;

use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!("loyalty/", env!("CARGO_PKG_VERSION"));

/// Shared reqwest client; every request is bounded by `timeout`.
pub(crate) fn build_client(timeout: Duration) -> Result<Client, HttpClientError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(HttpClientError::Build)
}

/// Append path segments to `base`, tolerating a trailing slash on it.
pub(crate) fn join_segments(base: &url::Url, segments: &[&str]) -> Result<url::Url, HttpClientError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| HttpClientError::InvalidUrl(format!("{} cannot be a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
