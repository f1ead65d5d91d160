use loyalty_domain::shared::DomainError;
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum HttpClientError {
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl HttpClientError {
    pub(crate) fn from_send(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err)
        } else {
            Self::Request(err)
        }
    }
}

impl From<HttpClientError> for DomainError {
    fn from(err: HttpClientError) -> Self {
        match err {
            HttpClientError::Build(_) | HttpClientError::InvalidUrl(_) => {
                DomainError::Infrastructure(err.to_string())
            }
            HttpClientError::Timeout(_) => DomainError::Timeout(err.to_string()),
            HttpClientError::Request(_) => DomainError::Network(err.to_string()),
            other => DomainError::ExternalService(other.to_string()),
        }
    }
}
