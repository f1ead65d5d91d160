use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use loyalty_domain::shared::{DomainError, ErrorCode, ErrorSeverity};
use serde::Serialize;

/// Structured error response for HTTP handlers
///
/// Carries the domain error code alongside the message so clients can
/// branch on `code` rather than parse `error`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,

    /// Human-readable error message
    #[serde(rename = "error")]
    pub message: String,

    /// Numeric error code (2xxx-6xxx range)
    pub code: u16,

    pub severity: ErrorSeverity,

    /// Whether the request can be retried as-is
    pub recoverable: bool,
}

impl ApiError {
    pub fn from_code(status: StatusCode, error_code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: error_code.code(),
            severity: error_code.severity(),
            recoverable: error_code.is_recoverable(),
        }
    }

    /// Replace the client-facing message, keeping code and status
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationError | ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorCode::UserNotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let code = err.code();
        Self::from_code(status_for(code), code, err.message())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
