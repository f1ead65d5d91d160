use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod wallet;

pub use wallet::WalletAddress;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn from_string(s: &str) -> Self {
                Self(s.to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

define_id!(UserId);
define_id!(CheckInId);
define_id!(NftUsageId);

/// Error codes for structured error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Resource Not Found (2xxx)
    UserNotFound = 2001,

    // Business Logic (3xxx)
    CheckInFailed = 3001,
    AlreadyCheckedIn = 3002,

    // Data & Persistence (4xxx)
    RepositoryError = 4001,
    DatabaseConstraintViolation = 4002,
    DataIntegrityError = 4003,
    SerializationError = 4004,

    // Infrastructure (5xxx)
    InfrastructureError = 5001,
    NetworkError = 5002,
    TimeoutError = 5003,
    ExternalServiceError = 5004,

    // Validation (6xxx)
    ValidationError = 6001,
    InvalidInput = 6002,
}

impl ErrorCode {
    /// Get error code as integer
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ErrorCode::AlreadyCheckedIn
            | ErrorCode::CheckInFailed
            | ErrorCode::NetworkError => ErrorSeverity::Warning,

            ErrorCode::UserNotFound
            | ErrorCode::ValidationError
            | ErrorCode::InvalidInput => ErrorSeverity::Info,

            ErrorCode::DataIntegrityError
            | ErrorCode::DatabaseConstraintViolation
            | ErrorCode::RepositoryError
            | ErrorCode::InfrastructureError => ErrorSeverity::Error,

            _ => ErrorSeverity::Warning,
        }
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorCode::NetworkError
                | ErrorCode::TimeoutError
                | ErrorCode::ExternalServiceError
                | ErrorCode::CheckInFailed
        )
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Check-in failed: {0}")]
    CheckInFailed(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DomainError {
    /// Get error code
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::Validation(_) => ErrorCode::ValidationError,
            DomainError::InvalidInput(_) => ErrorCode::InvalidInput,
            DomainError::NotFound(_) => ErrorCode::UserNotFound,
            DomainError::CheckInFailed(_) => ErrorCode::CheckInFailed,
            DomainError::Repository(_) => ErrorCode::RepositoryError,
            DomainError::ConstraintViolation(_) => ErrorCode::DatabaseConstraintViolation,
            DomainError::DataIntegrity(_) => ErrorCode::DataIntegrityError,
            DomainError::Infrastructure(_) => ErrorCode::InfrastructureError,
            DomainError::Network(_) => ErrorCode::NetworkError,
            DomainError::Timeout(_) => ErrorCode::TimeoutError,
            DomainError::ExternalService(_) => ErrorCode::ExternalServiceError,
            DomainError::Serialization(_) => ErrorCode::SerializationError,
        }
    }

    /// Get error message
    pub fn message(&self) -> &str {
        match self {
            DomainError::Validation(msg)
            | DomainError::InvalidInput(msg)
            | DomainError::NotFound(msg)
            | DomainError::CheckInFailed(msg)
            | DomainError::Repository(msg)
            | DomainError::ConstraintViolation(msg)
            | DomainError::DataIntegrity(msg)
            | DomainError::Infrastructure(msg)
            | DomainError::Network(msg)
            | DomainError::Timeout(msg)
            | DomainError::ExternalService(msg)
            | DomainError::Serialization(msg) => msg,
        }
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        self.code().severity()
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        self.code().is_recoverable()
    }

    /// True when the store rejected a write because of a uniqueness constraint
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, DomainError::ConstraintViolation(_))
    }

    /// Format error with code
    pub fn format_with_code(&self) -> String {
        format!("[{}] {}", self.code().code(), self)
    }
}
