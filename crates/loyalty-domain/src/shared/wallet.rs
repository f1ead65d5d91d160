use serde::{Deserialize, Serialize};

use super::DomainError;

/// Wallet address normalized to lowercase.
///
/// Every lookup and write against the store goes through this type, so two
/// spellings of the same checksummed address always hit the same user row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::Validation(
                "Wallet address is required".to_string(),
            ));
        }

        Ok(Self(trimmed.to_lowercase()))
    }

    /// Rebuild from a value that was already normalized by the store
    pub fn from_normalized(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
