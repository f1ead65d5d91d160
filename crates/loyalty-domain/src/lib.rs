// Domain layer - Pure business logic
// No dependencies on infrastructure or presentation layers

pub mod check_in;
pub mod nft;
pub mod shared;
pub mod user;

// Re-exports for convenience
pub use shared::{DomainError, WalletAddress};
