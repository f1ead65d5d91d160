pub mod check_in_repo;
pub mod nft_usage_repo;
pub mod user_repo;

pub use check_in_repo::SqliteCheckInRepository;
pub use nft_usage_repo::SqliteNftUsageRepository;
pub use user_repo::SqliteUserRepository;
