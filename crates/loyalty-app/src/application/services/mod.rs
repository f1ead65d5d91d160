mod nft_points_service;

pub use nft_points_service::{NftPointsService, NftUsageFailure, NftUsageReport};
