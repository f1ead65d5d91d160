mod resolver;
mod usage;
mod value_objects;

pub use resolver::NftPointsResolver;
pub use usage::{NftUsage, NftUsageRepository};
pub use value_objects::{EligibleNft, NftKey, NftPoints};
