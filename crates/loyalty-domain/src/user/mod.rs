mod aggregate;
mod repository;

pub use aggregate::LoyaltyUser;
pub use repository::UserRepository;
