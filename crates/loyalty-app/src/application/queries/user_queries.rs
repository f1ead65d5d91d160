use log::debug;
use std::sync::Arc;

use super::clamp_limit;
use crate::application::dtos::UserDto;
use loyalty_domain::shared::{DomainError, WalletAddress};
use loyalty_domain::user::UserRepository;

pub const DEFAULT_RECENT_USERS: u32 = 5;
pub const MAX_RECENT_USERS: u32 = 100;

/// User query service
/// Read-only projections of stored users
pub struct UserQueryService {
    user_repo: Arc<dyn UserRepository>,
}

impl UserQueryService {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    /// `Ok(None)` when the wallet has never checked in
    pub async fn get_user_data(&self, wallet_address: &str) -> Result<Option<UserDto>, DomainError> {
        let wallet = WalletAddress::parse(wallet_address)?;
        let user = self.user_repo.find_by_wallet(&wallet).await?;

        debug!("[user-data] {} found={}", wallet, user.is_some());
        Ok(user.as_ref().map(UserDto::from))
    }

    /// Most recently active users first
    pub async fn list_recent(&self, limit: Option<u32>) -> Result<Vec<UserDto>, DomainError> {
        let limit = clamp_limit(limit, DEFAULT_RECENT_USERS, MAX_RECENT_USERS);
        let users = self.user_repo.list_recent(limit).await?;
        Ok(users.iter().map(UserDto::from).collect())
    }
}
