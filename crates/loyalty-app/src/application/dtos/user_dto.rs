use serde::{Deserialize, Serialize};

use loyalty_domain::user::LoyaltyUser;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: String,
    pub wallet_address: String,
    pub current_streak: u32,
    pub max_streak: u32,
    pub total_check_ins: u32,
    pub total_points: f64,
    pub last_check_in: String, // RFC 3339, UTC
    pub created_at: String,
}

impl From<&LoyaltyUser> for UserDto {
    fn from(user: &LoyaltyUser) -> Self {
        Self {
            id: user.id().as_str().to_string(),
            wallet_address: user.wallet_address().as_str().to_string(),
            current_streak: user.current_streak(),
            max_streak: user.max_streak(),
            total_check_ins: user.total_check_ins(),
            total_points: user.total_points(),
            last_check_in: user.last_check_in().to_rfc3339(),
            created_at: user.created_at().to_rfc3339(),
        }
    }
}
