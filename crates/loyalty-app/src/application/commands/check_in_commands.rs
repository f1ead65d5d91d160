use chrono::{DateTime, Utc};

use crate::application::commands::command_handler::Command;
use crate::application::services::NftUsageReport;
use loyalty_domain::check_in::{CheckInRecord, Multiplier};
use loyalty_domain::user::LoyaltyUser;

/// Execute check-in command
#[derive(Debug, Clone)]
pub struct ExecuteCheckInCommand {
    pub wallet_address: String,
    pub transaction_hash: Option<String>,
}

impl Command for ExecuteCheckInCommand {}

/// Everything a successful check-in produced
#[derive(Debug, Clone, PartialEq)]
pub struct CheckInReceipt {
    pub user: LoyaltyUser,
    pub check_in: CheckInRecord,
    pub points_earned: f64,
    pub multiplier: Multiplier,
    pub nft_usage: NftUsageReport,
}

/// Execute check-in command result
#[derive(Debug, Clone, PartialEq)]
pub enum CheckInOutcome {
    Completed(CheckInReceipt),
    /// The wallet already checked in within the last 24 hours
    Rejected {
        user: LoyaltyUser,
        last_check_in: DateTime<Utc>,
        next_eligible_at: DateTime<Utc>,
    },
}
