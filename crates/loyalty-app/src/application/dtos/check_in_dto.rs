use serde::{Deserialize, Serialize};

use super::UserDto;
use crate::application::commands::check_in_commands::CheckInReceipt;
use crate::application::services::NftUsageReport;
use loyalty_domain::check_in::CheckInRecord;
use loyalty_domain::nft::NftUsage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInDto {
    pub id: String,
    pub user_id: String,
    pub wallet_address: String,
    pub streak_count: u32,
    pub points_earned: f64,
    pub multiplier: f64,
    pub transaction_hash: Option<String>,
    pub created_at: String,
}

impl From<&CheckInRecord> for CheckInDto {
    fn from(record: &CheckInRecord) -> Self {
        Self {
            id: record.id().as_str().to_string(),
            user_id: record.user_id().as_str().to_string(),
            wallet_address: record.wallet_address().as_str().to_string(),
            streak_count: record.streak_count(),
            points_earned: record.points_earned(),
            multiplier: record.multiplier().value(),
            transaction_hash: record.transaction_hash().map(str::to_string),
            created_at: record.created_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftUsageDto {
    pub token_id: String,
    pub contract_address: String,
    pub usage_date: String, // YYYY-MM-DD
}

impl From<&NftUsage> for NftUsageDto {
    fn from(usage: &NftUsage) -> Self {
        Self {
            token_id: usage.key().token_id.clone(),
            contract_address: usage.key().contract_address.clone(),
            usage_date: usage.usage_date().format("%Y-%m-%d").to_string(),
        }
    }
}

/// One entry of a wallet's check-in history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInHistoryDto {
    #[serde(flatten)]
    pub check_in: CheckInDto,
    pub nft_usage: Vec<NftUsageDto>,
}

/// Body of a successful `POST /check-in`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInResponseDto {
    pub success: bool,
    pub user: UserDto,
    pub check_in: CheckInDto,
    pub points_earned: f64,
    pub multiplier: f64,
    pub nft_usage: NftUsageReport,
}

impl From<&CheckInReceipt> for CheckInResponseDto {
    fn from(receipt: &CheckInReceipt) -> Self {
        Self {
            success: true,
            user: UserDto::from(&receipt.user),
            check_in: CheckInDto::from(&receipt.check_in),
            points_earned: receipt.points_earned,
            multiplier: receipt.multiplier.value(),
            nft_usage: receipt.nft_usage.clone(),
        }
    }
}
