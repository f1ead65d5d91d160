#![allow(dead_code)]

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use loyalty_domain::check_in::{CheckInEngine, CheckInRecord};
use loyalty_domain::user::LoyaltyUser;
use loyalty_domain::WalletAddress;
use loyalty_infrastructure::persistence::Database;

/// Fresh in-memory database with the schema applied
pub async fn setup_in_memory_db() -> SqlitePool {
    let database = Database::in_memory()
        .await
        .expect("open in-memory database");
    database
        .run_migrations()
        .await
        .expect("run migrations");
    database.pool().clone()
}

pub fn wallet(raw: &str) -> WalletAddress {
    WalletAddress::parse(raw).expect("valid wallet")
}

pub fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

/// A user as it looks right after its first check-in at `when`
pub fn first_time_user(raw_wallet: &str, when: DateTime<Utc>) -> LoyaltyUser {
    match CheckInEngine::decide(None, when) {
        loyalty_domain::check_in::CheckInDecision::Accepted(advance) => {
            LoyaltyUser::first_check_in(wallet(raw_wallet), &advance).expect("first check-in")
        }
        other => panic!("first check-in must be accepted, got {:?}", other),
    }
}

pub fn check_in_for(user: &LoyaltyUser, nft_points: f64, tx_hash: Option<&str>) -> CheckInRecord {
    let award = CheckInEngine::award(user.current_streak(), nft_points);
    CheckInRecord::new(
        user.id().clone(),
        user.wallet_address().clone(),
        user.current_streak(),
        &award,
        tx_hash.map(str::to_string),
        user.last_check_in(),
    )
}
