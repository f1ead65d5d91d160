use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

use crate::persistence::SqliteRepositoryBase;
use loyalty_domain::check_in::{CheckInRecord, CheckInRepository, Multiplier};
use loyalty_domain::shared::{CheckInId, DomainError, UserId, WalletAddress};

const CHECK_IN_COLUMNS: &str = "id, user_id, wallet_address, streak_count, points_earned, multiplier, transaction_hash, created_at";

#[derive(FromRow)]
struct CheckInRow {
    id: String,
    user_id: String,
    wallet_address: String,
    streak_count: i64,
    points_earned: f64,
    multiplier: f64,
    transaction_hash: Option<String>,
    created_at: DateTime<Utc>,
}

impl CheckInRow {
    fn try_into_record(self) -> Result<CheckInRecord, DomainError> {
        let streak_count = u32::try_from(self.streak_count).map_err(|_| {
            DomainError::DataIntegrity(format!(
                "check_ins.streak_count out of range: {}",
                self.streak_count
            ))
        })?;
        let multiplier = Multiplier::from_value(self.multiplier).ok_or_else(|| {
            DomainError::DataIntegrity(format!(
                "check_ins.multiplier is not a known tier: {}",
                self.multiplier
            ))
        })?;

        Ok(CheckInRecord::restore(
            CheckInId::from_string(&self.id),
            UserId::from_string(&self.user_id),
            WalletAddress::from_normalized(self.wallet_address),
            streak_count,
            self.points_earned,
            multiplier,
            self.transaction_hash,
            self.created_at,
        ))
    }
}

pub struct SqliteCheckInRepository {
    base: SqliteRepositoryBase,
}

impl SqliteCheckInRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
        }
    }
}

#[async_trait]
impl CheckInRepository for SqliteCheckInRepository {
    async fn save(&self, record: &CheckInRecord) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO check_ins (
                id,
                user_id,
                wallet_address,
                streak_count,
                points_earned,
                multiplier,
                transaction_hash,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#;

        self.base
            .execute(
                sqlx::query(query)
                    .bind(record.id().as_str())
                    .bind(record.user_id().as_str())
                    .bind(record.wallet_address().as_str())
                    .bind(i64::from(record.streak_count()))
                    .bind(record.points_earned())
                    .bind(record.multiplier().value())
                    .bind(record.transaction_hash())
                    .bind(record.created_at()),
                "Save check-in",
            )
            .await?;

        Ok(())
    }

    async fn find_by_wallet(
        &self,
        wallet_address: &WalletAddress,
        limit: u32,
    ) -> Result<Vec<CheckInRecord>, DomainError> {
        let query = format!(
            "SELECT {} FROM check_ins WHERE wallet_address = ?1 ORDER BY created_at DESC LIMIT ?2",
            CHECK_IN_COLUMNS
        );

        let rows: Vec<CheckInRow> = self
            .base
            .fetch_all(
                sqlx::query_as(&query)
                    .bind(wallet_address.as_str())
                    .bind(i64::from(limit)),
                "Find check-ins by wallet",
            )
            .await?;

        rows.into_iter().map(|r| r.try_into_record()).collect()
    }
}
