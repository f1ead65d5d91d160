use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

use crate::persistence::{ResultExt, SqliteRepositoryBase};
use loyalty_domain::shared::{DomainError, UserId, WalletAddress};
use loyalty_domain::user::{LoyaltyUser, UserRepository};

const USER_COLUMNS: &str = "id, wallet_address, current_streak, max_streak, total_check_ins, total_points, last_check_in, created_at";

#[derive(FromRow)]
struct UserRow {
    id: String,
    wallet_address: String,
    current_streak: i64,
    max_streak: i64,
    total_check_ins: i64,
    total_points: f64,
    last_check_in: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn try_into_user(self) -> Result<LoyaltyUser, DomainError> {
        Ok(LoyaltyUser::restore(
            UserId::from_string(&self.id),
            WalletAddress::from_normalized(self.wallet_address),
            to_count(self.current_streak, "current_streak")?,
            to_count(self.max_streak, "max_streak")?,
            to_count(self.total_check_ins, "total_check_ins")?,
            self.total_points,
            self.last_check_in,
            self.created_at,
        ))
    }
}

fn to_count(value: i64, column: &str) -> Result<u32, DomainError> {
    u32::try_from(value).map_err(|_| {
        DomainError::DataIntegrity(format!("users.{} out of range: {}", column, value))
    })
}

pub struct SqliteUserRepository {
    base: SqliteRepositoryBase,
}

impl SqliteUserRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
        }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_wallet(
        &self,
        wallet_address: &WalletAddress,
    ) -> Result<Option<LoyaltyUser>, DomainError> {
        let query = format!("SELECT {} FROM users WHERE wallet_address = ?1", USER_COLUMNS);

        let row: Option<UserRow> = self
            .base
            .fetch_optional(
                sqlx::query_as(&query).bind(wallet_address.as_str()),
                "Find user by wallet",
            )
            .await?;

        row.map(|r| r.try_into_user()).transpose()
    }

    async fn create(&self, user: &LoyaltyUser) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO users (
                id,
                wallet_address,
                current_streak,
                max_streak,
                total_check_ins,
                total_points,
                last_check_in,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#;

        self.base
            .execute(
                sqlx::query(query)
                    .bind(user.id().as_str())
                    .bind(user.wallet_address().as_str())
                    .bind(i64::from(user.current_streak()))
                    .bind(i64::from(user.max_streak()))
                    .bind(i64::from(user.total_check_ins()))
                    .bind(user.total_points())
                    .bind(user.last_check_in())
                    .bind(user.created_at()),
                "Create user",
            )
            .await?;

        debug!("Created user {} for wallet {}", user.id(), user.wallet_address());
        Ok(())
    }

    async fn record_check_in(
        &self,
        user: &LoyaltyUser,
        expected_total_check_ins: u32,
    ) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE users SET
                current_streak = ?2,
                max_streak = ?3,
                total_check_ins = ?4,
                last_check_in = ?5
            WHERE wallet_address = ?1 AND total_check_ins = ?6
        "#;

        let result = self
            .base
            .execute(
                sqlx::query(query)
                    .bind(user.wallet_address().as_str())
                    .bind(i64::from(user.current_streak()))
                    .bind(i64::from(user.max_streak()))
                    .bind(i64::from(user.total_check_ins()))
                    .bind(user.last_check_in())
                    .bind(i64::from(expected_total_check_ins)),
                "Record user check-in",
            )
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn add_points(
        &self,
        wallet_address: &WalletAddress,
        points: f64,
    ) -> Result<f64, DomainError> {
        let query = r#"
            UPDATE users SET total_points = total_points + ?2
            WHERE wallet_address = ?1
            RETURNING total_points
        "#;

        let total: Option<f64> = sqlx::query_scalar(query)
            .bind(wallet_address.as_str())
            .bind(points)
            .fetch_optional(self.base.pool())
            .await
            .map_repo_error("Add user points")?;

        total.ok_or_else(|| {
            DomainError::NotFound(format!("No user for wallet {}", wallet_address))
        })
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<LoyaltyUser>, DomainError> {
        let query = format!(
            "SELECT {} FROM users ORDER BY last_check_in DESC LIMIT ?1",
            USER_COLUMNS
        );

        let rows: Vec<UserRow> = self
            .base
            .fetch_all(
                sqlx::query_as(&query).bind(i64::from(limit)),
                "List recent users",
            )
            .await?;

        rows.into_iter().map(|r| r.try_into_user()).collect()
    }
}
