use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use std::sync::Arc;

use crate::persistence::{ResultExt, SqliteRepositoryBase};
use loyalty_domain::nft::{NftKey, NftUsage, NftUsageRepository};
use loyalty_domain::shared::{CheckInId, DomainError, NftUsageId, WalletAddress};

const USAGE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(FromRow)]
struct NftUsageRow {
    id: String,
    token_id: String,
    contract_address: String,
    wallet_address: String,
    check_in_id: String,
    usage_date: String,
    created_at: DateTime<Utc>,
}

impl NftUsageRow {
    fn try_into_usage(self) -> Result<NftUsage, DomainError> {
        let usage_date = parse_usage_date(&self.usage_date)?;

        Ok(NftUsage::restore(
            NftUsageId::from_string(&self.id),
            NftKey::new(self.contract_address, self.token_id),
            WalletAddress::from_normalized(self.wallet_address),
            CheckInId::from_string(&self.check_in_id),
            usage_date,
            self.created_at,
        ))
    }
}

#[derive(FromRow)]
struct NftKeyRow {
    contract_address: String,
    token_id: String,
}

fn format_usage_date(date: NaiveDate) -> String {
    date.format(USAGE_DATE_FORMAT).to_string()
}

fn parse_usage_date(raw: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(raw, USAGE_DATE_FORMAT).map_err(|e| {
        DomainError::DataIntegrity(format!("nft_usage.usage_date '{}' is invalid: {}", raw, e))
    })
}

pub struct SqliteNftUsageRepository {
    base: SqliteRepositoryBase,
}

impl SqliteNftUsageRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
        }
    }
}

#[async_trait]
impl NftUsageRepository for SqliteNftUsageRepository {
    async fn record(&self, usage: &NftUsage) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO nft_usage (
                id,
                token_id,
                contract_address,
                wallet_address,
                check_in_id,
                usage_date,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#;

        self.base
            .execute(
                sqlx::query(query)
                    .bind(usage.id().as_str())
                    .bind(&usage.key().token_id)
                    .bind(&usage.key().contract_address)
                    .bind(usage.wallet_address().as_str())
                    .bind(usage.check_in_id().as_str())
                    .bind(format_usage_date(usage.usage_date()))
                    .bind(usage.created_at()),
                "Record NFT usage",
            )
            .await?;

        Ok(())
    }

    async fn find_used_on(
        &self,
        keys: &[NftKey],
        date: NaiveDate,
    ) -> Result<Vec<NftKey>, DomainError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT contract_address, token_id FROM nft_usage WHERE usage_date = ",
        );
        builder.push_bind(format_usage_date(date));
        builder.push(" AND (");

        let mut separated = builder.separated(" OR ");
        for key in keys {
            separated.push("(contract_address = ");
            separated.push_bind_unseparated(key.contract_address.clone());
            separated.push_unseparated(" AND token_id = ");
            separated.push_bind_unseparated(key.token_id.clone());
            separated.push_unseparated(")");
        }
        builder.push(")");

        let rows: Vec<NftKeyRow> = builder
            .build_query_as()
            .fetch_all(self.base.pool())
            .await
            .map_repo_error("Find NFTs used on date")?;

        Ok(rows
            .into_iter()
            .map(|row| NftKey::new(row.contract_address, row.token_id))
            .collect())
    }

    async fn find_by_check_in(&self, check_in_id: &CheckInId) -> Result<Vec<NftUsage>, DomainError> {
        let query = r#"
            SELECT id, token_id, contract_address, wallet_address, check_in_id, usage_date, created_at
            FROM nft_usage
            WHERE check_in_id = ?1
            ORDER BY created_at ASC, contract_address ASC, token_id ASC
        "#;

        let rows: Vec<NftUsageRow> = self
            .base
            .fetch_all(
                sqlx::query_as(query).bind(check_in_id.as_str()),
                "Find NFT usage by check-in",
            )
            .await?;

        rows.into_iter().map(|r| r.try_into_usage()).collect()
    }
}
