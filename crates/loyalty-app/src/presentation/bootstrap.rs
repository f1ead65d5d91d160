use anyhow::Context;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::application::commands::handlers::ExecuteCheckInCommandHandler;
use crate::application::queries::{CheckInHistoryQueryService, UserQueryService};
use crate::application::services::NftPointsService;
use crate::presentation::state::{AppState, CommandHandlers, Queries};
use loyalty_domain::check_in::CheckInRepository;
use loyalty_domain::nft::{NftPointsResolver, NftUsageRepository};
use loyalty_domain::user::UserRepository;
use loyalty_infrastructure::config::AppConfig;
use loyalty_infrastructure::http::HttpNftPointsResolver;
use loyalty_infrastructure::persistence::{
    repositories::{SqliteCheckInRepository, SqliteNftUsageRepository, SqliteUserRepository},
    Database,
};

/// Open the database, apply migrations and wire every service for the server
pub async fn build_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let startup_started_at = Instant::now();

    info!("Database path: {}", config.database_path.display());

    info!("🔌 Connecting to database...");
    let started_at = Instant::now();
    let database = Database::new(&config.database_path, config.db_max_connections)
        .await
        .context("Failed to open database")?;
    info!(
        "✓ Database connection established ({}ms)",
        started_at.elapsed().as_millis()
    );

    info!("🔄 Running migrations...");
    let started_at = Instant::now();
    database
        .run_migrations()
        .await
        .context("Failed to run migrations")?;
    info!(
        "✓ Migrations completed ({}ms)",
        started_at.elapsed().as_millis()
    );

    let resolver = Arc::new(
        HttpNftPointsResolver::new(&config.nft_resolver_url, config.http_timeout)
            .context("Failed to build NFT resolver client")?,
    ) as Arc<dyn NftPointsResolver>;
    info!(
        "✓ NFT resolver at {} (timeout {}s)",
        config.nft_resolver_url,
        config.http_timeout.as_secs()
    );

    let state = wire_app_state(Arc::new(database.pool().clone()), resolver);

    info!(
        "✅ App state ready ({}ms)",
        startup_started_at.elapsed().as_millis()
    );
    Ok(state)
}

/// Build repositories, services and handlers on top of an open pool
pub fn wire_app_state(pool: Arc<SqlitePool>, resolver: Arc<dyn NftPointsResolver>) -> AppState {
    let user_repo = Arc::new(SqliteUserRepository::new(pool.clone())) as Arc<dyn UserRepository>;
    let check_in_repo =
        Arc::new(SqliteCheckInRepository::new(pool.clone())) as Arc<dyn CheckInRepository>;
    let nft_usage_repo =
        Arc::new(SqliteNftUsageRepository::new(pool)) as Arc<dyn NftUsageRepository>;

    let nft_points = Arc::new(NftPointsService::new(resolver, nft_usage_repo.clone()));

    let command_handlers = CommandHandlers {
        execute_check_in: Arc::new(ExecuteCheckInCommandHandler::new(
            user_repo.clone(),
            check_in_repo.clone(),
            nft_points,
        )),
    };

    let queries = Queries {
        users: Arc::new(UserQueryService::new(user_repo)),
        check_in_history: Arc::new(CheckInHistoryQueryService::new(
            check_in_repo,
            nft_usage_repo,
        )),
    };

    AppState {
        queries: Arc::new(queries),
        command_handlers: Arc::new(command_handlers),
    }
}
