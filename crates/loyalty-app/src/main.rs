use anyhow::Context;
use loyalty_infrastructure::config::AppConfig;
use loyalty_lib::presentation::{router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Invalid configuration")?;

    match loyalty_infrastructure::logging::init_logger(&config.log_dir) {
        Ok(_) => {
            tracing::info!("🚀 Loyalty service starting...");
            tracing::info!("📝 File logging initialized at: {}", config.log_dir.display());
        }
        Err(e) => {
            eprintln!("⚠️  Failed to initialize file logging: {}", e);
            eprintln!("   Falling back to console logging only");

            let _ = tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
                )
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .try_init();
        }
    }

    let state = match AppState::new(&config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("❌ Failed to initialize app state: {:#}", e);
            return Err(e);
        }
    };

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("✅ Listening on http://{}", config.bind_addr);

    axum::serve(listener, router(state))
        .await
        .context("HTTP server stopped")?;

    Ok(())
}
