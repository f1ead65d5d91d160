use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use loyalty_domain::shared::DomainError;

pub const ENV_BIND_ADDR: &str = "LOYALTY_BIND_ADDR";
pub const ENV_DATABASE_PATH: &str = "LOYALTY_DATABASE_PATH";
pub const ENV_DB_MAX_CONNECTIONS: &str = "LOYALTY_DB_MAX_CONNECTIONS";
pub const ENV_NFT_RESOLVER_URL: &str = "LOYALTY_NFT_RESOLVER_URL";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "LOYALTY_HTTP_TIMEOUT_SECS";
pub const ENV_LOG_DIR: &str = "LOYALTY_LOG_DIR";

const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_NFT_RESOLVER_URL: &str = "http://127.0.0.1:8090";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Runtime settings for the server binary
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub db_max_connections: u32,
    /// Base URL, validated on load
    pub nft_resolver_url: String,
    /// Applies to every outbound HTTP request
    pub http_timeout: Duration,
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            database_path: default_database_path(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            nft_resolver_url: DEFAULT_NFT_RESOLVER_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            log_dir: default_data_dir().join("logs"),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `LOYALTY_*` variables from the process environment
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();

        if let Some(raw) = get(ENV_BIND_ADDR) {
            config.bind_addr = raw
                .parse()
                .map_err(|e| invalid(ENV_BIND_ADDR, &raw, e))?;
        }

        if let Some(raw) = get(ENV_DATABASE_PATH) {
            config.database_path = PathBuf::from(raw);
        }

        if let Some(raw) = get(ENV_DB_MAX_CONNECTIONS) {
            let value: u32 = raw
                .parse()
                .map_err(|e| invalid(ENV_DB_MAX_CONNECTIONS, &raw, e))?;
            if value == 0 {
                return Err(invalid(ENV_DB_MAX_CONNECTIONS, &raw, "must be at least 1"));
            }
            config.db_max_connections = value;
        }

        if let Some(raw) = get(ENV_NFT_RESOLVER_URL) {
            Url::parse(&raw).map_err(|e| invalid(ENV_NFT_RESOLVER_URL, &raw, e))?;
            config.nft_resolver_url = raw;
        }

        if let Some(raw) = get(ENV_HTTP_TIMEOUT_SECS) {
            let secs: u64 = raw
                .parse()
                .map_err(|e| invalid(ENV_HTTP_TIMEOUT_SECS, &raw, e))?;
            if secs == 0 {
                return Err(invalid(ENV_HTTP_TIMEOUT_SECS, &raw, "must be at least 1"));
            }
            config.http_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = get(ENV_LOG_DIR) {
            config.log_dir = PathBuf::from(raw);
        }

        Ok(config)
    }

    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    pub fn with_db_max_connections(mut self, max_connections: u32) -> Self {
        self.db_max_connections = max_connections.max(1);
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }
}

fn invalid(key: &str, raw: &str, reason: impl std::fmt::Display) -> DomainError {
    DomainError::InvalidInput(format!("{}='{}' is invalid: {}", key, raw, reason))
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("loyalty")
}

fn default_database_path() -> PathBuf {
    let file_name = if cfg!(debug_assertions) {
        "loyalty-dev.db"
    } else {
        "loyalty.db"
    };
    default_data_dir().join(file_name)
}
