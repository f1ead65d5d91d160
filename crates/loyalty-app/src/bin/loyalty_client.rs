//! Command-line view of the loyalty API.
//!
//! ```text
//! loyalty-client <wallet>        show one user
//! loyalty-client --recent [N]    list recently active users
//! ```

use anyhow::{bail, Context};
use serde_json::Value;
use std::time::Duration;

use loyalty_infrastructure::http::LoyaltyApiClient;

const ENV_API_URL: &str = "LOYALTY_API_URL";
const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_RECENT: u32 = 5;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

enum Request {
    User(String),
    Recent(u32),
}

fn parse_args(args: &[String]) -> anyhow::Result<Request> {
    match args {
        [flag] if flag == "--recent" => Ok(Request::Recent(DEFAULT_RECENT)),
        [flag, n] if flag == "--recent" => {
            let limit = n
                .parse()
                .with_context(|| format!("--recent expects a number, got '{}'", n))?;
            Ok(Request::Recent(limit))
        }
        [wallet] if !wallet.starts_with("--") => Ok(Request::User(wallet.clone())),
        _ => bail!("usage: loyalty-client <wallet> | loyalty-client --recent [N]"),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let request = parse_args(&args)?;

    let base_url = std::env::var(ENV_API_URL)
        .ok()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let client = LoyaltyApiClient::new(&base_url, REQUEST_TIMEOUT)?;

    match request {
        Request::User(wallet) => {
            println!("Loading user data for {}...", wallet);
            match client.get_user_data(&wallet).await {
                Ok(Some(user)) => println!("{}", pretty(&user)),
                Ok(None) => println!("No user data found for {}", wallet),
                Err(e) => println!("Error: {}", e),
            }
        }
        Request::Recent(limit) => {
            println!("Loading {} recent users...", limit);
            match client.list_recent_users(limit).await {
                Ok(users) if users.is_empty() => println!("No user data found"),
                Ok(users) => {
                    for user in &users {
                        println!("{}", pretty(user));
                    }
                }
                Err(e) => println!("Error: {}", e),
            }
        }
    }

    Ok(())
}
