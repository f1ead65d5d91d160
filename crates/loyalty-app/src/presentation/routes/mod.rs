use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;

use crate::presentation::middleware::log_requests;
use crate::presentation::state::AppState;

mod check_in;
mod check_ins;
mod health;
mod users;

/// `{data: ...}` envelope shared by the read endpoints
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/check-in", post(check_in::execute_check_in))
        .route("/user-data", get(users::get_user_data))
        .route("/users", get(users::list_recent_users))
        .route("/check-ins", get(check_ins::get_check_in_history))
        .route("/health", get(health::health))
        .layer(axum::middleware::from_fn(log_requests))
        .with_state(state)
}
