use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::DataResponse;
use crate::application::dtos::UserDto;
use crate::presentation::error::ApiError;
use crate::presentation::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserDataParams {
    pub wallet_address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecentUsersParams {
    pub limit: Option<u32>,
}

/// `GET /user-data?wallet_address=...`
pub async fn get_user_data(
    State(state): State<AppState>,
    Query(params): Query<UserDataParams>,
) -> Result<Json<DataResponse<Option<UserDto>>>, ApiError> {
    let wallet_address = params.wallet_address.unwrap_or_default();
    let data = state.queries.users.get_user_data(&wallet_address).await?;
    Ok(Json(DataResponse { data }))
}

/// `GET /users?limit=N`, most recently active first
pub async fn list_recent_users(
    State(state): State<AppState>,
    Query(params): Query<RecentUsersParams>,
) -> Result<Json<DataResponse<Vec<UserDto>>>, ApiError> {
    let data = state.queries.users.list_recent(params.limit).await?;
    Ok(Json(DataResponse { data }))
}
