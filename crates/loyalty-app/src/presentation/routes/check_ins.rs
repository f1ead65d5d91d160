use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::DataResponse;
use crate::application::dtos::CheckInHistoryDto;
use crate::presentation::error::ApiError;
use crate::presentation::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckInHistoryParams {
    pub wallet_address: Option<String>,
    pub limit: Option<u32>,
}

/// `GET /check-ins?wallet_address=...&limit=N`, newest first
pub async fn get_check_in_history(
    State(state): State<AppState>,
    Query(params): Query<CheckInHistoryParams>,
) -> Result<Json<DataResponse<Vec<CheckInHistoryDto>>>, ApiError> {
    let wallet_address = params.wallet_address.unwrap_or_default();
    let data = state
        .queries
        .check_in_history
        .history(&wallet_address, params.limit)
        .await?;
    Ok(Json(DataResponse { data }))
}
