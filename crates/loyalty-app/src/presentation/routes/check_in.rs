use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::application::commands::check_in_commands::*;
use crate::application::commands::command_handler::CommandHandler;
use crate::application::dtos::{CheckInResponseDto, UserDto};
use crate::presentation::error::ApiError;
use crate::presentation::state::AppState;
use loyalty_domain::shared::{DomainError, ErrorCode};

const ALREADY_CHECKED_IN: &str = "Already checked in today";
const CHECK_IN_FAILED: &str = "Failed to process check-in";

#[derive(Debug, Default, Deserialize)]
pub struct CheckInRequest {
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
}

impl CheckInRequest {
    /// Anything that isn't a JSON object with the expected fields reads as an empty request
    fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
struct RejectedResponse {
    error: &'static str,
    code: u16,
    user: UserDto,
    last_check_in: String,
    next_eligible_at: String,
}

/// `POST /check-in`
pub async fn execute_check_in(State(state): State<AppState>, body: Bytes) -> Response {
    let request = CheckInRequest::from_body(&body);

    let command = ExecuteCheckInCommand {
        wallet_address: request.wallet_address.unwrap_or_default(),
        transaction_hash: request.transaction_hash,
    };

    let outcome = state
        .command_handlers
        .execute_check_in
        .handle(command)
        .await;

    match outcome {
        Ok(CheckInOutcome::Completed(receipt)) => {
            Json(CheckInResponseDto::from(&receipt)).into_response()
        }
        Ok(CheckInOutcome::Rejected {
            user,
            last_check_in,
            next_eligible_at,
        }) => (
            StatusCode::BAD_REQUEST,
            Json(RejectedResponse {
                error: ALREADY_CHECKED_IN,
                code: ErrorCode::AlreadyCheckedIn.code(),
                user: UserDto::from(&user),
                last_check_in: last_check_in.to_rfc3339(),
                next_eligible_at: next_eligible_at.to_rfc3339(),
            }),
        )
            .into_response(),
        Err(e @ DomainError::Validation(_)) => ApiError::from(e).into_response(),
        Err(e) => {
            error!("[check-in] {}", e.format_with_code());
            ApiError::from(e)
                .with_message(CHECK_IN_FAILED)
                .into_response()
        }
    }
}
