//! Session issuance.
//!
//! Exchanging an email for a bearer token requires no prior proof; the
//! token only asserts "this caller claims this email". Everything of value
//! behind it is additionally guarded by role or ownership checks.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

use bistro_core::Email;

use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct SessionRequest {
    email: String,
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    token: String,
}

async fn create_session(
    State(state): State<AppState>,
    Json(body): Json<SessionRequest>,
) -> Result<Json<SessionResponse>> {
    let email = Email::parse(&body.email)
        .map_err(|e| AppError::Validation(format!("invalid email: {e}")))?;

    let token = state
        .token_keys()
        .issue(&email)
        .map_err(|e| AppError::Internal(format!("token issuance failed: {e}")))?;

    Ok(Json(SessionResponse { token }))
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new().route("/sessions", post(create_session))
}
