//! Payment history.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use bistro_core::Email;

use crate::auth::{Authenticated, require_owner};
use crate::db::{PaymentRepository, PaymentStore};
use crate::error::{AppError, Result};
use crate::models::PaymentRecord;
use crate::state::AppState;

/// A customer's own payment history, newest first.
async fn list_payments(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    Path(email): Path<String>,
) -> Result<Json<Vec<PaymentRecord>>> {
    let email = Email::parse(&email)
        .map_err(|e| AppError::Validation(format!("invalid email: {e}")))?;
    require_owner(&claims, &email)?;

    let payments = PaymentRepository::new(state.pool());
    Ok(Json(payments.list_for_payer(&email).await?))
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new().route("/payments/{email}", get(list_payments))
}
