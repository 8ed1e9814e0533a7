//! Identity registration and administration.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};

use bistro_core::{Email, IdentityId, Role};

use crate::auth::{Authenticated, require_owner, require_role};
use crate::db::{IdentityRepository, IdentityStore, RepositoryError};
use crate::error::{AppError, Result};
use crate::models::Identity;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    email: String,
    name: Option<String>,
}

/// Registration response: the created identity, or a notice when the email
/// is already registered. Re-registration is a no-op, not an error.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RegisterResponse {
    Created(Identity),
    AlreadyExists { message: &'static str },
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>> {
    let email = Email::parse(&body.email)
        .map_err(|e| AppError::Validation(format!("invalid email: {e}")))?;

    let identities = IdentityRepository::new(state.pool());
    if identities.find_by_email(&email).await?.is_some() {
        return Ok(Json(RegisterResponse::AlreadyExists {
            message: "user already exists",
        }));
    }

    match identities.insert(&email, body.name.as_deref()).await {
        Ok(identity) => Ok(Json(RegisterResponse::Created(identity))),
        // Concurrent registration of the same email; same answer as the
        // pre-check.
        Err(RepositoryError::Conflict(_)) => Ok(Json(RegisterResponse::AlreadyExists {
            message: "user already exists",
        })),
        Err(e) => Err(e.into()),
    }
}

async fn list_users(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
) -> Result<Json<Vec<Identity>>> {
    let identities = IdentityRepository::new(state.pool());
    require_role(&identities, &claims, Role::Admin).await?;

    Ok(Json(identities.list().await?))
}

#[derive(Debug, Serialize)]
struct AdminCheckResponse {
    admin: bool,
}

/// Self-service role check for the signed-in user. Asking about anyone
/// else's email is forbidden.
async fn check_admin(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    Path(email): Path<String>,
) -> Result<Json<AdminCheckResponse>> {
    let email = Email::parse(&email)
        .map_err(|e| AppError::Validation(format!("invalid email: {e}")))?;
    require_owner(&claims, &email)?;

    let identities = IdentityRepository::new(state.pool());
    let admin = identities
        .find_by_email(&email)
        .await?
        .is_some_and(|identity| identity.is_admin());

    Ok(Json(AdminCheckResponse { admin }))
}

#[derive(Debug, Deserialize)]
struct RoleUpdateRequest {
    role: Role,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
}

async fn update_role(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    Path(id): Path<IdentityId>,
    Json(body): Json<RoleUpdateRequest>,
) -> Result<Json<MessageResponse>> {
    let identities = IdentityRepository::new(state.pool());
    require_role(&identities, &claims, Role::Admin).await?;

    match identities.set_role(id, body.role).await {
        Ok(()) => Ok(Json(MessageResponse {
            message: "role updated",
        })),
        Err(RepositoryError::NotFound) => {
            Err(AppError::NotFound(format!("no identity with id {id}")))
        }
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register).get(list_users))
        .route("/users/admin/{email}", get(check_admin))
        .route("/users/{id}/role", patch(update_role))
}
