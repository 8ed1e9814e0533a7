//! Guard composition for privileged endpoints.
//!
//! [`Authenticated`] is the extractor form of `authenticate`: it rejects
//! with 401 before the handler body runs, so no store access happens for an
//! unauthenticated request. [`require_role`] and [`require_owner`] are the
//! explicit second step, called at the top of handlers that need them.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn admin_only(
//!     State(state): State<AppState>,
//!     Authenticated(claims): Authenticated,
//! ) -> Result<Json<Stats>> {
//!     let identities = IdentityRepository::new(state.pool());
//!     require_role(&identities, &claims, Role::Admin).await?;
//!     // ...
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use bistro_core::{Email, Role};

use crate::auth::token::{AuthError, Claims};
use crate::db::IdentityStore;
use crate::error::AppError;
use crate::models::Identity;
use crate::state::AppState;

/// Extractor that requires a verified bearer token.
///
/// Yields the claim set on success; the claimed email is authenticated but
/// its role is not yet trusted.
pub struct Authenticated(pub Claims);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?;

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AuthError::Malformed)?;

        let claims = state.token_keys().verify(token)?;
        Ok(Self(claims))
    }
}

/// Parse the claimed email out of a verified claim set.
///
/// # Errors
///
/// Returns `Unauthenticated` if the claim does not hold a structurally
/// valid email. Tokens are only issued for parsed emails, so this only
/// trips on tokens minted outside this server.
pub fn claimed_email(claims: &Claims) -> Result<Email, AppError> {
    Email::parse(&claims.sub)
        .map_err(|e| AppError::Unauthenticated(format!("invalid email claim: {e}")))
}

/// Require that the claimed email maps to an identity holding `required`.
///
/// Side-effect-free: a single lookup, no writes.
///
/// # Errors
///
/// Returns `Forbidden` if no identity exists for the claimed email or its
/// role does not match; `Upstream` if the store lookup fails.
pub async fn require_role<S: IdentityStore + Sync>(
    store: &S,
    claims: &Claims,
    required: Role,
) -> Result<Identity, AppError> {
    let email = claimed_email(claims)?;
    match store.find_by_email(&email).await? {
        Some(identity) if identity.role == required => Ok(identity),
        _ => Err(AppError::Forbidden(format!("{required} role required"))),
    }
}

/// Require that the claimed email matches the resource owner's email.
///
/// # Errors
///
/// Returns `Forbidden` on mismatch.
pub fn require_owner(claims: &Claims, owner: &Email) -> Result<(), AppError> {
    if claims.sub == owner.as_str() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "resource belongs to another user".to_owned(),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::Ordering;

    use chrono::Utc;

    use bistro_core::IdentityId;

    use super::*;
    use crate::db::memory::MemoryIdentityStore;

    fn identity(email: &str, role: Role) -> Identity {
        Identity {
            id: IdentityId::generate(),
            email: Email::parse(email).unwrap(),
            name: None,
            role,
            created_at: Utc::now(),
        }
    }

    fn claims_for(email: &str) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: email.to_owned(),
            iat: now,
            exp: now + 3600,
        }
    }

    #[tokio::test]
    async fn test_require_role_admin_passes() {
        let store = MemoryIdentityStore::with(vec![identity("boss@example.com", Role::Admin)]);
        let claims = claims_for("boss@example.com");

        let found = require_role(&store, &claims, Role::Admin).await.unwrap();
        assert!(found.is_admin());
    }

    #[tokio::test]
    async fn test_require_role_rejects_role_mismatch() {
        let store = MemoryIdentityStore::with(vec![identity("diner@example.com", Role::Customer)]);
        let claims = claims_for("diner@example.com");

        let err = require_role(&store, &claims, Role::Admin).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_require_role_rejects_unknown_identity() {
        let store = MemoryIdentityStore::default();
        let claims = claims_for("ghost@example.com");

        let err = require_role(&store, &claims, Role::Admin).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_require_role_is_lookup_only() {
        let store = MemoryIdentityStore::with(vec![identity("boss@example.com", Role::Admin)]);
        let claims = claims_for("boss@example.com");

        require_role(&store, &claims, Role::Admin).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_require_owner_match() {
        let claims = claims_for("diner@example.com");
        let owner = Email::parse("diner@example.com").unwrap();
        assert!(require_owner(&claims, &owner).is_ok());
    }

    #[test]
    fn test_require_owner_mismatch() {
        let claims = claims_for("diner@example.com");
        let owner = Email::parse("other@example.com").unwrap();
        let err = require_owner(&claims, &owner).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_claimed_email_rejects_garbage() {
        let claims = claims_for("not-an-email");
        assert!(matches!(
            claimed_email(&claims),
            Err(AppError::Unauthenticated(_))
        ));
    }
}
