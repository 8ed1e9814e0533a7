//! Access guard: bearer-token authentication and role/ownership checks.
//!
//! Authentication ([`token`]) verifies the signed claim set before any
//! store access. Authorization ([`guard`]) is composed explicitly per
//! endpoint from result-returning functions; there is no implicit
//! middleware chain mutating request state.

pub mod guard;
pub mod token;

pub use guard::{Authenticated, claimed_email, require_owner, require_role};
pub use token::{AuthError, Claims, TokenKeys};
