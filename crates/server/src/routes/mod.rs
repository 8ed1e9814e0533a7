//! HTTP surface.
//!
//! # Routes
//!
//! | Method | Path                    | Guard          |
//! |--------|-------------------------|----------------|
//! | POST   | `/sessions`             | none           |
//! | POST   | `/users`                | none           |
//! | GET    | `/users`                | admin          |
//! | GET    | `/users/admin/{email}`  | auth + self    |
//! | PATCH  | `/users/{id}/role`      | admin          |
//! | GET    | `/menu`                 | none           |
//! | POST   | `/menu`                 | admin          |
//! | DELETE | `/menu/{id}`            | admin          |
//! | GET    | `/reviews`              | none           |
//! | POST   | `/reviews`              | auth           |
//! | GET    | `/carts?email=`         | auth + owner   |
//! | POST   | `/carts`                | none           |
//! | DELETE | `/carts/{id}`           | none           |
//! | POST   | `/checkout`             | auth           |
//! | GET    | `/payments/{email}`     | auth + owner   |
//! | GET    | `/stats/summary`        | admin          |
//! | GET    | `/stats/by-category`    | admin          |
//!
//! Cart creation and deletion are deliberately unguarded: the storefront
//! adds and removes selections before the customer ever signs in, and the
//! entries are worthless until settlement, which is guarded.

use axum::Router;

use crate::state::AppState;

mod carts;
mod checkout;
mod menu;
mod payments;
mod reviews;
mod sessions;
mod stats;
mod users;

/// Assemble the full application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(sessions::routes())
        .merge(users::routes())
        .merge(menu::routes())
        .merge(reviews::routes())
        .merge(carts::routes())
        .merge(checkout::routes())
        .merge(payments::routes())
        .merge(stats::routes())
}
