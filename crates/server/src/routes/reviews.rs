//! Customer reviews.

use axum::{Json, Router, extract::State, routing::get};
use serde::Deserialize;

use crate::auth::Authenticated;
use crate::db::ReviewRepository;
use crate::error::{AppError, Result};
use crate::models::Review;
use crate::state::AppState;

const MIN_RATING: i16 = 1;
const MAX_RATING: i16 = 5;

async fn list_reviews(State(state): State<AppState>) -> Result<Json<Vec<Review>>> {
    let reviews = ReviewRepository::new(state.pool());
    Ok(Json(reviews.list().await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewReview {
    reviewer_name: String,
    details: String,
    rating: i16,
}

async fn create_review(
    State(state): State<AppState>,
    Authenticated(_claims): Authenticated,
    Json(body): Json<NewReview>,
) -> Result<Json<Review>> {
    if body.reviewer_name.trim().is_empty() {
        return Err(AppError::Validation(
            "reviewer name must not be empty".to_owned(),
        ));
    }
    if !(MIN_RATING..=MAX_RATING).contains(&body.rating) {
        return Err(AppError::Validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }

    let reviews = ReviewRepository::new(state.pool());
    let review = reviews
        .insert(&body.reviewer_name, &body.details, body.rating)
        .await?;

    Ok(Json(review))
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new().route("/reviews", get(list_reviews).post(create_review))
}
