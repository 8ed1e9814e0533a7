//! Review repository. Plain CRUD, no trait seam: nothing in the core
//! services depends on reviews.

use sqlx::PgPool;

use bistro_core::ReviewId;

use super::RepositoryError;
use crate::models::Review;

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Review>, RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(
            r"
            SELECT id, reviewer_name, details, rating, created_at
            FROM review
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(reviews)
    }

    /// Insert a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        reviewer_name: &str,
        details: &str,
        rating: i16,
    ) -> Result<Review, RepositoryError> {
        let review = sqlx::query_as::<_, Review>(
            r"
            INSERT INTO review (id, reviewer_name, details, rating)
            VALUES ($1, $2, $3, $4)
            RETURNING id, reviewer_name, details, rating, created_at
            ",
        )
        .bind(ReviewId::generate())
        .bind(reviewer_name)
        .bind(details)
        .bind(rating)
        .fetch_one(self.pool)
        .await?;

        Ok(review)
    }
}
