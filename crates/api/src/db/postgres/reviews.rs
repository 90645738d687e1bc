//! Review queries and the transactional aggregate refresh.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use emporium_core::{ProductId, RatingSummary, ReviewId, UserId};

use super::PgStore;
use crate::db::{RepositoryError, ReviewStore};
use crate::models::Review;

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: ReviewId,
    product_id: ProductId,
    user_id: UserId,
    user_name: String,
    rating: i32,
    comment: String,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            user_id: row.user_id,
            user_name: row.user_name,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ReviewStore for PgStore {
    async fn reviews_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r"
            SELECT id, product_id, user_id, user_name, rating, comment, created_at
            FROM reviews
            WHERE product_id = $1
            ORDER BY created_at, id
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    #[tracing::instrument(skip(self, review), fields(product_id = %review.product_id))]
    async fn insert_review(
        &self,
        review: &Review,
    ) -> Result<Option<RatingSummary>, RepositoryError> {
        let mut tx = self.pool().begin().await?;

        sqlx::query(
            r"
            INSERT INTO reviews (id, product_id, user_id, user_name, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(review.id)
        .bind(review.product_id)
        .bind(review.user_id)
        .bind(&review.user_name)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&mut *tx)
        .await?;

        // Row lock serializes concurrent reviews of one product. The rating
        // scan below runs after the lock, so it sees every committed review.
        let locked: Option<ProductId> =
            sqlx::query_scalar("SELECT id FROM products WHERE id = $1 FOR UPDATE")
                .bind(review.product_id)
                .fetch_optional(&mut *tx)
                .await?;

        let summary = match locked {
            Some(product_id) => {
                let ratings: Vec<i32> =
                    sqlx::query_scalar("SELECT rating FROM reviews WHERE product_id = $1")
                        .bind(product_id)
                        .fetch_all(&mut *tx)
                        .await?;
                let summary = RatingSummary::from_ratings(ratings);

                sqlx::query(
                    "UPDATE products SET ratings_avg = $1, ratings_count = $2 WHERE id = $3",
                )
                .bind(summary.ratings_avg)
                .bind(summary.ratings_count)
                .bind(product_id)
                .execute(&mut *tx)
                .await?;
                Some(summary)
            }
            None => None,
        };

        tx.commit().await?;
        Ok(summary)
    }
}
