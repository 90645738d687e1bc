//! Reviews and the product rating aggregate.
//!
//! A product's `ratings_avg`/`ratings_count` always equal the mean and
//! count of its reviews. Writing a review and refreshing the aggregate is a
//! single store operation ([`ReviewStore::insert_review`](crate::db::ReviewStore::insert_review)),
//! so a reader never sees one without the other. [`RatingAggregator::recompute`]
//! rebuilds the aggregate from scratch for repair.

use chrono::Utc;
use tracing::{debug, info, instrument};

use emporium_core::{ProductId, RatingSummary, ReviewId};

use super::CommerceError;
use super::auth::Identity;
use crate::db::Store;
use crate::models::{NewReview, Review};

pub struct RatingAggregator<'a> {
    store: &'a dyn Store,
}

impl<'a> RatingAggregator<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Reviews for a product, oldest first. Unknown products have none.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the store fails.
    pub async fn list_reviews(&self, product_id: ProductId) -> Result<Vec<Review>, CommerceError> {
        Ok(self.store.reviews_for_product(product_id).await?)
    }

    /// Record a review by `author` and refresh the product's aggregate.
    ///
    /// The product need not exist. If it doesn't, the review is still stored
    /// and no aggregate is written anywhere.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the store fails.
    #[instrument(skip(self, author, request), fields(product_id = %request.product_id, user_id = %author.user_id()))]
    pub async fn add_review(
        &self,
        author: &Identity,
        request: NewReview,
    ) -> Result<Review, CommerceError> {
        let review = Review {
            id: ReviewId::generate(),
            product_id: request.product_id,
            user_id: author.user.id,
            user_name: author.user.name.clone(),
            rating: request.rating,
            comment: request.comment,
            created_at: Utc::now(),
        };

        match self.store.insert_review(&review).await? {
            Some(summary) => info!(
                ratings_avg = summary.ratings_avg,
                ratings_count = summary.ratings_count,
                "Review added"
            ),
            None => debug!("Review added for unknown product, aggregate skipped"),
        }

        Ok(review)
    }

    /// Rebuild a product's aggregate from every stored review.
    ///
    /// Returns `None` without writing anything if the product does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the store fails.
    #[instrument(skip(self))]
    pub async fn recompute(
        &self,
        product_id: ProductId,
    ) -> Result<Option<RatingSummary>, CommerceError> {
        let reviews = self.store.reviews_for_product(product_id).await?;
        let summary = RatingSummary::from_ratings(reviews.iter().map(|r| r.rating));

        if self.store.set_rating_summary(product_id, summary).await? {
            Ok(Some(summary))
        } else {
            debug!("Product missing, aggregate skipped");
            Ok(None)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use emporium_core::{Email, Role, UserId};
    use rust_decimal::Decimal;
    use serde_json::Map;

    use super::*;
    use crate::db::{MemoryStore, ProductStore};
    use crate::models::{Product, ProductInput, User};

    fn author(name: &str) -> Identity {
        Identity {
            user: User {
                id: UserId::generate(),
                email: Email::parse("reviewer@example.in").unwrap(),
                name: name.to_string(),
                phone: None,
                role: Role::Customer,
                created_at: Utc::now(),
            },
        }
    }

    async fn seed(store: &MemoryStore) -> Product {
        let product = Product::new(ProductInput {
            name: "Tea".to_string(),
            description: String::new(),
            price: Decimal::new(350, 0),
            category: "grocery".to_string(),
            images: vec![],
            stock: 10,
            specifications: Map::new(),
        });
        store.insert_product(&product).await.unwrap();
        product
    }

    fn review_of(product_id: ProductId, rating: i32) -> NewReview {
        NewReview {
            product_id,
            rating,
            comment: "ok".to_string(),
        }
    }

    #[tokio::test]
    async fn test_rolling_mean() {
        let store = MemoryStore::new();
        let product = seed(&store).await;
        let reviews = RatingAggregator::new(&store);
        let ratings = [5, 4, 1, 2];

        for (n, rating) in ratings.iter().enumerate() {
            reviews
                .add_review(&author("Anil"), review_of(product.id, *rating))
                .await
                .unwrap();
            let stored = store.product_by_id(product.id).await.unwrap().unwrap();
            let seen = ratings.get(..=n).unwrap();
            let expected = f64::from(seen.iter().sum::<i32>()) / f64::from(u8::try_from(n + 1).unwrap());
            assert!((stored.ratings_avg - expected).abs() < 1e-9);
            assert_eq!(stored.ratings_count, i64::try_from(n + 1).unwrap());
        }
    }

    #[tokio::test]
    async fn test_snapshot_author_name() {
        let store = MemoryStore::new();
        let product = seed(&store).await;
        let review = RatingAggregator::new(&store)
            .add_review(&author("Deepa"), review_of(product.id, 3))
            .await
            .unwrap();
        assert_eq!(review.user_name, "Deepa");
    }

    #[tokio::test]
    async fn test_missing_product_keeps_review() {
        let store = MemoryStore::new();
        let ghost = ProductId::generate();
        let reviews = RatingAggregator::new(&store);

        reviews.add_review(&author("Om"), review_of(ghost, 5)).await.unwrap();

        assert_eq!(reviews.list_reviews(ghost).await.unwrap().len(), 1);
        assert!(store.product_by_id(ghost).await.unwrap().is_none());
        assert!(reviews.recompute(ghost).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_recompute_repairs_drift() {
        let store = MemoryStore::new();
        let product = seed(&store).await;
        let reviews = RatingAggregator::new(&store);
        reviews.add_review(&author("A"), review_of(product.id, 2)).await.unwrap();
        reviews.add_review(&author("B"), review_of(product.id, 4)).await.unwrap();

        store
            .set_rating_summary(product.id, RatingSummary::default())
            .await
            .unwrap();

        let summary = reviews.recompute(product.id).await.unwrap().unwrap();
        assert_eq!(summary.ratings_count, 2);
        assert!((summary.ratings_avg - 3.0).abs() < f64::EPSILON);
    }
}
