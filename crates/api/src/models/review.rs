//! Review types. Reviews are immutable once written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use emporium_core::{ProductId, ReviewId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    /// Author's name when the review was written.
    pub user_name: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Review submission. The product is not required to exist.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub product_id: ProductId,
    pub rating: i32,
    pub comment: String,
}
