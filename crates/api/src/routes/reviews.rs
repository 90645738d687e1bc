//! Review route handlers.

use axum::{
    Json,
    extract::State,
};
use tracing::instrument;

use emporium_core::ProductId;

use crate::error::Result;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireUser;
use crate::models::{NewReview, Review};
use crate::state::AppState;

/// Reviews for a product, oldest first. Public.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<ProductId>,
) -> Result<Json<Vec<Review>>> {
    Ok(Json(state.reviews().list_reviews(product_id).await?))
}

/// Add a review and refresh the product's rating aggregate.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(identity): RequireUser,
    ApiJson(request): ApiJson<NewReview>,
) -> Result<Json<Review>> {
    Ok(Json(state.reviews().add_review(&identity, request).await?))
}
