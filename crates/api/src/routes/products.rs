//! Catalog route handlers.

use axum::{
    Json,
    extract::State,
};
use tracing::instrument;

use emporium_core::ProductId;

use super::MessageResponse;
use crate::error::Result;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAdmin;
use crate::models::{Product, ProductFilter, ProductInput};
use crate::state::AppState;

/// Product listing with optional filters.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ProductFilter>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.catalog().list_products(filter).await?))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<Product>> {
    Ok(Json(state.catalog().get_product(id).await?))
}

#[instrument(skip(state, _admin, input))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<Json<Product>> {
    Ok(Json(state.catalog().create_product(input).await?))
}

#[instrument(skip(state, _admin, input))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<Json<Product>> {
    Ok(Json(state.catalog().update_product(id, input).await?))
}

#[instrument(skip(state, _admin))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<MessageResponse>> {
    state.catalog().delete_product(id).await?;
    Ok(Json(MessageResponse::new("Product deleted")))
}
