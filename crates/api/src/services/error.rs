//! Errors from catalog, cart, review and order operations.

use thiserror::Error;

use emporium_core::CartLineError;

use crate::db::RepositoryError;

#[derive(Debug, Error)]
pub enum CommerceError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Order not found")]
    OrderNotFound,

    #[error("{0}")]
    InvalidCart(#[from] CartLineError),

    /// A product field failed validation.
    #[error("{0}")]
    InvalidProduct(String),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
