//! Persistence for Emporium.
//!
//! Handlers never talk to a database directly. They go through the store
//! traits below, which have two implementations:
//!
//! - [`PgStore`] - `PostgreSQL` via sqlx (production)
//! - [`MemoryStore`] - process-local maps behind one `RwLock` (development, tests)
//!
//! ## Tables
//!
//! - `users` - accounts, unique by email
//! - `products` - catalog plus the derived rating aggregate
//! - `carts` / `wishlists` - one row per user (upserted by `user_id`)
//! - `reviews` - immutable, may reference missing products
//! - `orders` - frozen item snapshots and payment state
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p emporium-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use emporium_core::{
    CartLine, Email, OrderId, OrderStatus, PaymentStatus, ProductId, RatingSummary, Role, UserId,
    Wishlist,
};

use crate::models::{Cart, Order, Product, ProductFilter, ProductInput, Review, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Upper bound on rows returned by catalog, user and order listings.
pub const LIST_LIMIT: i64 = 1000;

/// Upper bound on completed orders summed into revenue.
pub const REVENUE_SCAN_LIMIT: i64 = 10_000;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Accounts and credentials.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    async fn insert_user(&self, user: &User, password_hash: &str) -> Result<(), RepositoryError>;

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Fetch a user together with their stored password hash, for login.
    async fn user_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    /// Up to `limit` users in registration order.
    async fn list_users(&self, limit: i64) -> Result<Vec<User>, RepositoryError>;

    async fn count_users_with_role(&self, role: Role) -> Result<i64, RepositoryError>;

    /// Change a user's role. Returns `false` if no user has that email.
    ///
    /// Operator tooling only; no HTTP route reaches this.
    async fn set_user_role(&self, email: &Email, role: Role) -> Result<bool, RepositoryError>;
}

/// The product catalog.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError>;

    /// Overwrite a product's editable fields, keeping its id, creation time
    /// and rating aggregate. Returns `None` if the product does not exist.
    async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Returns `false` if the product did not exist.
    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError>;

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Products for the given ids, in the order of `ids`. Missing ids are skipped.
    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError>;

    /// Products matching every criterion in `filter`, oldest first.
    async fn search_products(
        &self,
        filter: &ProductFilter,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError>;

    async fn count_products(&self) -> Result<i64, RepositoryError>;

    /// Overwrite the rating aggregate. Returns `false` if the product is gone.
    async fn set_rating_summary(
        &self,
        id: ProductId,
        summary: RatingSummary,
    ) -> Result<bool, RepositoryError>;
}

/// Per-user carts and wishlists, at most one of each per user.
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn cart_for_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError>;

    /// Replace the user's cart contents, creating the cart if needed.
    async fn upsert_cart(&self, user_id: UserId, items: &[CartLine])
    -> Result<Cart, RepositoryError>;

    async fn wishlist_for_user(&self, user_id: UserId)
    -> Result<Option<Wishlist>, RepositoryError>;

    /// Replace the user's wishlist, creating it if needed.
    async fn upsert_wishlist(
        &self,
        user_id: UserId,
        wishlist: &Wishlist,
    ) -> Result<(), RepositoryError>;
}

/// Product reviews.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Every review for a product, oldest first.
    async fn reviews_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError>;

    /// Persist a review and refresh its product's rating aggregate as one unit.
    ///
    /// Returns the new aggregate, or `None` if the product does not exist (the
    /// review is still stored).
    async fn insert_review(&self, review: &Review)
    -> Result<Option<RatingSummary>, RepositoryError>;
}

/// Orders and their payment state.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist an order and delete its owner's cart as one unit.
    ///
    /// Returns whether a cart existed and was removed.
    async fn insert_order_clearing_cart(&self, order: &Order) -> Result<bool, RepositoryError>;

    /// Look up an order only if `user_id` owns it.
    async fn order_for_user(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError>;

    /// Record a payment on an order owned by `user_id`, moving it to
    /// `completed`/`confirmed`. Returns `None` if no such owned order exists.
    async fn confirm_order_payment(
        &self,
        id: OrderId,
        user_id: UserId,
        razorpay_payment_id: &str,
    ) -> Result<Option<Order>, RepositoryError>;

    /// Overwrite an order's status regardless of owner.
    async fn set_order_status(
        &self,
        id: OrderId,
        status: &OrderStatus,
    ) -> Result<Option<Order>, RepositoryError>;

    /// A user's orders, newest first.
    async fn orders_for_user(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<Order>, RepositoryError>;

    /// All orders, newest first.
    async fn all_orders(&self, limit: i64) -> Result<Vec<Order>, RepositoryError>;

    /// Orders in the given payment state, newest first.
    async fn orders_with_payment_status(
        &self,
        status: PaymentStatus,
        limit: i64,
    ) -> Result<Vec<Order>, RepositoryError>;

    async fn count_orders(&self) -> Result<i64, RepositoryError>;
}

/// Everything the API needs from persistence.
#[async_trait]
pub trait Store: UserStore + ProductStore + CartStore + ReviewStore + OrderStore {
    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
