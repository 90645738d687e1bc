//! `PostgreSQL` store.
//!
//! Queries are checked at runtime (`query_as` with `FromRow` row types) so
//! the crate builds without a live database. JSON-shaped columns (`images`,
//! `specifications`, cart items, wishlist ids, order items, shipping address)
//! are JSONB and round-trip through [`sqlx::types::Json`].

mod carts;
mod orders;
mod products;
mod reviews;
mod users;

use async_trait::async_trait;
use sqlx::PgPool;

use super::{RepositoryError, Store};

/// [`Store`] backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
fn conflict_on_unique(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}
