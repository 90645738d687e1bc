//! Cart and wishlist queries. Both tables are keyed by a unique `user_id`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;

use emporium_core::{CartId, CartLine, UserId, Wishlist, WishlistId};

use super::PgStore;
use crate::db::{CartStore, RepositoryError};
use crate::models::Cart;

#[derive(sqlx::FromRow)]
struct CartRow {
    id: CartId,
    user_id: UserId,
    items: Json<Vec<CartLine>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            items: row.items.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CartStore for PgStore {
    async fn cart_for_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, user_id, items, created_at, updated_at FROM carts WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Cart::from))
    }

    async fn upsert_cart(
        &self,
        user_id: UserId,
        items: &[CartLine],
    ) -> Result<Cart, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            r"
            INSERT INTO carts (id, user_id, items)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id)
            DO UPDATE SET items = EXCLUDED.items, updated_at = NOW()
            RETURNING id, user_id, items, created_at, updated_at
            ",
        )
        .bind(CartId::generate())
        .bind(user_id)
        .bind(Json(items))
        .fetch_one(self.pool())
        .await?;
        Ok(row.into())
    }

    async fn wishlist_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<Wishlist>, RepositoryError> {
        let ids: Option<Json<Wishlist>> =
            sqlx::query_scalar("SELECT product_ids FROM wishlists WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(self.pool())
                .await?;
        // Re-run through from_ids so rows written before dedup was enforced heal.
        Ok(ids.map(|Json(w)| Wishlist::from_ids(w.ids().iter().copied())))
    }

    async fn upsert_wishlist(
        &self,
        user_id: UserId,
        wishlist: &Wishlist,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO wishlists (id, user_id, product_ids)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id)
            DO UPDATE SET product_ids = EXCLUDED.product_ids
            ",
        )
        .bind(WishlistId::generate())
        .bind(user_id)
        .bind(Json(wishlist))
        .execute(self.pool())
        .await?;
        Ok(())
    }
}
