//! Order queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;

use emporium_core::{
    OrderId, OrderItem, OrderStatus, PaymentStatus, ShippingAddress, UserId,
};

use super::PgStore;
use crate::db::{OrderStore, RepositoryError};
use crate::models::Order;

const ORDER_COLUMNS: &str = "id, user_id, items, total_amount, shipping_address, \
     razorpay_order_id, razorpay_payment_id, payment_status, order_status, created_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    items: Json<Vec<OrderItem>>,
    total_amount: Decimal,
    shipping_address: Json<ShippingAddress>,
    razorpay_order_id: String,
    razorpay_payment_id: Option<String>,
    payment_status: PaymentStatus,
    order_status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            items: row.items.0,
            total_amount: row.total_amount,
            shipping_address: row.shipping_address.0,
            razorpay_order_id: row.razorpay_order_id,
            razorpay_payment_id: row.razorpay_payment_id,
            payment_status: row.payment_status,
            order_status: row.order_status,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl OrderStore for PgStore {
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id, user_id = %order.user_id))]
    async fn insert_order_clearing_cart(&self, order: &Order) -> Result<bool, RepositoryError> {
        let mut tx = self.pool().begin().await?;

        sqlx::query(
            r"
            INSERT INTO orders (id, user_id, items, total_amount, shipping_address,
                                razorpay_order_id, razorpay_payment_id, payment_status,
                                order_status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(Json(&order.items))
        .bind(order.total_amount)
        .bind(Json(&order.shipping_address))
        .bind(&order.razorpay_order_id)
        .bind(&order.razorpay_payment_id)
        .bind(order.payment_status)
        .bind(&order.order_status)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        let cleared = sqlx::query("DELETE FROM carts WHERE user_id = $1")
            .bind(order.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(cleared.rows_affected() > 0)
    }

    async fn order_for_user(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Order::from))
    }

    async fn confirm_order_payment(
        &self,
        id: OrderId,
        user_id: UserId,
        razorpay_payment_id: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE orders
            SET razorpay_payment_id = $3, payment_status = $4, order_status = $5
            WHERE id = $1 AND user_id = $2
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(user_id)
        .bind(razorpay_payment_id)
        .bind(PaymentStatus::Completed)
        .bind(OrderStatus::confirmed())
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Order::from))
    }

    async fn set_order_status(
        &self,
        id: OrderId,
        status: &OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET order_status = $2 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Order::from))
    }

    async fn orders_for_user(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn all_orders(&self, limit: i64) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn orders_with_payment_status(
        &self,
        status: PaymentStatus,
        limit: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE payment_status = $1 ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(status)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn count_orders(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }
}
