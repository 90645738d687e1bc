//! Order lifecycle.
//!
//! ```text
//! order_status:   pending ──confirm_payment──▶ confirmed
//! payment_status: pending ──confirm_payment──▶ completed
//! ```
//!
//! Admins may overwrite `order_status` with any label at any time. Placing
//! an order removes the owner's cart in the same store operation.

use rust_decimal::Decimal;
use tracing::{info, instrument};

use emporium_core::{OrderId, OrderStatus, PaymentStatus, Role, UserId};

use super::CommerceError;
use crate::db::{LIST_LIMIT, REVENUE_SCAN_LIMIT, Store};
use crate::models::{AdminStats, NewOrder, Order, User};

pub struct OrderCoordinator<'a> {
    store: &'a dyn Store,
}

impl<'a> OrderCoordinator<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Place an order for `user_id` and empty their cart.
    ///
    /// Items and total are stored exactly as submitted.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the store fails; in that case
    /// neither the order nor the cart removal is applied.
    #[instrument(skip(self, request), fields(items = request.items.len()))]
    pub async fn create_order(
        &self,
        user_id: UserId,
        request: NewOrder,
    ) -> Result<Order, CommerceError> {
        let order = Order::place(user_id, request);
        let cart_cleared = self.store.insert_order_clearing_cart(&order).await?;
        info!(order_id = %order.id, cart_cleared, "Order placed");
        Ok(order)
    }

    /// # Errors
    ///
    /// Returns `CommerceError::OrderNotFound` unless `user_id` owns the order.
    pub async fn get_order(&self, id: OrderId, user_id: UserId) -> Result<Order, CommerceError> {
        self.store
            .order_for_user(id, user_id)
            .await?
            .ok_or(CommerceError::OrderNotFound)
    }

    /// Record a gateway payment id on the owner's order and confirm it.
    ///
    /// Does not re-check the payment signature.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::OrderNotFound` if the order is missing or
    /// belongs to someone else.
    #[instrument(skip(self))]
    pub async fn confirm_payment(
        &self,
        id: OrderId,
        user_id: UserId,
        razorpay_payment_id: &str,
    ) -> Result<Order, CommerceError> {
        let order = self
            .store
            .confirm_order_payment(id, user_id, razorpay_payment_id)
            .await?
            .ok_or(CommerceError::OrderNotFound)?;
        info!("Order payment confirmed");
        Ok(order)
    }

    /// Overwrite an order's status with an arbitrary label.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::OrderNotFound` if the order does not exist.
    #[instrument(skip(self))]
    pub async fn admin_set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, CommerceError> {
        let order = self
            .store
            .set_order_status(id, &status)
            .await?
            .ok_or(CommerceError::OrderNotFound)?;
        info!(order_status = %order.order_status, "Order status set");
        Ok(order)
    }

    /// The user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the store fails.
    pub async fn list_orders(&self, user_id: UserId) -> Result<Vec<Order>, CommerceError> {
        Ok(self.store.orders_for_user(user_id, LIST_LIMIT).await?)
    }

    /// Every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the store fails.
    pub async fn list_all_orders(&self) -> Result<Vec<Order>, CommerceError> {
        Ok(self.store.all_orders(LIST_LIMIT).await?)
    }

    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the store fails.
    pub async fn list_users(&self) -> Result<Vec<User>, CommerceError> {
        Ok(self.store.list_users(LIST_LIMIT).await?)
    }

    /// Dashboard counters. Revenue sums at most the newest
    /// [`REVENUE_SCAN_LIMIT`] completed orders.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the store fails.
    pub async fn stats(&self) -> Result<AdminStats, CommerceError> {
        let total_products = self.store.count_products().await?;
        let total_orders = self.store.count_orders().await?;
        let total_users = self.store.count_users_with_role(Role::Customer).await?;
        let total_revenue = self
            .store
            .orders_with_payment_status(PaymentStatus::Completed, REVENUE_SCAN_LIMIT)
            .await?
            .iter()
            .map(|order| order.total_amount)
            .sum::<Decimal>();

        Ok(AdminStats {
            total_products,
            total_orders,
            total_users,
            total_revenue,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use emporium_core::{CartLine, OrderItem, ProductId, ShippingAddress};
    use serde_json::json;

    use super::*;
    use crate::db::{CartStore, MemoryStore};

    fn request(total: i64) -> NewOrder {
        NewOrder {
            items: vec![OrderItem {
                product_id: ProductId::generate(),
                product_name: "Notebook".to_string(),
                price: Decimal::new(total, 0),
                quantity: 1,
            }],
            total_amount: Decimal::new(total, 0),
            shipping_address: serde_json::from_value::<ShippingAddress>(json!({"city": "Kochi"}))
                .unwrap(),
            razorpay_order_id: "order_N1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_order_empties_cart() {
        let store = MemoryStore::new();
        let user = UserId::generate();
        store
            .upsert_cart(
                user,
                &[CartLine {
                    product_id: ProductId::generate(),
                    quantity: 2,
                }],
            )
            .await
            .unwrap();

        let order = OrderCoordinator::new(&store)
            .create_order(user, request(120))
            .await
            .unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.order_status, OrderStatus::pending());
        assert!(store.cart_for_user(user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_confirm_payment_on_foreign_order() {
        let store = MemoryStore::new();
        let orders = OrderCoordinator::new(&store);
        let owner = UserId::generate();
        let order = orders.create_order(owner, request(50)).await.unwrap();

        assert!(matches!(
            orders
                .confirm_payment(order.id, UserId::generate(), "pay_1")
                .await,
            Err(CommerceError::OrderNotFound)
        ));
        let untouched = orders.get_order(order.id, owner).await.unwrap();
        assert_eq!(untouched.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_admin_status_is_free_text() {
        let store = MemoryStore::new();
        let orders = OrderCoordinator::new(&store);
        let owner = UserId::generate();
        let order = orders.create_order(owner, request(50)).await.unwrap();
        orders.confirm_payment(order.id, owner, "pay_1").await.unwrap();

        let shipped = orders
            .admin_set_status(order.id, OrderStatus::new("shipped"))
            .await
            .unwrap();
        assert_eq!(shipped.order_status.as_str(), "shipped");

        let reverted = orders
            .admin_set_status(order.id, OrderStatus::pending())
            .await
            .unwrap();
        assert_eq!(reverted.order_status, OrderStatus::pending());
        assert_eq!(reverted.payment_status, PaymentStatus::Completed);

        assert!(matches!(
            orders
                .admin_set_status(OrderId::generate(), OrderStatus::new("shipped"))
                .await,
            Err(CommerceError::OrderNotFound)
        ));
    }

    #[tokio::test]
    async fn test_stats_count_completed_revenue_only() {
        let store = MemoryStore::new();
        let orders = OrderCoordinator::new(&store);
        let owner = UserId::generate();
        let paid = orders.create_order(owner, request(300)).await.unwrap();
        orders.create_order(owner, request(999)).await.unwrap();
        orders.confirm_payment(paid.id, owner, "pay_ok").await.unwrap();

        let stats = orders.stats().await.unwrap();
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.total_products, 0);
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.total_revenue, Decimal::new(300, 0));
    }
}
