//! Order types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use emporium_core::{OrderId, OrderItem, OrderStatus, PaymentStatus, ShippingAddress, UserId};

/// A placed order. Items are snapshots and never re-read from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub shipping_address: ShippingAddress,
    pub razorpay_order_id: String,
    pub razorpay_payment_id: Option<String>,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// A freshly placed order: payment and fulfilment both pending.
    #[must_use]
    pub fn place(user_id: UserId, request: NewOrder) -> Self {
        Self {
            id: OrderId::generate(),
            user_id,
            items: request.items,
            total_amount: request.total_amount,
            shipping_address: request.shipping_address,
            razorpay_order_id: request.razorpay_order_id,
            razorpay_payment_id: None,
            payment_status: PaymentStatus::Pending,
            order_status: OrderStatus::pending(),
            created_at: Utc::now(),
        }
    }

    /// Record a gateway payment against this order.
    pub fn confirm_payment(&mut self, razorpay_payment_id: String) {
        self.razorpay_payment_id = Some(razorpay_payment_id);
        self.payment_status = PaymentStatus::Completed;
        self.order_status = OrderStatus::confirmed();
    }
}

/// Order placement request. The total is taken as given.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub shipping_address: ShippingAddress,
    pub razorpay_order_id: String,
}

/// Dashboard counters for admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminStats {
    pub total_products: i64,
    pub total_orders: i64,
    /// Customers only; admins are not counted.
    pub total_users: i64,
    /// Sum of `total_amount` over orders whose payment completed.
    pub total_revenue: Decimal,
}
