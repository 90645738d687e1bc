//! Cart and wishlist types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use emporium_core::{CartId, CartLine, ProductId, UserId};

use super::Product;

/// A user's stored cart. At most one per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub items: Vec<CartLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One cart line joined with the product's current details.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub quantity: i32,
    pub product: Product,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WishlistView {
    pub products: Vec<Product>,
}
