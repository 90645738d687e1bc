//! In-memory store.
//!
//! All tables sit behind a single `tokio::sync::RwLock`, so every method is
//! atomic with respect to every other. Multi-record writes (review plus
//! aggregate, order plus cart removal) happen under one write guard.
//! Nothing survives a restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use emporium_core::{
    CartId, CartLine, Email, OrderId, OrderStatus, PaymentStatus, ProductId, RatingSummary, Role,
    UserId, Wishlist,
};

use super::{
    CartStore, OrderStore, ProductStore, RepositoryError, ReviewStore, Store, UserStore,
};
use crate::models::{Cart, Order, Product, ProductFilter, ProductInput, Review, User};

#[derive(Default)]
struct Tables {
    /// Registration order.
    users: Vec<(User, String)>,
    /// Creation order.
    products: Vec<Product>,
    carts: HashMap<UserId, Cart>,
    wishlists: HashMap<UserId, Wishlist>,
    /// Creation order.
    reviews: Vec<Review>,
    /// Creation order.
    orders: Vec<Order>,
}

impl Tables {
    fn product_mut(&mut self, id: ProductId) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id == id)
    }

    fn ratings_for(&self, product_id: ProductId) -> RatingSummary {
        RatingSummary::from_ratings(
            self.reviews
                .iter()
                .filter(|r| r.product_id == product_id)
                .map(|r| r.rating),
        )
    }

    /// Orders passing `keep`, newest first, at most `limit`.
    fn orders_newest_first(&self, limit: i64, keep: impl Fn(&Order) -> bool) -> Vec<Order> {
        // Reverse first so equal timestamps still come out newest first.
        let mut orders: Vec<Order> = self.orders.iter().rev().filter(|o| keep(o)).cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders.truncate(clamp_limit(limit));
        orders
    }
}

fn clamp_limit(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Process-local [`Store`](super::Store) implementation.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User, password_hash: &str) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|(u, _)| u.email == user.email) {
            return Err(RepositoryError::Conflict(format!(
                "email already registered: {}",
                user.email
            )));
        }
        tables.users.push((user.clone(), password_hash.to_owned()));
        Ok(())
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone()))
    }

    async fn user_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|(u, _)| u.email == *email).cloned())
    }

    async fn list_users(&self, limit: i64) -> Result<Vec<User>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .take(clamp_limit(limit))
            .map(|(u, _)| u.clone())
            .collect())
    }

    async fn count_users_with_role(&self, role: Role) -> Result<i64, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(count(
            tables.users.iter().filter(|(u, _)| u.role == role).count(),
        ))
    }

    async fn set_user_role(&self, email: &Email, role: Role) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        match tables.users.iter_mut().find(|(u, _)| u.email == *email) {
            Some((user, _)) => {
                user.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.products.iter().any(|p| p.id == product.id) {
            return Err(RepositoryError::Conflict(format!(
                "product already exists: {}",
                product.id
            )));
        }
        tables.products.push(product.clone());
        Ok(())
    }

    async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(tables.product_mut(id).map(|product| {
            product.apply(input.clone());
            product.clone()
        }))
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        Ok(tables.products.len() != before)
    }

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.products.iter().find(|p| p.id == id).cloned())
    }

    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.products.iter().find(|p| p.id == *id).cloned())
            .collect())
    }

    async fn search_products(
        &self,
        filter: &ProductFilter,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .iter()
            .filter(|p| filter.matches(p))
            .take(clamp_limit(limit))
            .cloned()
            .collect())
    }

    async fn count_products(&self) -> Result<i64, RepositoryError> {
        Ok(count(self.tables.read().await.products.len()))
    }

    async fn set_rating_summary(
        &self,
        id: ProductId,
        summary: RatingSummary,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        match tables.product_mut(id) {
            Some(product) => {
                product.set_rating_summary(summary);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn cart_for_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        Ok(self.tables.read().await.carts.get(&user_id).cloned())
    }

    async fn upsert_cart(
        &self,
        user_id: UserId,
        items: &[CartLine],
    ) -> Result<Cart, RepositoryError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let cart = tables.carts.entry(user_id).or_insert_with(|| Cart {
            id: CartId::generate(),
            user_id,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        });
        cart.items = items.to_vec();
        cart.updated_at = now;
        Ok(cart.clone())
    }

    async fn wishlist_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<Wishlist>, RepositoryError> {
        Ok(self.tables.read().await.wishlists.get(&user_id).cloned())
    }

    async fn upsert_wishlist(
        &self,
        user_id: UserId,
        wishlist: &Wishlist,
    ) -> Result<(), RepositoryError> {
        self.tables
            .write()
            .await
            .wishlists
            .insert(user_id, wishlist.clone());
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn reviews_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .reviews
            .iter()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn insert_review(
        &self,
        review: &Review,
    ) -> Result<Option<RatingSummary>, RepositoryError> {
        let mut tables = self.tables.write().await;
        tables.reviews.push(review.clone());
        let summary = tables.ratings_for(review.product_id);
        Ok(tables.product_mut(review.product_id).map(|product| {
            product.set_rating_summary(summary);
            summary
        }))
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order_clearing_cart(&self, order: &Order) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        tables.orders.push(order.clone());
        Ok(tables.carts.remove(&order.user_id).is_some())
    }

    async fn order_for_user(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .iter()
            .find(|o| o.id == id && o.user_id == user_id)
            .cloned())
    }

    async fn confirm_order_payment(
        &self,
        id: OrderId,
        user_id: UserId,
        razorpay_payment_id: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .orders
            .iter_mut()
            .find(|o| o.id == id && o.user_id == user_id)
            .map(|order| {
                order.confirm_payment(razorpay_payment_id.to_owned());
                order.clone()
            }))
    }

    async fn set_order_status(
        &self,
        id: OrderId,
        status: &OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(tables.orders.iter_mut().find(|o| o.id == id).map(|order| {
            order.order_status = status.clone();
            order.clone()
        }))
    }

    async fn orders_for_user(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.orders_newest_first(limit, |o| o.user_id == user_id))
    }

    async fn all_orders(&self, limit: i64) -> Result<Vec<Order>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.orders_newest_first(limit, |_| true))
    }

    async fn orders_with_payment_status(
        &self,
        status: PaymentStatus,
        limit: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.orders_newest_first(limit, |o| o.payment_status == status))
    }

    async fn count_orders(&self) -> Result<i64, RepositoryError> {
        Ok(count(self.tables.read().await.orders.len()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use chrono::Duration;
    use rust_decimal::Decimal;
    use serde_json::Map;

    use emporium_core::{ReviewId, ShippingAddress};

    use crate::models::NewOrder;

    fn product(name: &str) -> Product {
        Product::new(ProductInput {
            name: name.to_string(),
            description: String::new(),
            price: Decimal::new(100, 0),
            category: "misc".to_string(),
            images: vec![],
            stock: 1,
            specifications: Map::new(),
        })
    }

    fn review(product_id: ProductId, rating: i32) -> Review {
        Review {
            id: ReviewId::generate(),
            product_id,
            user_id: UserId::generate(),
            user_name: "Ravi".to_string(),
            rating,
            comment: String::new(),
            created_at: Utc::now(),
        }
    }

    fn order(user_id: UserId) -> Order {
        Order::place(
            user_id,
            NewOrder {
                items: vec![],
                total_amount: Decimal::ONE,
                shipping_address: ShippingAddress::default(),
                razorpay_order_id: "order_1".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_insert_review_updates_aggregate() {
        let store = MemoryStore::new();
        let p = product("Lamp");
        store.insert_product(&p).await.unwrap();

        store.insert_review(&review(p.id, 5)).await.unwrap();
        let summary = store.insert_review(&review(p.id, 2)).await.unwrap().unwrap();
        assert_eq!(summary.ratings_count, 2);
        assert!((summary.ratings_avg - 3.5).abs() < f64::EPSILON);

        let stored = store.product_by_id(p.id).await.unwrap().unwrap();
        assert_eq!(stored.rating_summary(), summary);
    }

    #[tokio::test]
    async fn test_review_for_missing_product_is_kept() {
        let store = MemoryStore::new();
        let ghost = ProductId::generate();

        assert!(store.insert_review(&review(ghost, 4)).await.unwrap().is_none());
        assert_eq!(store.reviews_for_product(ghost).await.unwrap().len(), 1);
        assert!(store.product_by_id(ghost).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_order_insert_removes_cart() {
        let store = MemoryStore::new();
        let user = UserId::generate();
        store
            .upsert_cart(
                user,
                &[CartLine {
                    product_id: ProductId::generate(),
                    quantity: 1,
                }],
            )
            .await
            .unwrap();

        assert!(store.insert_order_clearing_cart(&order(user)).await.unwrap());
        assert!(store.cart_for_user(user).await.unwrap().is_none());
        assert!(!store.insert_order_clearing_cart(&order(user)).await.unwrap());
    }

    #[tokio::test]
    async fn test_orders_newest_first_and_capped() {
        let store = MemoryStore::new();
        let user = UserId::generate();
        let mut older = order(user);
        older.created_at -= Duration::minutes(5);
        let newer = order(user);
        store.insert_order_clearing_cart(&newer).await.unwrap();
        store.insert_order_clearing_cart(&older).await.unwrap();
        store
            .insert_order_clearing_cart(&order(UserId::generate()))
            .await
            .unwrap();

        let mine = store.orders_for_user(user, 10).await.unwrap();
        assert_eq!(
            mine.iter().map(|o| o.id).collect::<Vec<_>>(),
            vec![newer.id, older.id]
        );
        assert_eq!(store.all_orders(2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_confirm_payment_is_owner_scoped() {
        let store = MemoryStore::new();
        let owner = UserId::generate();
        let o = order(owner);
        store.insert_order_clearing_cart(&o).await.unwrap();

        let foreign = store
            .confirm_order_payment(o.id, UserId::generate(), "pay_1")
            .await
            .unwrap();
        assert!(foreign.is_none());

        let confirmed = store
            .confirm_order_payment(o.id, owner, "pay_1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(confirmed.payment_status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn test_update_product_keeps_ratings() {
        let store = MemoryStore::new();
        let p = product("Chair");
        store.insert_product(&p).await.unwrap();
        store.insert_review(&review(p.id, 3)).await.unwrap();

        let input = ProductInput {
            name: "Armchair".to_string(),
            description: String::new(),
            price: Decimal::new(250, 0),
            category: "furniture".to_string(),
            images: vec![],
            stock: 2,
            specifications: Map::new(),
        };
        let updated = store.update_product(p.id, &input).await.unwrap().unwrap();
        assert_eq!(updated.name, "Armchair");
        assert_eq!(updated.ratings_count, 1);

        assert!(
            store
                .update_product(ProductId::generate(), &input)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        let user = User {
            id: UserId::generate(),
            email: Email::parse("meera@example.in").unwrap(),
            name: "Meera".to_string(),
            phone: None,
            role: Role::Customer,
            created_at: Utc::now(),
        };
        store.insert_user(&user, "hash").await.unwrap();

        let twin = User {
            id: UserId::generate(),
            ..user.clone()
        };
        assert!(matches!(
            store.insert_user(&twin, "hash").await,
            Err(RepositoryError::Conflict(_))
        ));
    }
}
