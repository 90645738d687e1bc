//! Cart and wishlist service.
//!
//! Neither structure checks product existence or stock when written. On
//! read, lines whose product has since been deleted are silently dropped.

use tracing::{debug, instrument};

use emporium_core::{CartLine, ProductId, UserId};

use super::CommerceError;
use crate::db::Store;
use crate::models::{CartItemView, CartView, WishlistView};

pub struct CartService<'a> {
    store: &'a dyn Store,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// The user's cart with live product details. No cart reads as empty.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the store fails.
    pub async fn get_cart(&self, user_id: UserId) -> Result<CartView, CommerceError> {
        let Some(cart) = self.store.cart_for_user(user_id).await? else {
            return Ok(CartView::default());
        };

        let ids: Vec<ProductId> = cart.items.iter().map(|line| line.product_id).collect();
        let products = self.store.products_by_ids(&ids).await?;

        let items = cart
            .items
            .into_iter()
            .filter_map(|line| {
                products
                    .iter()
                    .find(|p| p.id == line.product_id)
                    .map(|product| CartItemView {
                        product_id: line.product_id,
                        quantity: line.quantity,
                        product: product.clone(),
                    })
            })
            .collect();

        Ok(CartView { items })
    }

    /// Replace the whole cart.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::InvalidCart` if any quantity is below one.
    #[instrument(skip(self, items), fields(lines = items.len()))]
    pub async fn set_cart(&self, user_id: UserId, items: &[CartLine]) -> Result<(), CommerceError> {
        CartLine::validate_all(items)?;
        self.store.upsert_cart(user_id, items).await?;
        Ok(())
    }

    /// Wishlisted products that still exist, in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the store fails.
    pub async fn get_wishlist(&self, user_id: UserId) -> Result<WishlistView, CommerceError> {
        let Some(wishlist) = self.store.wishlist_for_user(user_id).await? else {
            return Ok(WishlistView::default());
        };
        let products = self.store.products_by_ids(wishlist.ids()).await?;
        Ok(WishlistView { products })
    }

    /// Add a product. Adding one already present changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the store fails.
    #[instrument(skip(self))]
    pub async fn add_to_wishlist(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), CommerceError> {
        let mut wishlist = self
            .store
            .wishlist_for_user(user_id)
            .await?
            .unwrap_or_default();
        if wishlist.add(product_id) {
            self.store.upsert_wishlist(user_id, &wishlist).await?;
        } else {
            debug!("Product already wishlisted");
        }
        Ok(())
    }

    /// Remove a product. Removing one that is absent succeeds.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the store fails.
    #[instrument(skip(self))]
    pub async fn remove_from_wishlist(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), CommerceError> {
        if let Some(mut wishlist) = self.store.wishlist_for_user(user_id).await?
            && wishlist.remove(product_id)
        {
            self.store.upsert_wishlist(user_id, &wishlist).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::Map;

    use super::*;
    use crate::db::{MemoryStore, ProductStore};
    use crate::models::{Product, ProductInput};

    async fn seed(store: &MemoryStore, name: &str) -> Product {
        let product = Product::new(ProductInput {
            name: name.to_string(),
            description: String::new(),
            price: Decimal::new(10, 0),
            category: "misc".to_string(),
            images: vec![],
            stock: 1,
            specifications: Map::new(),
        });
        store.insert_product(&product).await.unwrap();
        product
    }

    #[tokio::test]
    async fn test_cart_skips_deleted_products() {
        let store = MemoryStore::new();
        let kept = seed(&store, "Pen").await;
        let gone = seed(&store, "Ink").await;
        let user = UserId::generate();
        let carts = CartService::new(&store);

        carts
            .set_cart(
                user,
                &[
                    CartLine {
                        product_id: gone.id,
                        quantity: 1,
                    },
                    CartLine {
                        product_id: kept.id,
                        quantity: 3,
                    },
                ],
            )
            .await
            .unwrap();
        store.delete_product(gone.id).await.unwrap();

        let view = carts.get_cart(user).await.unwrap();
        assert_eq!(view.items.len(), 1);
        let line = view.items.first().unwrap();
        assert_eq!(line.product_id, kept.id);
        assert_eq!(line.quantity, 3);
    }

    #[tokio::test]
    async fn test_set_cart_rejects_zero_quantity() {
        let store = MemoryStore::new();
        let carts = CartService::new(&store);
        let result = carts
            .set_cart(
                UserId::generate(),
                &[CartLine {
                    product_id: ProductId::generate(),
                    quantity: 0,
                }],
            )
            .await;
        assert!(matches!(result, Err(CommerceError::InvalidCart(_))));
    }

    #[tokio::test]
    async fn test_no_cart_reads_empty() {
        let store = MemoryStore::new();
        let view = CartService::new(&store)
            .get_cart(UserId::generate())
            .await
            .unwrap();
        assert!(view.items.is_empty());
    }

    #[tokio::test]
    async fn test_wishlist_add_twice_and_remove_absent() {
        let store = MemoryStore::new();
        let lamp = seed(&store, "Lamp").await;
        let user = UserId::generate();
        let carts = CartService::new(&store);

        carts.add_to_wishlist(user, lamp.id).await.unwrap();
        carts.add_to_wishlist(user, lamp.id).await.unwrap();
        assert_eq!(carts.get_wishlist(user).await.unwrap().products.len(), 1);

        carts
            .remove_from_wishlist(user, ProductId::generate())
            .await
            .unwrap();
        carts
            .remove_from_wishlist(UserId::generate(), lamp.id)
            .await
            .unwrap();
        assert_eq!(carts.get_wishlist(user).await.unwrap().products.len(), 1);

        carts.remove_from_wishlist(user, lamp.id).await.unwrap();
        assert!(carts.get_wishlist(user).await.unwrap().products.is_empty());
    }
}
