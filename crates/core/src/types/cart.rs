//! Cart lines and wishlist membership rules.
//!
//! Neither type checks that referenced products exist or have stock;
//! readers drop lines whose product has since disappeared.

use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Errors validating cart contents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartLineError {
    /// Quantity was zero or negative.
    #[error("quantity for product {product_id} must be a positive integer (got {quantity})")]
    NonPositiveQuantity {
        /// Offending line's product.
        product_id: ProductId,
        /// Offending quantity.
        quantity: i32,
    },
}

/// One `(product, quantity)` line of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: i32,
}

impl CartLine {
    /// Check every line of a replacement cart. Order is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`CartLineError::NonPositiveQuantity`] for the first line
    /// with a quantity below one.
    pub fn validate_all(lines: &[Self]) -> Result<(), CartLineError> {
        match lines.iter().find(|line| line.quantity < 1) {
            Some(line) => Err(CartLineError::NonPositiveQuantity {
                product_id: line.product_id,
                quantity: line.quantity,
            }),
            None => Ok(()),
        }
    }
}

/// The set of products a user saved for later, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist(Vec<ProductId>);

impl Wishlist {
    /// Build from stored ids, dropping duplicates but keeping first-seen order.
    #[must_use]
    pub fn from_ids(ids: impl IntoIterator<Item = ProductId>) -> Self {
        let mut wishlist = Self::default();
        for id in ids {
            wishlist.add(id);
        }
        wishlist
    }

    /// Add a product. Returns `false` if it was already present.
    pub fn add(&mut self, product_id: ProductId) -> bool {
        if self.contains(product_id) {
            return false;
        }
        self.0.push(product_id);
        true
    }

    /// Remove a product. Returns `false` if it was not present.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.0.len();
        self.0.retain(|id| *id != product_id);
        self.0.len() != before
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.0.contains(&product_id)
    }

    #[must_use]
    pub fn ids(&self) -> &[ProductId] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_positive_quantities() {
        let lines = [
            CartLine {
                product_id: ProductId::generate(),
                quantity: 2,
            },
            CartLine {
                product_id: ProductId::generate(),
                quantity: 1,
            },
        ];
        assert!(CartLine::validate_all(&lines).is_ok());
        assert!(CartLine::validate_all(&[]).is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_and_negative() {
        let product_id = ProductId::generate();
        for quantity in [0, -3] {
            let lines = [CartLine {
                product_id,
                quantity,
            }];
            assert_eq!(
                CartLine::validate_all(&lines),
                Err(CartLineError::NonPositiveQuantity {
                    product_id,
                    quantity
                })
            );
        }
    }

    #[test]
    fn test_wishlist_add_is_idempotent() {
        let id = ProductId::generate();
        let mut wishlist = Wishlist::default();
        assert!(wishlist.add(id));
        assert!(!wishlist.add(id));
        assert_eq!(wishlist.ids(), &[id]);
    }

    #[test]
    fn test_wishlist_remove_absent_is_noop() {
        let kept = ProductId::generate();
        let mut wishlist = Wishlist::from_ids([kept]);
        assert!(!wishlist.remove(ProductId::generate()));
        assert_eq!(wishlist.len(), 1);
        assert!(wishlist.remove(kept));
        assert!(wishlist.is_empty());
    }

    #[test]
    fn test_from_ids_dedupes_in_order() {
        let a = ProductId::generate();
        let b = ProductId::generate();
        let wishlist = Wishlist::from_ids([a, b, a]);
        assert_eq!(wishlist.ids(), &[a, b]);
    }
}
