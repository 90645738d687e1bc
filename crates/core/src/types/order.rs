//! Order snapshot types.
//!
//! An order copies product name and price at placement time. Later catalog
//! edits or deletions never change what an order says was bought.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::ProductId;

/// A frozen order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: i32,
}

impl OrderItem {
    /// Sum of `price * quantity` over the lines.
    ///
    /// Informational only: the order total is supplied by the client and
    /// stored as given.
    #[must_use]
    pub fn subtotal(items: &[Self]) -> Decimal {
        items
            .iter()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum()
    }
}

/// Free-form shipping address object, stored exactly as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShippingAddress(Map<String, Value>);

impl ShippingAddress {
    #[must_use]
    pub const fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Look up a single field, e.g. `"city"`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_subtotal() {
        let items = vec![
            OrderItem {
                product_id: ProductId::generate(),
                product_name: "Kettle".to_owned(),
                price: Decimal::new(1999, 2),
                quantity: 2,
            },
            OrderItem {
                product_id: ProductId::generate(),
                product_name: "Mug".to_owned(),
                price: Decimal::new(500, 2),
                quantity: 1,
            },
        ];
        assert_eq!(OrderItem::subtotal(&items), Decimal::new(4498, 2));
        assert_eq!(OrderItem::subtotal(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_shipping_address_must_be_object() {
        let address: ShippingAddress =
            serde_json::from_str(r#"{"city":"Pune","pin":"411001"}"#).unwrap();
        assert_eq!(address.get("city"), Some(&Value::from("Pune")));
        assert!(serde_json::from_str::<ShippingAddress>("\"Pune\"").is_err());
    }
}
