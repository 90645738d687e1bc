//! Catalog service.

use rust_decimal::Decimal;
use tracing::{info, instrument};

use emporium_core::ProductId;

use super::CommerceError;
use crate::db::{LIST_LIMIT, Store};
use crate::models::{Product, ProductFilter, ProductInput};

pub struct CatalogService<'a> {
    store: &'a dyn Store,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Search the catalog. Blank text filters are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the store fails.
    pub async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>, CommerceError> {
        let filter = filter.normalized();
        Ok(self.store.search_products(&filter, LIST_LIMIT).await?)
    }

    /// # Errors
    ///
    /// Returns `CommerceError::ProductNotFound` if no product has this id.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CommerceError> {
        self.store
            .product_by_id(id)
            .await?
            .ok_or(CommerceError::ProductNotFound)
    }

    /// # Errors
    ///
    /// Returns `CommerceError::InvalidProduct` for a negative price or stock.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: ProductInput) -> Result<Product, CommerceError> {
        validate(&input)?;
        let product = Product::new(input);
        self.store.insert_product(&product).await?;
        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Replace a product's editable fields. Ratings are untouched.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::InvalidProduct` for a negative price or stock,
    /// `CommerceError::ProductNotFound` if the product does not exist.
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: ProductId,
        input: ProductInput,
    ) -> Result<Product, CommerceError> {
        validate(&input)?;
        self.store
            .update_product(id, &input)
            .await?
            .ok_or(CommerceError::ProductNotFound)
    }

    /// Delete a product. Carts, wishlists and reviews that reference it are
    /// left alone; readers skip the dangling ids.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::ProductNotFound` if the product does not exist.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), CommerceError> {
        if self.store.delete_product(id).await? {
            info!("Product deleted");
            Ok(())
        } else {
            Err(CommerceError::ProductNotFound)
        }
    }
}

fn validate(input: &ProductInput) -> Result<(), CommerceError> {
    if input.price < Decimal::ZERO {
        return Err(CommerceError::InvalidProduct(
            "price must not be negative".to_string(),
        ));
    }
    if input.stock < 0 {
        return Err(CommerceError::InvalidProduct(
            "stock must not be negative".to_string(),
        ));
    }
    Ok(())
}
