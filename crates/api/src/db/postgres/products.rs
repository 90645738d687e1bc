//! Catalog queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder};

use emporium_core::{ProductId, RatingSummary};

use super::PgStore;
use crate::db::{ProductStore, RepositoryError};
use crate::models::{Product, ProductFilter, ProductInput};

pub(super) const PRODUCT_COLUMNS: &str = "id, name, description, price, category, images, stock, \
     specifications, ratings_avg, ratings_count, created_at";

#[derive(sqlx::FromRow)]
pub(super) struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Decimal,
    category: String,
    images: Json<Vec<String>>,
    stock: i32,
    specifications: Json<Map<String, Value>>,
    ratings_avg: f64,
    ratings_count: i64,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            category: row.category,
            images: row.images.0,
            stock: row.stock,
            specifications: row.specifications.0,
            ratings_avg: row.ratings_avg,
            ratings_count: row.ratings_count,
            created_at: row.created_at,
        }
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl ProductStore for PgStore {
    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO products (id, name, description, price, category, images, stock,
                                  specifications, ratings_avg, ratings_count, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.category)
        .bind(Json(&product.images))
        .bind(product.stock)
        .bind(Json(&product.specifications))
        .bind(product.ratings_avg)
        .bind(product.ratings_count)
        .bind(product.created_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE products
            SET name = $2, description = $3, price = $4, category = $5,
                images = $6, stock = $7, specifications = $8
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(&input.category)
        .bind(Json(&input.images))
        .bind(input.stock)
        .bind(Json(&input.specifications))
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Product::from))
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Product::from))
    }

    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<uuid::Uuid> = ids.iter().map(ProductId::as_uuid).collect();
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)"
        ))
        .bind(uuids)
        .fetch_all(self.pool())
        .await?;

        // Restore the caller's order; ANY() returns rows in arbitrary order.
        let mut products: Vec<Product> = rows.into_iter().map(Product::from).collect();
        products.sort_by_key(|p| ids.iter().position(|id| *id == p.id));
        Ok(products)
    }

    async fn search_products(
        &self,
        filter: &ProductFilter,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE TRUE"));

        if let Some(category) = &filter.category {
            query.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(search) = &filter.search {
            query
                .push(" AND name ILIKE ")
                .push_bind(like_pattern(search));
        }
        if let Some(min_price) = filter.min_price {
            query.push(" AND price >= ").push_bind(min_price);
        }
        if let Some(max_price) = filter.max_price {
            query.push(" AND price <= ").push_bind(max_price);
        }
        if let Some(min_rating) = filter.min_rating {
            query.push(" AND ratings_avg >= ").push_bind(min_rating);
        }
        query
            .push(" ORDER BY created_at, id LIMIT ")
            .push_bind(limit);

        let rows = query
            .build_query_as::<ProductRow>()
            .fetch_all(self.pool())
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn count_products(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    async fn set_rating_summary(
        &self,
        id: ProductId,
        summary: RatingSummary,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("UPDATE products SET ratings_avg = $1, ratings_count = $2 WHERE id = $3")
                .bind(summary.ratings_avg)
                .bind(summary.ratings_count)
                .bind(id)
                .execute(self.pool())
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
