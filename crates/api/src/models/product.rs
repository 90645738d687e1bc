//! Catalog types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use emporium_core::{ProductId, RatingSummary};

/// A catalog entry with its derived rating aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub images: Vec<String>,
    pub stock: i32,
    pub specifications: Map<String, Value>,
    pub ratings_avg: f64,
    pub ratings_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// A new product with no reviews yet.
    #[must_use]
    pub fn new(input: ProductInput) -> Self {
        Self {
            id: ProductId::generate(),
            name: input.name,
            description: input.description,
            price: input.price,
            category: input.category,
            images: input.images,
            stock: input.stock,
            specifications: input.specifications,
            ratings_avg: 0.0,
            ratings_count: 0,
            created_at: Utc::now(),
        }
    }

    /// Overwrite the editable fields. The rating aggregate is left alone.
    pub fn apply(&mut self, input: ProductInput) {
        self.name = input.name;
        self.description = input.description;
        self.price = input.price;
        self.category = input.category;
        self.images = input.images;
        self.stock = input.stock;
        self.specifications = input.specifications;
    }

    #[must_use]
    pub const fn rating_summary(&self) -> RatingSummary {
        RatingSummary {
            ratings_avg: self.ratings_avg,
            ratings_count: self.ratings_count,
        }
    }

    pub const fn set_rating_summary(&mut self, summary: RatingSummary) {
        self.ratings_avg = summary.ratings_avg;
        self.ratings_count = summary.ratings_count;
    }
}

/// Admin-supplied product fields, used for both create and full replace.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub specifications: Map<String, Value>,
}

/// Catalog search criteria. Every field is optional and they combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProductFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Case-insensitive substring of the name.
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Lower bound on `ratings_avg`, inclusive.
    pub min_rating: Option<f64>,
}

impl ProductFilter {
    /// Treat blank `category`/`search` as absent, matching how query strings
    /// like `?category=` are sent by clients.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.category = self.category.filter(|c| !c.is_empty());
        self.search = self.search.filter(|s| !s.is_empty());
        self
    }

    /// Whether `product` satisfies every present criterion.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if self
            .category
            .as_ref()
            .is_some_and(|category| product.category != *category)
        {
            return false;
        }
        if self.search.as_ref().is_some_and(|search| {
            !product
                .name
                .to_lowercase()
                .contains(&search.to_lowercase())
        }) {
            return false;
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        if self.min_rating.is_some_and(|min| product.ratings_avg < min) {
            return false;
        }
        true
    }
}
