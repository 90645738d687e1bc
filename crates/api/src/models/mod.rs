//! Domain models for the API.
//!
//! These are the shapes handlers return and stores persist. Row types used
//! by the Postgres backend live next to their queries in `db::postgres`.

pub mod cart;
pub mod order;
pub mod product;
pub mod review;
pub mod user;

pub use cart::{Cart, CartItemView, CartView, WishlistView};
pub use order::{AdminStats, NewOrder, Order};
pub use product::{Product, ProductFilter, ProductInput};
pub use review::{NewReview, Review};
pub use user::User;
