//! Core types for Emporium.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod money;
pub mod order;
pub mod rating;
pub mod status;

pub use cart::{CartLine, CartLineError, Wishlist};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::{MoneyError, to_minor_units};
pub use order::{OrderItem, ShippingAddress};
pub use rating::RatingSummary;
pub use status::*;
