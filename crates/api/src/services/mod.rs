//! Business logic services.
//!
//! Services borrow the store (and whatever else they need) from
//! [`AppState`](crate::state::AppState) for the duration of one request.

pub mod auth;
pub mod cart;
pub mod catalog;
mod error;
pub mod orders;
pub mod payments;
pub mod reviews;

pub use error::CommerceError;
