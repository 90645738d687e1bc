//! Emporium Core - Shared domain types.
//!
//! This crate provides the types used across all Emporium components:
//! - `api` - HTTP backend (catalog, cart, reviews, orders, payments)
//! - `cli` - Command-line tools for migrations and admin management
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP clients. The consistency rules that several stores must
//! agree on (rating aggregation, cart quantities, wishlist membership) live
//! here so every persistence backend applies the same arithmetic.
//!
//! # Modules
//!
//! - [`types`] - Typed ids, emails, statuses, money, ratings, carts and order snapshots

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
