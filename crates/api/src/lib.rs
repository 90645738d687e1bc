//! Emporium API - HTTP backend for a single-vendor shop.
//!
//! # Architecture
//!
//! - Axum web framework serving JSON under `/api`
//! - Stateless HS256 bearer tokens, re-checked against the user store per request
//! - Pluggable persistence behind the [`db::Store`] trait (`PostgreSQL` or in-memory)
//! - Razorpay for payment intents and signature verification
//!
//! The binary in `main.rs` wires configuration, tracing and Sentry around
//! [`routes::app`]. Tests build the same router over [`db::MemoryStore`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::AppError;
pub use routes::app;
pub use state::AppState;
