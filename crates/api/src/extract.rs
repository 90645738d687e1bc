//! Request extractors whose rejections render as `{"detail": ...}`.
//!
//! Drop-in replacements for axum's `Json`, `Path` and `Query`: a malformed
//! body, path segment or query string becomes [`AppError::BadRequest`]
//! instead of axum's plain-text rejection.

use axum::extract::{FromRequest, FromRequestParts, Path, Query};

use crate::error::AppError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Typed path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Typed query string.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
