//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::db::Store;
use crate::services::auth::{AuthService, TokenIssuer};
use crate::services::cart::CartService;
use crate::services::catalog::CatalogService;
use crate::services::orders::OrderCoordinator;
use crate::services::payments::{PaymentBridge, PaymentGateway};
use crate::services::reviews::RatingAggregator;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The store and payment gateway
/// are trait objects so tests can run against the in-memory store and a fake
/// gateway.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    store: Arc<dyn Store>,
    gateway: Arc<dyn PaymentGateway>,
    tokens: TokenIssuer,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration
    /// * `store` - persistence backend
    /// * `gateway` - payment gateway client
    #[must_use]
    pub fn new(
        config: ApiConfig,
        store: Arc<dyn Store>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let tokens = TokenIssuer::new(&config.jwt.secret, config.jwt.expiration_hours);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                gateway,
                tokens,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }

    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.store(), self.tokens())
    }

    #[must_use]
    pub fn catalog(&self) -> CatalogService<'_> {
        CatalogService::new(self.store())
    }

    #[must_use]
    pub fn carts(&self) -> CartService<'_> {
        CartService::new(self.store())
    }

    #[must_use]
    pub fn reviews(&self) -> RatingAggregator<'_> {
        RatingAggregator::new(self.store())
    }

    #[must_use]
    pub fn orders(&self) -> OrderCoordinator<'_> {
        OrderCoordinator::new(self.store())
    }

    #[must_use]
    pub fn payments(&self) -> PaymentBridge<'_> {
        PaymentBridge::new(
            self.inner.gateway.as_ref(),
            &self.inner.config.razorpay.currency,
        )
    }
}
