//! Payment error types.

use thiserror::Error;

use emporium_core::MoneyError;

/// Errors from the payment bridge.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The gateway rejected or failed the request. Carries its message.
    #[error("{0}")]
    Gateway(String),

    /// The amount cannot be expressed in minor units.
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] MoneyError),

    /// The payment signature did not check out, for whatever reason.
    #[error("Payment verification failed")]
    VerificationFailed,
}
