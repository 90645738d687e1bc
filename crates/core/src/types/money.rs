//! Money helpers.
//!
//! Amounts are carried as [`Decimal`] in the major currency unit (rupees,
//! dollars). Payment gateways want integer minor units (paise, cents).

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Errors converting an amount for the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    /// The amount does not fit in the gateway's integer range.
    #[error("amount {0} is out of range")]
    OutOfRange(Decimal),
}

/// Convert a major-unit amount to minor units: multiply by 100 and truncate
/// toward zero.
///
/// # Errors
///
/// Returns [`MoneyError::OutOfRange`] if the result does not fit in `i64`.
///
/// # Example
///
/// ```
/// use emporium_core::to_minor_units;
/// use rust_decimal::Decimal;
///
/// assert_eq!(to_minor_units(Decimal::new(49999, 2)).unwrap(), 49999);
/// assert_eq!(to_minor_units(Decimal::new(12345, 3)).unwrap(), 1234);
/// ```
pub fn to_minor_units(amount: Decimal) -> Result<i64, MoneyError> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|scaled| scaled.trunc())
        .and_then(|minor| minor.to_i64())
        .ok_or(MoneyError::OutOfRange(amount))
}
