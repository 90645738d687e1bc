//! Roles and status values for users and orders.
//!
//! `Role` and `PaymentStatus` are closed sets. `OrderStatus` is deliberately
//! open: the lifecycle only ever writes `pending` and `confirmed`, but admins
//! may overwrite it with any label their fulfilment process uses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stores a `Display`/`FromStr` type in a Postgres `TEXT` column.
macro_rules! text_column {
    ($name:ty) => {
        #[cfg(feature = "postgres")]
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(s.parse::<$name>()?)
            }
        }

        #[cfg(feature = "postgres")]
        impl sqlx::Encode<'_, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.to_string(), buf)
            }
        }
    };
}

/// Error returned when a stored label is not a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

/// Account role. Admins manage the catalog and all orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

impl Role {
    /// The wire/storage label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownVariant {
                kind: "role",
                value: s.to_owned(),
            }),
        }
    }
}

text_column!(Role);

/// Payment state of an order. Moves `pending -> completed` once, when the
/// owner confirms the gateway payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
}

impl PaymentStatus {
    /// The wire/storage label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(UnknownVariant {
                kind: "payment status",
                value: s.to_owned(),
            }),
        }
    }
}

text_column!(PaymentStatus);

/// Fulfilment label of an order.
///
/// Not a state machine: any string is accepted, including moving back to
/// `pending` after confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderStatus(String);

impl OrderStatus {
    /// Label of a freshly placed order.
    pub const PENDING: &'static str = "pending";
    /// Label written when the owner confirms payment.
    pub const CONFIRMED: &'static str = "confirmed";

    /// Wrap an arbitrary, admin-supplied label verbatim.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Status of a freshly placed order.
    #[must_use]
    pub fn pending() -> Self {
        Self(Self::PENDING.to_owned())
    }

    /// Status after payment confirmation.
    #[must_use]
    pub fn confirmed() -> Self {
        Self(Self::CONFIRMED.to_owned())
    }

    /// Returns the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::pending()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for OrderStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

text_column!(OrderStatus);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_labels() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!("customer".parse::<Role>().unwrap(), Role::Customer);
        assert!("root".parse::<Role>().is_err());
        assert_eq!(Role::default(), Role::Customer);
    }

    #[test]
    fn test_role_serde_matches_labels() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }

    #[test]
    fn test_payment_status_labels() {
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
        assert_eq!(
            "completed".parse::<PaymentStatus>().unwrap(),
            PaymentStatus::Completed
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Completed).unwrap(),
            "\"completed\""
        );
    }

    #[test]
    fn test_order_status_accepts_any_label() {
        let shipped: OrderStatus = "shipped via courier".parse().unwrap();
        assert_eq!(shipped.as_str(), "shipped via courier");
        assert_eq!(OrderStatus::default(), OrderStatus::pending());
        assert_eq!(
            serde_json::to_string(&OrderStatus::confirmed()).unwrap(),
            "\"confirmed\""
        );
    }
}
