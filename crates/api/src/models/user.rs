//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use emporium_core::{Email, Role, UserId};

/// A registered account.
///
/// The password hash is deliberately not a field: stores hand it out only
/// through [`UserStore::user_with_password_hash`](crate::db::UserStore::user_with_password_hash),
/// so it cannot be serialized by accident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_json_shape() {
        let user = User {
            id: UserId::generate(),
            email: Email::parse("asha@example.in").unwrap(),
            name: "Asha".to_string(),
            phone: None,
            role: Role::Customer,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["email"], "asha@example.in");
        assert_eq!(json["role"], "customer");
        assert!(json["phone"].is_null());
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
        assert!(!user.is_admin());
    }
}
