//! Account queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use emporium_core::{Email, Role, UserId};

use super::{PgStore, conflict_on_unique};
use crate::db::{RepositoryError, UserStore};
use crate::models::User;

const USER_COLUMNS: &str = "id, email, name, phone, role, created_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    name: String,
    phone: Option<String>,
    role: Role,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        Ok(Self {
            id: row.id,
            email,
            name: row.name,
            phone: row.phone,
            role: row.role,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserWithHashRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: &User, password_hash: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO users (id, email, password_hash, name, phone, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(password_hash)
        .bind(&user.name)
        .bind(&user.phone)
        .bind(user.role)
        .bind(user.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| conflict_on_unique(e, "email"))?;
        Ok(())
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn user_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithHashRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool())
        .await?;

        match row {
            Some(r) => Ok(Some((User::try_from(r.user)?, r.password_hash))),
            None => Ok(None),
        }
    }

    async fn list_users(&self, limit: i64) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool())
        .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn count_users_with_role(&self, role: Role) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role)
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    async fn set_user_role(&self, email: &Email, role: Role) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE users SET role = $1 WHERE email = $2")
            .bind(role)
            .bind(email)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
