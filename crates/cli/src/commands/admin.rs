//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a new admin account
//! emporium admin create -e admin@example.com -n "Admin Name" -p 'long passphrase'
//!
//! # Promote an existing account
//! emporium admin promote -e shopper@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `EMPORIUM_ADMIN_PASSWORD` - alternative to `-p` for `admin create`

use emporium_api::db::{self, PgStore, UserStore};
use emporium_api::services::auth::{AuthError, create_account};
use emporium_core::{Email, EmailError, Role, UserId};
use thiserror::Error;

use super::{CommandError, database_url};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Could not create account: {0}")]
    Account(#[from] AuthError),

    #[error("Repository error: {0}")]
    Repository(#[from] db::RepositoryError),

    /// No account has the given email.
    #[error("No account found with email: {0}")]
    UserNotFound(String),
}

async fn connect() -> Result<PgStore, AdminError> {
    let database_url = database_url()?;
    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;
    Ok(PgStore::new(pool))
}

/// Create a new admin account.
///
/// # Returns
///
/// The ID of the created account.
///
/// # Errors
///
/// Returns `AdminError::Account` for an invalid email, a weak password or an
/// email that is already registered.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<UserId, AdminError> {
    let store = connect().await?;

    tracing::info!("Creating admin account: {}", email);
    let user = create_account(&store, email, password, name.to_owned(), None, Role::Admin).await?;

    tracing::info!(
        "Admin account created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(user.id)
}

/// Give an existing account the admin role.
///
/// # Errors
///
/// Returns `AdminError::UserNotFound` if no account has that email.
pub async fn promote_user(email: &str) -> Result<(), AdminError> {
    let email = Email::parse(email)?;
    let store = connect().await?;

    if !store.set_user_role(&email, Role::Admin).await? {
        return Err(AdminError::UserNotFound(email.into_inner()));
    }

    tracing::info!("Promoted {} to admin", email);
    Ok(())
}
