//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! taskie-cli user list
//! taskie-cli user promote -e admin@example.com
//! taskie-cli user demote -e admin@example.com
//! ```

use taskie_core::{Email, Role};
use taskie_server::db::{PgStore, UserStore};

use super::{CommandError, connect};

/// Print every user with role and capability flags.
pub async fn list() -> Result<(), CommandError> {
    let store = PgStore::new(connect().await?);
    let users = store.list_users().await?;

    #[allow(clippy::print_stdout)]
    {
        println!(
            "{:>6}  {:<32}  {:<20}  {:<6}  {:<5}  {:<8}",
            "ID", "EMAIL", "USERNAME", "ROLE", "TASK", "LOCATION"
        );
        for user in &users {
            println!(
                "{:>6}  {:<32}  {:<20}  {:<6}  {:<5}  {:<8}",
                user.id.as_i32(),
                user.email.as_str(),
                user.username,
                user.role.to_string(),
                user.permissions.can_create_task,
                user.permissions.can_create_location,
            );
        }
    }

    tracing::info!("{} user(s)", users.len());
    Ok(())
}

/// Set the role of the user with `email`.
pub async fn set_role(email: &str, role: Role) -> Result<(), CommandError> {
    let email = Email::parse(email)?;
    let store = PgStore::new(connect().await?);

    let user = store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| CommandError::UserNotFound(email.to_string()))?;

    let updated = store.set_role(user.id, role).await?;
    tracing::info!("User {} ({}) now has role {}", updated.email, updated.id, updated.role);
    Ok(())
}
