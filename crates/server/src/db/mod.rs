//! Persistence for users, tasks, locations, and company updates.
//!
//! # Backends
//!
//! - [`PgStore`] - `PostgreSQL` via `sqlx`
//! - [`MemoryStore`] - process-local tables behind one lock (`DATABASE_URL=memory://`, tests)
//!
//! Handlers and services only see `Arc<dyn Store>`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p taskie-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use taskie_core::{Email, LocationId, Role, TaskId, UpdateId, UserId};

use crate::models::{
    CompanyUpdate, Location, LocationPatch, NewCompanyUpdate, NewLocation, NewTask, NewUser,
    PermissionsPatch, Task, TaskPatch, User,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Credential store.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user with role `user` and no capabilities.
    ///
    /// Fails with [`RepositoryError::Conflict`] if the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError>;

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// All users, oldest first.
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError>;

    /// Fails with [`RepositoryError::NotFound`] for an unknown user.
    async fn update_permissions(
        &self,
        id: UserId,
        patch: PermissionsPatch,
    ) -> Result<User, RepositoryError>;

    /// Fails with [`RepositoryError::NotFound`] for an unknown user.
    async fn set_role(&self, id: UserId, role: Role) -> Result<User, RepositoryError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create_task(&self, task: NewTask) -> Result<Task, RepositoryError>;

    /// All tasks, oldest first.
    async fn list_tasks(&self) -> Result<Vec<Task>, RepositoryError>;

    async fn find_task(&self, id: TaskId) -> Result<Option<Task>, RepositoryError>;

    /// Fails with [`RepositoryError::NotFound`] for an unknown task.
    async fn update_task(&self, id: TaskId, patch: TaskPatch) -> Result<Task, RepositoryError>;

    /// Fails with [`RepositoryError::NotFound`] for an unknown task.
    async fn delete_task(&self, id: TaskId) -> Result<(), RepositoryError>;

    async fn count_tasks(&self) -> Result<i64, RepositoryError>;
}

#[async_trait]
pub trait LocationStore: Send + Sync {
    async fn create_location(&self, location: NewLocation) -> Result<Location, RepositoryError>;

    /// All locations, oldest first.
    async fn list_locations(&self) -> Result<Vec<Location>, RepositoryError>;

    async fn find_location(&self, id: LocationId) -> Result<Option<Location>, RepositoryError>;

    /// Fails with [`RepositoryError::NotFound`] for an unknown location.
    async fn update_location(
        &self,
        id: LocationId,
        patch: LocationPatch,
    ) -> Result<Location, RepositoryError>;

    /// Fails with [`RepositoryError::NotFound`] for an unknown location.
    async fn delete_location(&self, id: LocationId) -> Result<(), RepositoryError>;

    async fn count_locations(&self) -> Result<i64, RepositoryError>;
}

#[async_trait]
pub trait UpdateStore: Send + Sync {
    async fn create_update(&self, update: NewCompanyUpdate)
    -> Result<CompanyUpdate, RepositoryError>;

    /// Up to `limit` updates, newest first; `None` returns all of them.
    async fn list_updates(&self, limit: Option<i64>) -> Result<Vec<CompanyUpdate>, RepositoryError>;

    /// Fails with [`RepositoryError::NotFound`] for an unknown update.
    async fn delete_update(&self, id: UpdateId) -> Result<(), RepositoryError>;

    async fn count_updates(&self) -> Result<i64, RepositoryError>;
}

/// Every store the server needs, plus a liveness probe.
#[async_trait]
pub trait Store: UserStore + TaskStore + LocationStore + UpdateStore {
    /// Check that the backing store answers.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
