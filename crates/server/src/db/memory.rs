//! In-memory store.
//!
//! All tables sit behind a single `RwLock`, so each operation (including the
//! email uniqueness check on insert) is atomic with respect to every other.
//! Data is lost when the process exits.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use taskie_core::{Email, LocationId, Permissions, Role, TaskId, UpdateId, UserId};

use super::{LocationStore, RepositoryError, Store, TaskStore, UpdateStore, UserStore};
use crate::models::{
    CompanyUpdate, Location, LocationPatch, NewCompanyUpdate, NewLocation, NewTask, NewUser,
    PermissionsPatch, Task, TaskPatch, User,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    tasks: BTreeMap<TaskId, Task>,
    locations: BTreeMap<LocationId, Location>,
    updates: BTreeMap<UpdateId, CompanyUpdate>,
    last_id: i32,
}

impl Tables {
    /// Ids are unique across tables, like a shared sequence.
    const fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

/// Process-local store for development and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn count(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let now = Utc::now();
        let id = UserId::new(tables.next_id());
        let record = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: Role::User,
            permissions: Permissions::NONE,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(id, record.clone());
        Ok(record)
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| &u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn update_permissions(
        &self,
        id: UserId,
        patch: PermissionsPatch,
    ) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        if !patch.is_empty() {
            user.permissions = patch.apply(user.permissions);
            user.updated_at = Utc::now();
        }
        Ok(user.clone())
    }

    async fn set_role(&self, id: UserId, role: Role) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        user.role = role;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create_task(&self, task: NewTask) -> Result<Task, RepositoryError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let id = TaskId::new(tables.next_id());
        let record = Task {
            id,
            name: task.name,
            status: task.status,
            due_date: task.due_date,
            created_by: task.created_by,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.insert(id, record.clone());
        Ok(record)
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, RepositoryError> {
        Ok(self.tables.read().await.tasks.values().cloned().collect())
    }

    async fn find_task(&self, id: TaskId) -> Result<Option<Task>, RepositoryError> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn update_task(&self, id: TaskId, patch: TaskPatch) -> Result<Task, RepositoryError> {
        let mut tables = self.tables.write().await;
        let task = tables.tasks.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        if !patch.is_empty() {
            patch.apply_to(task);
            task.updated_at = Utc::now();
        }
        Ok(task.clone())
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        tables
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn count_tasks(&self) -> Result<i64, RepositoryError> {
        Ok(count(self.tables.read().await.tasks.len()))
    }
}

#[async_trait]
impl LocationStore for MemoryStore {
    async fn create_location(&self, location: NewLocation) -> Result<Location, RepositoryError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let id = LocationId::new(tables.next_id());
        let record = Location {
            id,
            name: location.name,
            address: location.address,
            capacity: location.capacity,
            created_by: location.created_by,
            created_at: now,
            updated_at: now,
        };
        tables.locations.insert(id, record.clone());
        Ok(record)
    }

    async fn list_locations(&self) -> Result<Vec<Location>, RepositoryError> {
        Ok(self.tables.read().await.locations.values().cloned().collect())
    }

    async fn find_location(&self, id: LocationId) -> Result<Option<Location>, RepositoryError> {
        Ok(self.tables.read().await.locations.get(&id).cloned())
    }

    async fn update_location(
        &self,
        id: LocationId,
        patch: LocationPatch,
    ) -> Result<Location, RepositoryError> {
        let mut tables = self.tables.write().await;
        let location = tables
            .locations
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        if !patch.is_empty() {
            patch.apply_to(location);
            location.updated_at = Utc::now();
        }
        Ok(location.clone())
    }

    async fn delete_location(&self, id: LocationId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        tables
            .locations
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn count_locations(&self) -> Result<i64, RepositoryError> {
        Ok(count(self.tables.read().await.locations.len()))
    }
}

#[async_trait]
impl UpdateStore for MemoryStore {
    async fn create_update(
        &self,
        update: NewCompanyUpdate,
    ) -> Result<CompanyUpdate, RepositoryError> {
        let mut tables = self.tables.write().await;
        let id = UpdateId::new(tables.next_id());
        let record = CompanyUpdate {
            id,
            title: update.title,
            description: update.description,
            created_by: update.created_by,
            created_at: Utc::now(),
        };
        tables.updates.insert(id, record.clone());
        Ok(record)
    }

    async fn list_updates(&self, limit: Option<i64>) -> Result<Vec<CompanyUpdate>, RepositoryError> {
        let tables = self.tables.read().await;
        // Ids increase monotonically, so reverse id order is newest first.
        let newest_first = tables.updates.values().rev().cloned();
        Ok(match limit.and_then(|n| usize::try_from(n).ok()) {
            Some(n) => newest_first.take(n).collect(),
            None => newest_first.collect(),
        })
    }

    async fn delete_update(&self, id: UpdateId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        tables
            .updates
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn count_updates(&self) -> Result<i64, RepositoryError> {
        Ok(count(self.tables.read().await.updates.len()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
