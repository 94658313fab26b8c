//! Task service.

use tracing::instrument;

use taskie_core::{AccessPolicy, Action, Identity, TaskId};

use super::{ResourceError, authorize};
use crate::db::Store;
use crate::models::{CreateTaskRequest, Task, UpdateTaskRequest};

/// Task operations gated by the permission model.
pub struct TaskService<'a> {
    store: &'a dyn Store,
    policy: AccessPolicy,
}

impl<'a> TaskService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store, policy: AccessPolicy) -> Self {
        Self { store, policy }
    }

    /// All tasks. Not gated.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::Repository` if the store fails.
    pub async fn list(&self) -> Result<Vec<Task>, ResourceError> {
        Ok(self.store.list_tasks().await?)
    }

    /// Create a task attributed to the caller.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::Forbidden` without the task-create capability,
    /// then `ResourceError::Validation` for a bad payload.
    #[instrument(skip(self, identity, request), fields(user_id = ?identity.user_id()))]
    pub async fn create(
        &self,
        identity: &Identity,
        request: CreateTaskRequest,
    ) -> Result<Task, ResourceError> {
        authorize(&self.policy, identity, Action::CreateTask)?;
        let new_task = request.validate(identity.user_id())?;
        let task = self.store.create_task(new_task).await?;
        tracing::info!(task_id = %task.id, "Task created");
        Ok(task)
    }

    /// Apply an admin patch to a task.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::Forbidden` for non-admins,
    /// `ResourceError::Validation` for a bad payload, and
    /// `ResourceError::NotFound` for an unknown task.
    #[instrument(skip(self, identity, request), fields(user_id = ?identity.user_id()))]
    pub async fn update(
        &self,
        identity: &Identity,
        request: UpdateTaskRequest,
    ) -> Result<Task, ResourceError> {
        authorize(&self.policy, identity, Action::UpdateTask)?;
        let (id, patch) = request.validate()?;
        Ok(self.store.update_task(id, patch).await?)
    }

    /// Delete a task under the configured delete policy.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::NotFound` for an unknown task, then
    /// `ResourceError::Forbidden` if the policy denies the caller.
    #[instrument(skip(self, identity), fields(user_id = ?identity.user_id()))]
    pub async fn delete(&self, identity: &Identity, id: TaskId) -> Result<(), ResourceError> {
        let task = self
            .store
            .find_task(id)
            .await?
            .ok_or(ResourceError::NotFound)?;
        authorize(
            &self.policy,
            identity,
            Action::DeleteTask {
                created_by: task.created_by,
            },
        )?;
        self.store.delete_task(id).await?;
        tracing::info!(task_id = %id, "Task deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use taskie_core::{DeletePolicy, Permissions, Principal, Role, TaskStatus, UserId};

    use super::*;
    use crate::db::{MemoryStore, TaskStore};

    fn user(id: i32, can_create_task: bool) -> Identity {
        Identity::User(Principal {
            user_id: UserId::new(id),
            role: Role::User,
            permissions: Permissions {
                can_create_task,
                can_create_location: false,
            },
        })
    }

    fn admin() -> Identity {
        Identity::User(Principal {
            user_id: UserId::new(1),
            role: Role::Admin,
            permissions: Permissions::NONE,
        })
    }

    fn request(name: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            name: Some(name.to_owned()),
            status: None,
            due_date: Some("2024-09-30".to_owned()),
        }
    }

    #[tokio::test]
    async fn test_create_without_capability_is_forbidden_and_changes_nothing() {
        let store = MemoryStore::new();
        let tasks = TaskService::new(&store, AccessPolicy::default());

        let before = store.count_tasks().await.unwrap();
        let err = tasks.create(&user(5, false), request("x")).await.unwrap_err();
        assert!(matches!(err, ResourceError::Forbidden(Action::CreateTask)));
        assert_eq!(store.count_tasks().await.unwrap(), before);

        let err = tasks
            .create(&Identity::Anonymous, request("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ResourceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_forbidden_checked_before_validation() {
        let store = MemoryStore::new();
        let tasks = TaskService::new(&store, AccessPolicy::default());
        let err = tasks
            .create(&user(5, false), CreateTaskRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ResourceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_create_records_creator() {
        let store = MemoryStore::new();
        let tasks = TaskService::new(&store, AccessPolicy::default());
        let task = tasks.create(&user(5, true), request("Count stock")).await.unwrap();
        assert_eq!(task.created_by, Some(UserId::new(5)));
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(tasks.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_is_admin_only() {
        let store = MemoryStore::new();
        let tasks = TaskService::new(&store, AccessPolicy::default());
        let task = tasks.create(&user(5, true), request("Count stock")).await.unwrap();

        let patch = || UpdateTaskRequest {
            task_id: Some(task.id),
            status: Some("completed".into()),
            ..Default::default()
        };

        let err = tasks.update(&user(5, true), patch()).await.unwrap_err();
        assert!(matches!(err, ResourceError::Forbidden(Action::UpdateTask)));

        let updated = tasks.update(&admin(), patch()).await.unwrap();
        assert_eq!(updated.status, TaskStatus::Completed);

        let err = tasks
            .update(
                &admin(),
                UpdateTaskRequest {
                    task_id: Some(TaskId::new(999)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ResourceError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_policy() {
        let store = MemoryStore::new();
        let tasks = TaskService::new(&store, AccessPolicy::default());
        let task = tasks.create(&user(5, true), request("Count stock")).await.unwrap();

        let err = tasks.delete(&user(6, true), task.id).await.unwrap_err();
        assert!(matches!(err, ResourceError::Forbidden(_)));
        let err = tasks.delete(&Identity::Anonymous, task.id).await.unwrap_err();
        assert!(matches!(err, ResourceError::Forbidden(_)));

        tasks.delete(&user(5, false), task.id).await.unwrap();
        let err = tasks.delete(&admin(), task.id).await.unwrap_err();
        assert!(matches!(err, ResourceError::NotFound));
    }

    #[tokio::test]
    async fn test_open_delete_policy_allows_anonymous() {
        let store = MemoryStore::new();
        let tasks = TaskService::new(&store, AccessPolicy::new(DeletePolicy::Open));
        let task = tasks.create(&admin(), request("Count stock")).await.unwrap();
        tasks.delete(&Identity::Anonymous, task.id).await.unwrap();
        assert_eq!(store.count_tasks().await.unwrap(), 0);
    }
}
