//! Company update (announcement) service.

use tracing::instrument;

use taskie_core::{AccessPolicy, Action, Identity, UpdateId};

use super::{ResourceError, authorize};
use crate::db::Store;
use crate::models::{CompanyUpdate, CreateUpdateRequest};

/// Announcement operations; create and delete are admin-only.
pub struct UpdateService<'a> {
    store: &'a dyn Store,
    policy: AccessPolicy,
}

impl<'a> UpdateService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store, policy: AccessPolicy) -> Self {
        Self { store, policy }
    }

    /// All updates, newest first. Not gated.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::Repository` if the store fails.
    pub async fn list(&self) -> Result<Vec<CompanyUpdate>, ResourceError> {
        Ok(self.store.list_updates(None).await?)
    }

    /// Post an announcement.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::Forbidden` for non-admins, then
    /// `ResourceError::Validation` for a bad payload.
    #[instrument(skip(self, identity, request), fields(user_id = ?identity.user_id()))]
    pub async fn create(
        &self,
        identity: &Identity,
        request: CreateUpdateRequest,
    ) -> Result<CompanyUpdate, ResourceError> {
        authorize(&self.policy, identity, Action::ManageUpdates)?;
        let new_update = request.validate(identity.user_id())?;
        let update = self.store.create_update(new_update).await?;
        tracing::info!(update_id = %update.id, title = %update.title, "Company update posted");
        Ok(update)
    }

    /// Remove an announcement.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::Forbidden` for non-admins and
    /// `ResourceError::NotFound` for an unknown update.
    #[instrument(skip(self, identity), fields(user_id = ?identity.user_id()))]
    pub async fn delete(&self, identity: &Identity, id: UpdateId) -> Result<(), ResourceError> {
        authorize(&self.policy, identity, Action::ManageUpdates)?;
        self.store.delete_update(id).await?;
        tracing::info!(update_id = %id, "Company update deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use taskie_core::{Permissions, Principal, Role, UserId};

    use super::*;
    use crate::db::MemoryStore;

    fn identity(role: Role) -> Identity {
        Identity::User(Principal {
            user_id: UserId::new(1),
            role,
            permissions: Permissions {
                can_create_task: true,
                can_create_location: true,
            },
        })
    }

    #[tokio::test]
    async fn test_q3_announcement_lifecycle() {
        let store = MemoryStore::new();
        let updates = UpdateService::new(&store, AccessPolicy::default());
        let admin = identity(Role::Admin);
        let member = identity(Role::User);

        let posted = updates
            .create(
                &admin,
                CreateUpdateRequest {
                    title: Some("Q3".into()),
                    description: Some("meeting".into()),
                },
            )
            .await
            .unwrap();
        assert!(updates.list().await.unwrap().contains(&posted));

        let err = updates.delete(&member, posted.id).await.unwrap_err();
        assert!(matches!(err, ResourceError::Forbidden(Action::ManageUpdates)));
        assert!(updates.list().await.unwrap().contains(&posted));

        updates.delete(&admin, posted.id).await.unwrap();
        assert!(updates.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_member_cannot_post() {
        let store = MemoryStore::new();
        let updates = UpdateService::new(&store, AccessPolicy::default());
        let err = updates
            .create(&identity(Role::User), CreateUpdateRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ResourceError::Forbidden(_)));
    }
}
