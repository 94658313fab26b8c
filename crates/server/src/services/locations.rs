//! Location service.

use tracing::instrument;

use taskie_core::{AccessPolicy, Action, Identity, LocationId};

use super::{ResourceError, authorize};
use crate::db::Store;
use crate::models::{CreateLocationRequest, Location, UpdateLocationRequest};

/// Location operations gated by the permission model.
pub struct LocationService<'a> {
    store: &'a dyn Store,
    policy: AccessPolicy,
}

impl<'a> LocationService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store, policy: AccessPolicy) -> Self {
        Self { store, policy }
    }

    /// All locations. Not gated.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::Repository` if the store fails.
    pub async fn list(&self) -> Result<Vec<Location>, ResourceError> {
        Ok(self.store.list_locations().await?)
    }

    /// Create a location attributed to the caller.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::Forbidden` without the location-create
    /// capability, then `ResourceError::Validation` for a bad payload.
    #[instrument(skip(self, identity, request), fields(user_id = ?identity.user_id()))]
    pub async fn create(
        &self,
        identity: &Identity,
        request: CreateLocationRequest,
    ) -> Result<Location, ResourceError> {
        authorize(&self.policy, identity, Action::CreateLocation)?;
        let new_location = request.validate(identity.user_id())?;
        let location = self.store.create_location(new_location).await?;
        tracing::info!(location_id = %location.id, "Location created");
        Ok(location)
    }

    /// Apply an admin patch to a location.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::Forbidden` for non-admins,
    /// `ResourceError::Validation` for a bad payload, and
    /// `ResourceError::NotFound` for an unknown location.
    #[instrument(skip(self, identity, request), fields(user_id = ?identity.user_id()))]
    pub async fn update(
        &self,
        identity: &Identity,
        request: UpdateLocationRequest,
    ) -> Result<Location, ResourceError> {
        authorize(&self.policy, identity, Action::UpdateLocation)?;
        let (id, patch) = request.validate()?;
        Ok(self.store.update_location(id, patch).await?)
    }

    /// Delete a location under the configured delete policy.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::NotFound` for an unknown location, then
    /// `ResourceError::Forbidden` if the policy denies the caller.
    #[instrument(skip(self, identity), fields(user_id = ?identity.user_id()))]
    pub async fn delete(&self, identity: &Identity, id: LocationId) -> Result<(), ResourceError> {
        let location = self
            .store
            .find_location(id)
            .await?
            .ok_or(ResourceError::NotFound)?;
        authorize(
            &self.policy,
            identity,
            Action::DeleteLocation {
                created_by: location.created_by,
            },
        )?;
        self.store.delete_location(id).await?;
        tracing::info!(location_id = %id, "Location deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use taskie_core::{DeletePolicy, Permissions, Principal, Role, UserId};

    use super::*;
    use crate::db::{LocationStore, MemoryStore};

    fn user(id: i32, can_create_location: bool) -> Identity {
        Identity::User(Principal {
            user_id: UserId::new(id),
            role: Role::User,
            permissions: Permissions {
                can_create_task: true,
                can_create_location,
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

    fn request() -> CreateLocationRequest {
        CreateLocationRequest {
            name: Some("Depot".into()),
            address: Some("4 Quay St".into()),
            capacity: Some(json!("25")),
        }
    }

    #[tokio::test]
    async fn test_create_requires_location_capability() {
        let store = MemoryStore::new();
        let locations = LocationService::new(&store, AccessPolicy::default());

        // The task flag does not grant location creation.
        let err = locations.create(&user(2, false), request()).await.unwrap_err();
        assert!(matches!(err, ResourceError::Forbidden(Action::CreateLocation)));
        assert_eq!(store.count_locations().await.unwrap(), 0);

        let location = locations.create(&user(2, true), request()).await.unwrap();
        assert_eq!(location.capacity, 25);
        assert_eq!(location.created_by, Some(UserId::new(2)));
    }

    #[tokio::test]
    async fn test_admin_update_with_empty_patch_returns_unchanged() {
        let store = MemoryStore::new();
        let locations = LocationService::new(&store, AccessPolicy::default());
        let location = locations.create(&admin(), request()).await.unwrap();

        let same = locations
            .update(
                &admin(),
                UpdateLocationRequest {
                    location_id: Some(location.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(same, location);
    }

    #[tokio::test]
    async fn test_admin_only_delete_policy() {
        let store = MemoryStore::new();
        let locations = LocationService::new(&store, AccessPolicy::new(DeletePolicy::AdminOnly));
        let location = locations.create(&user(2, true), request()).await.unwrap();

        let err = locations.delete(&user(2, true), location.id).await.unwrap_err();
        assert!(matches!(err, ResourceError::Forbidden(_)));
        locations.delete(&admin(), location.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found_even_when_forbidden() {
        let store = MemoryStore::new();
        let locations = LocationService::new(&store, AccessPolicy::default());
        let err = locations
            .delete(&Identity::Anonymous, LocationId::new(404))
            .await
            .unwrap_err();
        assert!(matches!(err, ResourceError::NotFound));
    }
}
