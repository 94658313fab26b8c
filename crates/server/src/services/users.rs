//! User administration service.

use tracing::instrument;

use taskie_core::{AccessPolicy, Action, Identity};

use super::{ResourceError, authorize};
use crate::db::Store;
use crate::models::{UpdatePermissionsRequest, User};

/// Admin view of user accounts and their capability flags.
pub struct UserService<'a> {
    store: &'a dyn Store,
    policy: AccessPolicy,
}

impl<'a> UserService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store, policy: AccessPolicy) -> Self {
        Self { store, policy }
    }

    /// All users with their permissions.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::Forbidden` for non-admins.
    pub async fn list(&self, identity: &Identity) -> Result<Vec<User>, ResourceError> {
        authorize(&self.policy, identity, Action::ManagePermissions)?;
        Ok(self.store.list_users().await?)
    }

    /// Grant or revoke capability flags.
    ///
    /// Takes effect on the target's next request; tokens are not reissued.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::Forbidden` for non-admins,
    /// `ResourceError::Validation` without a `userId`, and
    /// `ResourceError::NotFound` for an unknown user.
    #[instrument(skip(self, identity, request), fields(user_id = ?identity.user_id()))]
    pub async fn update_permissions(
        &self,
        identity: &Identity,
        request: UpdatePermissionsRequest,
    ) -> Result<User, ResourceError> {
        authorize(&self.policy, identity, Action::ManagePermissions)?;
        let (target, patch) = request.validate()?;
        let user = self.store.update_permissions(target, patch).await?;
        tracing::info!(
            target_user_id = %target,
            can_create_task = user.permissions.can_create_task,
            can_create_location = user.permissions.can_create_location,
            "Permissions updated"
        );
        Ok(user)
    }
}
