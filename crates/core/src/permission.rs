//! Permission model.
//!
//! A single decision function maps an [`Identity`] and a requested [`Action`]
//! to allow/deny. Resource services and route guards both consult it; nothing
//! else in the workspace encodes who may do what.
//!
//! | action | admin | user with flag | user without flag | anonymous |
//! |---|---|---|---|---|
//! | `CreateTask` | allow | if `can_create_task` | deny | deny |
//! | `CreateLocation` | allow | if `can_create_location` | deny | deny |
//! | `UpdateTask` / `UpdateLocation` | allow | deny | deny | deny |
//! | `ManagePermissions` | allow | deny | deny | deny |
//! | `ManageUpdates` | allow | deny | deny | deny |
//! | `DeleteTask` / `DeleteLocation` | allow | see [`DeletePolicy`] | | |
//!
//! Reads are not gated here.

use serde::{Deserialize, Serialize};

use crate::types::{Role, UserId};

/// Capability flags granted to a non-admin user.
///
/// A closed record rather than an open map: the capability set is small and
/// every flag is named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    /// May create tasks.
    pub can_create_task: bool,
    /// May create locations.
    pub can_create_location: bool,
}

impl Permissions {
    /// No capabilities; the state of a freshly registered user.
    pub const NONE: Self = Self {
        can_create_task: false,
        can_create_location: false,
    };
}

/// An authenticated caller as seen by the permission model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// The user's ID.
    pub user_id: UserId,
    /// The user's role.
    pub role: Role,
    /// The user's capability flags (ignored for admins).
    pub permissions: Permissions,
}

impl Principal {
    /// Returns `true` if the principal has the admin role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Who is making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Identity {
    /// No valid session token was presented.
    #[default]
    Anonymous,
    /// A verified user.
    User(Principal),
}

impl Identity {
    /// The user ID, if authenticated.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::User(principal) => Some(principal.user_id),
        }
    }

    /// Returns `true` for an authenticated admin.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::User(principal) if principal.is_admin())
    }
}

impl From<Principal> for Identity {
    fn from(principal: Principal) -> Self {
        Self::User(principal)
    }
}

/// A mutating operation subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CreateTask,
    CreateLocation,
    UpdateTask,
    UpdateLocation,
    /// Delete a task; carries the task's creator, if known.
    DeleteTask { created_by: Option<UserId> },
    /// Delete a location; carries the location's creator, if known.
    DeleteLocation { created_by: Option<UserId> },
    ManagePermissions,
    /// Create or delete company updates.
    ManageUpdates,
}

impl Action {
    /// Stable name for logs and error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateTask => "createTask",
            Self::CreateLocation => "createLocation",
            Self::UpdateTask => "updateTask",
            Self::UpdateLocation => "updateLocation",
            Self::DeleteTask { .. } => "deleteTask",
            Self::DeleteLocation { .. } => "deleteLocation",
            Self::ManagePermissions => "managePermissions",
            Self::ManageUpdates => "manageUpdates",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Who may delete tasks and locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Admins, or the user who created the entity.
    #[default]
    AdminOrOwner,
    /// Admins only.
    AdminOnly,
    /// Anyone, including anonymous callers.
    Open,
}

impl std::str::FromStr for DeletePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin_or_owner" => Ok(Self::AdminOrOwner),
            "admin_only" => Ok(Self::AdminOnly),
            "open" => Ok(Self::Open),
            _ => Err(format!(
                "invalid delete policy {s:?} (expected admin_or_owner, admin_only or open)"
            )),
        }
    }
}

/// The decision table, parameterised by the configurable delete policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessPolicy {
    /// Delete rule for tasks and locations.
    pub delete: DeletePolicy,
}

impl AccessPolicy {
    /// Create a policy with the given delete rule.
    #[must_use]
    pub const fn new(delete: DeletePolicy) -> Self {
        Self { delete }
    }

    /// Decide whether `identity` may perform `action`.
    #[must_use]
    pub fn can_perform(&self, identity: &Identity, action: Action) -> bool {
        match action {
            Action::DeleteTask { created_by } | Action::DeleteLocation { created_by } => {
                self.can_delete(identity, created_by)
            }
            _ => match identity {
                Identity::Anonymous => false,
                Identity::User(principal) if principal.is_admin() => true,
                Identity::User(principal) => match action {
                    Action::CreateTask => principal.permissions.can_create_task,
                    Action::CreateLocation => principal.permissions.can_create_location,
                    _ => false,
                },
            },
        }
    }

    fn can_delete(&self, identity: &Identity, created_by: Option<UserId>) -> bool {
        if identity.is_admin() {
            return true;
        }
        match self.delete {
            DeletePolicy::Open => true,
            DeletePolicy::AdminOnly => false,
            DeletePolicy::AdminOrOwner => {
                matches!((identity.user_id(), created_by), (Some(me), Some(owner)) if me == owner)
            }
        }
    }
}

/// Decide `action` for `identity` under the default policy.
#[must_use]
pub fn can_perform(identity: &Identity, action: Action) -> bool {
    AccessPolicy::default().can_perform(identity, action)
}
