//! Application state shared across handlers.

use std::sync::Arc;

use taskie_core::AccessPolicy;

use crate::config::ServerConfig;
use crate::db::Store;
use crate::services::{
    AuthService, DashboardService, LocationService, TaskService, TokenService, UpdateService,
    UserService,
};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// store, the token service, and the access policy. The signing key and
/// policy are fixed after startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: Arc<dyn Store>,
    tokens: TokenService,
    policy: AccessPolicy,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `store` - Backing store (`PostgreSQL` or in-memory)
    #[must_use]
    pub fn new(config: ServerConfig, store: Arc<dyn Store>) -> Self {
        let tokens = TokenService::new(&config.token.secret, config.token.ttl);
        let policy = AccessPolicy::new(config.delete_policy);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                tokens,
                policy,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the backing store.
    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    /// Get a reference to the session token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// The access policy in effect.
    #[must_use]
    pub fn policy(&self) -> AccessPolicy {
        self.inner.policy
    }

    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.store(), self.tokens())
    }

    #[must_use]
    pub fn tasks(&self) -> TaskService<'_> {
        TaskService::new(self.store(), self.policy())
    }

    #[must_use]
    pub fn locations(&self) -> LocationService<'_> {
        LocationService::new(self.store(), self.policy())
    }

    #[must_use]
    pub fn updates(&self) -> UpdateService<'_> {
        UpdateService::new(self.store(), self.policy())
    }

    #[must_use]
    pub fn users(&self) -> UserService<'_> {
        UserService::new(self.store(), self.policy())
    }

    #[must_use]
    pub fn dashboard(&self) -> DashboardService<'_> {
        DashboardService::new(self.store())
    }
}
