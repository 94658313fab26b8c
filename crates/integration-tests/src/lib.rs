//! Integration test support for Taskie.
//!
//! Each [`TestContext`] builds the real router (same middleware stack as the
//! binary) over a fresh in-memory store and drives it in-process with
//! `tower::ServiceExt::oneshot`. No database or network is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p taskie-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use taskie_core::{DeletePolicy, Permissions, Role, UserId};
use taskie_server::config::{LogFormat, ServerConfig, TokenConfig};
use taskie_server::db::{MemoryStore, UserStore};
use taskie_server::models::PermissionsPatch;
use taskie_server::state::AppState;

/// Signing secret used by every test context.
pub const TEST_TOKEN_SECRET: &str = "kQ9#vT2$wX7!pL4@zR8&nM3*bH6^cJ1%";

/// Password used by the account helpers.
pub const TEST_PASSWORD: &str = "correct horse battery";

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// An account created through the HTTP surface.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: UserId,
    pub email: String,
    pub token: String,
}

/// In-process application plus direct access to its store.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    router: Router,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Context with the default delete policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(DeletePolicy::default())
    }

    #[must_use]
    pub fn with_policy(delete_policy: DeletePolicy) -> Self {
        let config = ServerConfig {
            database_url: SecretString::from("memory://"),
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            token: TokenConfig {
                secret: SecretString::from(TEST_TOKEN_SECRET),
                ttl: Duration::from_secs(3600),
            },
            delete_policy,
            cors_allowed_origins: None,
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
        };
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(config, store.clone());
        let router = taskie_server::app(state.clone());

        Self {
            store,
            state,
            router,
        }
    }

    /// Send a request; `path` is relative to `/api/v1` unless it starts with `//`.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let uri = path
            .strip_prefix("//")
            .map_or_else(|| format!("/api/v1{path}"), |root| format!("/{root}"));
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.send_raw(request).await
    }

    /// Send a fully built request.
    pub async fn send_raw(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::POST, path, token, Some(body)).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::PUT, path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::DELETE, path, token, None).await
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> TestResponse {
        self.post(
            "/register",
            None,
            json!({ "username": username, "email": email, "password": password }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post("/login", None, json!({ "email": email, "password": password }))
            .await
    }

    /// Register and log in a plain user.
    pub async fn user(&self, email: &str) -> Account {
        let registered = self.register("member", email, TEST_PASSWORD).await;
        assert_eq!(registered.status, StatusCode::CREATED, "{:?}", registered.body);
        let id = UserId::new(
            i32::try_from(registered.body["user"]["id"].as_i64().unwrap()).unwrap(),
        );

        let login = self.login(email, TEST_PASSWORD).await;
        assert_eq!(login.status, StatusCode::OK, "{:?}", login.body);

        Account {
            id,
            email: email.to_owned(),
            token: login.body["token"].as_str().unwrap().to_owned(),
        }
    }

    /// Register a user and promote them to admin, as the operator CLI would.
    pub async fn admin(&self, email: &str) -> Account {
        let account = self.user(email).await;
        self.store.set_role(account.id, Role::Admin).await.unwrap();
        account
    }

    /// Register a user holding the given capabilities.
    pub async fn user_with(&self, email: &str, permissions: Permissions) -> Account {
        let account = self.user(email).await;
        self.store
            .update_permissions(
                account.id,
                PermissionsPatch {
                    can_create_task: Some(permissions.can_create_task),
                    can_create_location: Some(permissions.can_create_location),
                },
            )
            .await
            .unwrap();
        account
    }

    /// Number of entities listed at a public `GET` route.
    pub async fn count(&self, path: &str) -> usize {
        let response = self.get(path, None).await;
        assert_eq!(response.status, StatusCode::OK);
        response.body.as_array().unwrap().len()
    }
}

/// A valid task payload.
#[must_use]
pub fn task_body(name: &str) -> Value {
    json!({ "name": name, "status": "pending", "due_date": "2024-10-01" })
}

/// A valid location payload.
#[must_use]
pub fn location_body(name: &str) -> Value {
    json!({ "name": name, "address": "12 Harbour Rd", "capacity": 30 })
}
