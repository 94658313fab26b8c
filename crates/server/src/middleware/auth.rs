//! Request authorization middleware and extractors.
//!
//! [`auth_middleware`] runs on every route. It moves a request from
//! `Unauthenticated` to `Authenticated` only when the `Authorization: Bearer`
//! token verifies and its user still exists. The user record is re-read on
//! every request, so role and capability changes apply to tokens that were
//! issued before the change.
//!
//! Handlers pick the guard they need:
//!
//! | extractor | unauthenticated | authenticated user | admin |
//! |---|---|---|---|
//! | [`CurrentIdentity`] | `Anonymous` | `User` | `User` |
//! | [`RequireAuth`] | 401 | ok | ok |
//! | [`RequireAdmin`] | 401 | 403 | ok |

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::Span;

use taskie_core::{Identity, Principal};

use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Per-request authorization state, stored in request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthContext {
    #[default]
    Unauthenticated,
    Authenticated(Principal),
}

impl AuthContext {
    /// The identity the permission model sees.
    #[must_use]
    pub const fn identity(&self) -> Identity {
        match self {
            Self::Unauthenticated => Identity::Anonymous,
            Self::Authenticated(principal) => Identity::User(*principal),
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Resolve the bearer token into an [`AuthContext`].
///
/// Invalid, expired, or orphaned tokens resolve to `Unauthenticated`; only a
/// store failure is an error.
async fn resolve(state: &AppState, headers: &HeaderMap) -> Result<AuthContext, AppError> {
    let Some(token) = bearer_token(headers) else {
        return Ok(AuthContext::Unauthenticated);
    };

    let user_id = match state.tokens().verify(token) {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            return Ok(AuthContext::Unauthenticated);
        }
    };

    match state.store().find_user_by_id(user_id).await? {
        Some(user) => Ok(AuthContext::Authenticated(user.principal())),
        None => {
            tracing::debug!(user_id = %user_id, "Bearer token for unknown user");
            Ok(AuthContext::Unauthenticated)
        }
    }
}

/// Middleware that attaches an [`AuthContext`] to every request.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let context = match resolve(&state, request.headers()).await {
        Ok(context) => context,
        Err(e) => return e.into_response(),
    };

    if let AuthContext::Authenticated(principal) = &context {
        Span::current().record("user_id", principal.user_id.as_i32());
        set_sentry_user(&principal.user_id);
    }

    request.extensions_mut().insert(context);
    next.run(request).await
}

fn context(parts: &Parts) -> AuthContext {
    parts
        .extensions
        .get::<AuthContext>()
        .copied()
        .unwrap_or_default()
}

/// Extractor for the caller's identity on public routes. Never rejects.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentIdentity(identity): CurrentIdentity) -> impl IntoResponse {
///     format!("admin: {}", identity.is_admin())
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CurrentIdentity(pub Identity);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(context(parts).identity()))
    }
}

/// Extractor that requires a verified user; rejects with 401 otherwise.
#[derive(Debug, Clone, Copy)]
pub struct RequireAuth(pub Principal);

impl RequireAuth {
    #[must_use]
    pub const fn identity(&self) -> Identity {
        Identity::User(self.0)
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match context(parts) {
            AuthContext::Authenticated(principal) => Ok(Self(principal)),
            AuthContext::Unauthenticated => Err(AppError::Unauthorized(
                "Authentication required".to_owned(),
            )),
        }
    }
}

/// Extractor that requires an admin; 401 when unauthenticated, 403 for users.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin(pub Principal);

impl RequireAdmin {
    #[must_use]
    pub const fn identity(&self) -> Identity {
        Identity::User(self.0)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(principal) = RequireAuth::from_request_parts(parts, state).await?;
        if principal.is_admin() {
            Ok(Self(principal))
        } else {
            tracing::warn!(user_id = %principal.user_id, path = %parts.uri.path(), "Admin route denied");
            Err(AppError::Forbidden("Admin access required".to_owned()))
        }
    }
}
