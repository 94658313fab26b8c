//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request span with `request_id` and `user_id` fields)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS
//! 5. Auth (resolve bearer token to an [`AuthContext`])

pub mod auth;
pub mod request_id;

pub use auth::{AuthContext, CurrentIdentity, RequireAdmin, RequireAuth, auth_middleware};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
