//! HTTP middleware for admin.
//!
//! Layers, outermost first: Sentry, `TraceLayer`, sessions. Handlers that
//! need a signed-in admin take [`RequireAdmin`].

pub mod auth;
pub mod session;

pub use auth::{AdminAuthRejection, RequireAdmin};
pub use session::{AdminSession, SESSION_COOKIE_NAME, create_session_layer};
