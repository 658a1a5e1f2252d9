//! HTTP middleware and extractors for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, transaction per request)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)

pub mod auth;
pub mod session;

pub use auth::RequireAuth;
pub use session::{SESSION_COOKIE_NAME, ShopperSession, create_session_layer};
