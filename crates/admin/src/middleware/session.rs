//! Session middleware configuration for admin.
//!
//! `PostgreSQL`-backed sessions with stricter settings than the storefront
//! (SameSite=Strict, 24hr expiry). The only state kept is whether the admin
//! has signed in.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use sqlx::PgPool;
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AdminConfig;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "sillage_admin_session";

/// Session expiry time in seconds (24 hours - stricter than storefront).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Session keys.
pub mod session_keys {
    pub const ADMIN_AUTHENTICATED: &str = "admin_authenticated";
}

/// Create the session layer with `PostgreSQL` store.
///
/// Shares the `tower_sessions.session` table with the storefront; the
/// cookie names differ so the two sessions never mix.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &AdminConfig,
) -> SessionManagerLayer<PostgresStore> {
    let store = PostgresStore::new(pool.clone());

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        // SameSite=Strict for admin (stricter than storefront's Lax)
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}

/// Typed view of the admin session.
#[derive(Clone)]
pub struct AdminSession(Session);

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(Self)
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "session layer missing"))
    }
}

type SessionResult<T> = Result<T, tower_sessions::session::Error>;

impl AdminSession {
    /// Wrap a raw session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self(session)
    }

    /// Whether the admin has signed in on this session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn is_authenticated(&self) -> SessionResult<bool> {
        Ok(self
            .0
            .get::<bool>(session_keys::ADMIN_AUTHENTICATED)
            .await?
            .unwrap_or(false))
    }

    /// Mark the session as signed in. The session id is cycled first.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn sign_in(&self) -> SessionResult<()> {
        self.0.cycle_id().await?;
        self.0.insert(session_keys::ADMIN_AUTHENTICATED, true).await
    }

    /// Drop the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn sign_out(&self) -> SessionResult<()> {
        self.0.flush().await
    }
}
