//! Session middleware configuration and typed session access.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. Handlers never
//! touch raw session keys; they go through [`ShopperSession`].

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use sqlx::PgPool;
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;
use uuid::Uuid;

use sillage_core::cart::LocalCart;

use crate::config::StorefrontConfig;
use crate::models::CurrentUser;
use crate::signals::CartOwner;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "sillage_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Session keys.
pub mod session_keys {
    pub const CURRENT_USER: &str = "current_user";
    pub const GUEST_CART: &str = "guest_cart";
    pub const GUEST_KEY: &str = "guest_key";
    pub const RETURN_TO: &str = "return_to";
}

/// Create the session layer with `PostgreSQL` store.
///
/// # Arguments
///
/// * `pool` - `PostgreSQL` connection pool
/// * `config` - Storefront configuration (for the cookie's secure flag)
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore> {
    // The sessions table is created by the migrations
    let store = PostgresStore::new(pool.clone());

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Typed view of the shopper's session.
///
/// Holds the signed-in user, the guest cart, the guest key that identifies an
/// anonymous cart owner, and the path to return to after sign-in.
#[derive(Clone)]
pub struct ShopperSession(Session);

impl<S> FromRequestParts<S> for ShopperSession
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

impl ShopperSession {
    /// Wrap a raw session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self(session)
    }

    /// The signed-in user, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn current_user(&self) -> SessionResult<Option<CurrentUser>> {
        self.0.get(session_keys::CURRENT_USER).await
    }

    /// Record a sign-in. The session id is cycled to prevent fixation.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn sign_in(&self, user: &CurrentUser) -> SessionResult<()> {
        self.0.cycle_id().await?;
        self.0.insert(session_keys::CURRENT_USER, user).await
    }

    /// Drop everything held in the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn sign_out(&self) -> SessionResult<()> {
        self.0.flush().await
    }

    /// The guest cart (empty if none was stored).
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn local_cart(&self) -> SessionResult<LocalCart> {
        Ok(self
            .0
            .get::<LocalCart>(session_keys::GUEST_CART)
            .await?
            .unwrap_or_default())
    }

    /// Persist the guest cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn save_local_cart(&self, cart: &LocalCart) -> SessionResult<()> {
        if cart.is_empty() {
            self.0.remove::<LocalCart>(session_keys::GUEST_CART).await?;
            return Ok(());
        }
        self.0.insert(session_keys::GUEST_CART, cart).await
    }

    /// Key identifying this anonymous shopper, created on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn guest_key(&self) -> SessionResult<Uuid> {
        if let Some(key) = self.0.get::<Uuid>(session_keys::GUEST_KEY).await? {
            return Ok(key);
        }
        let key = Uuid::new_v4();
        self.0.insert(session_keys::GUEST_KEY, key).await?;
        Ok(key)
    }

    /// Cart owner for this session: the account when signed in, else the guest.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn cart_owner(&self) -> SessionResult<CartOwner> {
        match self.current_user().await? {
            Some(user) => Ok(CartOwner::Account(user.id)),
            None => Ok(CartOwner::Guest(self.guest_key().await?)),
        }
    }

    /// Remember where to send the shopper after they sign in.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn remember_return_to(&self, path: &str) -> SessionResult<()> {
        self.0.insert(session_keys::RETURN_TO, path).await
    }

    /// Take (and forget) the remembered return path.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn take_return_to(&self) -> SessionResult<Option<String>> {
        self.0.remove(session_keys::RETURN_TO).await
    }
}
