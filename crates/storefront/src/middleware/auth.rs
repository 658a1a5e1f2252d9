//! Authentication extractors.
//!
//! Provides extractors for requiring a signed-in shopper in route handlers.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use super::session::ShopperSession;
use crate::models::CurrentUser;

/// Extractor that requires a signed-in shopper.
///
/// When nobody is signed in, the requested path is remembered in the session
/// so login can send the shopper back to it, and the request is rejected
/// with 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Rejection for [`RequireAuth`].
#[derive(Debug)]
pub enum AuthRejection {
    /// No signed-in user.
    Unauthorized,
    /// The session store failed.
    Session,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Please sign in to continue" })),
            )
                .into_response(),
            Self::Session => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(ShopperSession::new)
            .ok_or(AuthRejection::Session)?;

        match session.current_user().await {
            Ok(Some(user)) => Ok(Self(user)),
            Ok(None) => {
                let path = parts
                    .uri
                    .path_and_query()
                    .map_or_else(|| parts.uri.path().to_owned(), ToString::to_string);
                if let Err(e) = session.remember_return_to(&path).await {
                    tracing::warn!(error = %e, "failed to remember return path");
                }
                Err(AuthRejection::Unauthorized)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to read session");
                Err(AuthRejection::Session)
            }
        }
    }
}
