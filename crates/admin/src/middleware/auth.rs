//! Authentication extractor for admin.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use super::session::AdminSession;

/// Extractor that requires a signed-in admin.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(_: RequireAdmin) -> impl IntoResponse {
///     "Hello, admin!"
/// }
/// ```
pub struct RequireAdmin;

/// Error returned when admin authentication is required but missing.
#[derive(Debug)]
pub enum AdminAuthRejection {
    /// Not signed in.
    Unauthorized,
    /// The session store failed.
    Session,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Admin sign-in required" })),
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

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(AdminSession::new)
            .ok_or(AdminAuthRejection::Session)?;

        match session.is_authenticated().await {
            Ok(true) => Ok(Self),
            Ok(false) => Err(AdminAuthRejection::Unauthorized),
            Err(e) => {
                tracing::error!(error = %e, "failed to read admin session");
                Err(AdminAuthRejection::Session)
            }
        }
    }
}
