//! Unified error handling for admin.
//!
//! Every handler returns `Result<T, AppError>`. The response body is
//! `{"error": "<message>"}`; server-side failures go to Sentry and never
//! leak their details.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{InventoryError, OrderError};

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Stock adjustment failed.
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// Order status change failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

const fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::MissingInventory(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Database(err)
            | Self::Inventory(InventoryError::Repository(err))
            | Self::Order(OrderError::Repository(err)) => repository_status(err),
            Self::Inventory(InventoryError::OrderNotFound(_))
            | Self::Order(OrderError::NotFound(_))
            | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Inventory(InventoryError::BlankReason) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Order(OrderError::InvalidTransition { .. }) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Don't expose internal error details to clients
    fn public_message(&self) -> String {
        match self {
            Self::Database(err)
            | Self::Inventory(InventoryError::Repository(err))
            | Self::Order(OrderError::Repository(err)) => match err {
                RepositoryError::NotFound => "Not found".to_string(),
                RepositoryError::Conflict(msg) => msg.clone(),
                RepositoryError::MissingInventory(_) => err.to_string(),
                _ => "Internal server error".to_string(),
            },
            Self::Inventory(err) => err.to_string(),
            Self::Order(err) => err.to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Result type for admin handlers.
pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// Tag Sentry events with the signed-in admin.
pub fn set_sentry_admin() {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some("admin".to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
