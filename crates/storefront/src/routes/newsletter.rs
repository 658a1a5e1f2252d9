//! Newsletter subscription route handler.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sillage_core::Email;

use crate::db::NewsletterRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Newsletter signup body.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

/// Newsletter signup result.
#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub subscribed: bool,
}

/// POST /api/newsletter
///
/// An address that is already subscribed gets the same success response.
#[instrument(skip(state, request))]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> Result<Json<SubscribeResponse>> {
    let email = Email::parse(&request.email)
        .map_err(|_| AppError::BadRequest("Please enter a valid email address".to_string()))?;

    let created = NewsletterRepository::new(state.pool())
        .subscribe(&email)
        .await?;
    if created {
        tracing::info!(domain = email.domain(), "newsletter subscription added");
    }

    Ok(Json(SubscribeResponse { subscribed: true }))
}
