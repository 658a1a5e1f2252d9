//! Authentication route handlers.
//!
//! A successful sign-in or registration merges the session's guest cart into
//! the account cart, then collapses any duplicate rows the account cart holds.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::CartRepository;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::ShopperSession;
use crate::models::{CurrentUser, User};
use crate::services::{AuthService, CartService, MergeReport};
use crate::state::AppState;

/// Where to send the shopper after sign-in when no return path was remembered.
const DEFAULT_RETURN_TO: &str = "/account";

/// Credentials for login and registration.
///
/// Not `Debug`: it carries a plaintext password.
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Response after a successful sign-in.
#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub user: CurrentUser,
    /// Path the client should navigate to next.
    pub redirect_to: String,
    /// Outcome of merging the guest cart; absent when the merge could not run.
    pub merge: Option<MergeReport>,
}

/// POST /api/auth/register
#[instrument(skip(state, session, request), fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    session: ShopperSession,
    Json(request): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<SignInResponse>)> {
    let user = AuthService::new(state.pool())
        .register(&request.email, &request.password)
        .await?;

    let response = complete_sign_in(&state, &session, &user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/auth/login
#[instrument(skip(state, session, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    session: ShopperSession,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<SignInResponse>> {
    let user = AuthService::new(state.pool())
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(complete_sign_in(&state, &session, &user).await?))
}

/// POST /api/auth/logout
#[instrument(skip(session))]
pub async fn logout(session: ShopperSession) -> Result<StatusCode> {
    session.sign_out().await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// Record the sign-in, merge the guest cart and tidy the account cart.
///
/// Cart failures never fail the sign-in: a failed merge keeps the guest cart
/// in the session, and a failed cleanup is retried on the next cart read.
async fn complete_sign_in(
    state: &AppState,
    session: &ShopperSession,
    user: &User,
) -> Result<SignInResponse> {
    let current = CurrentUser::from(user);
    let return_to = session.take_return_to().await?;
    let guest_key = session.guest_key().await?;
    session.sign_in(&current).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    let carts = CartRepository::new(state.pool());
    let service = CartService::new(&carts, state.signals());

    let mut local = session.local_cart().await?;
    let merge = match service.reconcile(user.id, &mut local).await {
        Ok(report) => Some(report),
        Err(e) => {
            tracing::warn!(error = %e, "guest cart merge failed; keeping guest cart");
            None
        }
    };
    session.save_local_cart(&local).await?;

    if let Err(e) = service.remove_duplicates(user.id).await {
        tracing::warn!(error = %e, "cart cleanup after sign-in failed");
    }
    if merge.is_some() {
        service.notify_guest(guest_key, user.id).await;
    }

    Ok(SignInResponse {
        user: current,
        redirect_to: return_to.unwrap_or_else(|| DEFAULT_RETURN_TO.to_string()),
        merge,
    })
}
