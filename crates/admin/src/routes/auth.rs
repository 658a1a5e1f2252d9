//! Admin sign-in route handlers.
//!
//! The admin panel has a single shared password, stored as an argon2 PHC
//! hash in `ADMIN_PASSWORD_HASH`.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_admin};
use crate::middleware::AdminSession;
use crate::state::AppState;

/// Body for admin sign-in.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// POST /api/auth/login
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: AdminSession,
    Json(request): Json<LoginRequest>,
) -> Result<StatusCode> {
    if !verify_password(&request.password, state.config().password_hash())? {
        warn!("Rejected admin sign-in");
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    session.sign_in().await?;
    set_sentry_admin();
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/auth/logout
#[instrument(skip_all)]
pub async fn logout(session: AdminSession) -> Result<StatusCode> {
    session.sign_out().await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// Check `password` against a PHC hash.
///
/// # Errors
///
/// Returns `Internal` if the stored hash cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("invalid admin password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};

    use super::*;

    fn hash(password: &str) -> String {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_verify_password() {
        let stored = hash("correct horse battery");
        assert!(verify_password("correct horse battery", &stored).unwrap());
        assert!(!verify_password("wrong", &stored).unwrap());
    }

    #[test]
    fn test_verify_password_rejects_garbage_hash() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }
}
