//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use sillage_core::{Email, UserId};

/// A storefront account.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Normalized email address.
    pub email: Email,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
