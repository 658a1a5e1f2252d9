//! Newsletter subscriptions.

use sqlx::PgPool;

use sillage_core::Email;

use super::RepositoryError;

/// Repository for newsletter signups.
pub struct NewsletterRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NewsletterRepository<'a> {
    /// Create a new newsletter repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Subscribe an email. Returns `false` if it was already subscribed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn subscribe(&self, email: &Email) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO newsletter_subscriptions (email)
            VALUES ($1)
            ON CONFLICT (email) DO NOTHING
            ",
        )
        .bind(email.as_str())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
