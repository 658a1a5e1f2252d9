//! Catalog reads.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use sillage_core::{PerfumeId, PerfumeImageId};

use super::RepositoryError;
use crate::models::{Perfume, PerfumeImage, PerfumeSummary};

/// Maximum page size for catalog listings.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Repository for perfumes and their images.
pub struct PerfumeRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct PerfumeRow {
    id: PerfumeId,
    name: String,
    description: String,
    display_price: String,
    price: Decimal,
    notes: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: PerfumeId,
    name: String,
    display_price: String,
    price: Decimal,
    notes: String,
    image_url: Option<String>,
}

impl From<SummaryRow> for PerfumeSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            display_price: row.display_price,
            price: row.price,
            notes: row.notes,
            image_url: row.image_url,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ImageRow {
    id: PerfumeImageId,
    url: String,
    position: i32,
}

impl<'a> PerfumeRepository<'a> {
    /// Create a new perfume repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List perfumes by name, optionally filtered by a name/notes search.
    ///
    /// `limit` is clamped to `1..=MAX_PAGE_SIZE`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PerfumeSummary>, RepositoryError> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(s)));

        let rows = sqlx::query_as::<_, SummaryRow>(
            r"
            SELECT p.id, p.name, p.display_price, p.price, p.notes,
                   (SELECT i.url FROM perfume_images i
                     WHERE i.perfume_id = p.id
                     ORDER BY i.position, i.id
                     LIMIT 1) AS image_url
            FROM perfumes p
            WHERE $1::text IS NULL OR p.name ILIKE $1 OR p.notes ILIKE $1
            ORDER BY p.name, p.id
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(pattern)
        .bind(limit.clamp(1, MAX_PAGE_SIZE))
        .bind(offset.max(0))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(PerfumeSummary::from).collect())
    }

    /// Summaries for the given ids, in no particular order. Unknown ids are
    /// left out.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summaries(&self, ids: &[PerfumeId]) -> Result<Vec<PerfumeSummary>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i32> = ids.iter().map(PerfumeId::as_i32).collect();

        let rows = sqlx::query_as::<_, SummaryRow>(
            r"
            SELECT p.id, p.name, p.display_price, p.price, p.notes,
                   (SELECT i.url FROM perfume_images i
                     WHERE i.perfume_id = p.id
                     ORDER BY i.position, i.id
                     LIMIT 1) AS image_url
            FROM perfumes p
            WHERE p.id = ANY($1)
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(PerfumeSummary::from).collect())
    }

    /// Get one perfume with its images in position order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: PerfumeId) -> Result<Option<Perfume>, RepositoryError> {
        let Some(row) = sqlx::query_as::<_, PerfumeRow>(
            r"
            SELECT id, name, description, display_price, price, notes, created_at
            FROM perfumes
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let images = sqlx::query_as::<_, ImageRow>(
            r"
            SELECT id, url, position
            FROM perfume_images
            WHERE perfume_id = $1
            ORDER BY position, id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(Perfume {
            id: row.id,
            name: row.name,
            description: row.description,
            display_price: row.display_price,
            price: row.price,
            notes: row.notes,
            images: images
                .into_iter()
                .map(|i| PerfumeImage {
                    id: i.id,
                    url: i.url,
                    position: i.position,
                })
                .collect(),
            created_at: row.created_at,
        }))
    }

    /// Whether a perfume exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: PerfumeId) -> Result<bool, RepositoryError> {
        let found: Option<i32> = sqlx::query_scalar("SELECT 1 FROM perfumes WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(found.is_some())
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
