//! Catalog types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use sillage_core::{PerfumeId, PerfumeImageId};

/// A perfume with its images.
#[derive(Debug, Clone, Serialize)]
pub struct Perfume {
    pub id: PerfumeId,
    pub name: String,
    pub description: String,
    /// Price as merchandised (e.g. "£85 / 50ml").
    pub display_price: String,
    /// Price used for cart and order arithmetic.
    pub price: Decimal,
    /// Fragrance notes, free text.
    pub notes: String,
    pub images: Vec<PerfumeImage>,
    pub created_at: DateTime<Utc>,
}

/// One product image.
#[derive(Debug, Clone, Serialize)]
pub struct PerfumeImage {
    pub id: PerfumeImageId,
    pub url: String,
    pub position: i32,
}

/// Listing entry: a perfume with only its lead image.
#[derive(Debug, Clone, Serialize)]
pub struct PerfumeSummary {
    pub id: PerfumeId,
    pub name: String,
    pub display_price: String,
    pub price: Decimal,
    pub notes: String,
    pub image_url: Option<String>,
}
