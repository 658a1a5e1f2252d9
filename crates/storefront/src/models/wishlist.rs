//! Wishlist entries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use sillage_core::{PerfumeId, WishlistItemId};

/// A saved perfume with its catalog name and price.
#[derive(Debug, Clone, Serialize)]
pub struct WishlistItem {
    pub id: WishlistItemId,
    pub perfume_id: PerfumeId,
    pub name: String,
    pub display_price: String,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}
