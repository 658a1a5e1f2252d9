//! Cart views returned to the client.

use rust_decimal::Decimal;
use serde::Serialize;

use sillage_core::{CartLineId, CurrencyCode, PerfumeId, Price, Quantity};

/// One cart entry joined with catalog data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    /// Account cart row id; `None` for guest carts.
    pub line_id: Option<CartLineId>,
    pub perfume_id: PerfumeId,
    pub name: String,
    pub display_price: String,
    pub unit_price: Decimal,
    pub quantity: Quantity,
    pub image_url: Option<String>,
}

impl CartItemView {
    /// `unit_price * quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity.get())
    }
}

/// A whole cart with totals.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    /// Sum of quantities (the badge number).
    pub item_count: u32,
    pub total: Price,
    /// `total` formatted for display.
    pub total_display: String,
}

impl CartView {
    /// Build a view, computing the count and total.
    #[must_use]
    pub fn new(items: Vec<CartItemView>, currency: CurrencyCode) -> Self {
        let item_count = items
            .iter()
            .map(|item| u32::try_from(item.quantity.get()).unwrap_or(0))
            .fold(0, u32::saturating_add);
        let total = Price::new(items.iter().map(CartItemView::subtotal).sum(), currency);
        Self {
            items,
            item_count,
            total_display: total.display(),
            total,
        }
    }
}
