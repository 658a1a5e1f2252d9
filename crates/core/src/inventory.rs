//! Stock records, the manual adjustment log, and reduction planning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::order::OrderItem;
use crate::types::{InventoryLogId, PerfumeId};

/// Stock count for one perfume.
///
/// `quantity` is signed: the manual adjustment path and order-driven
/// reductions are both allowed to push it below zero (backorders).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub perfume_id: PerfumeId,
    pub perfume_name: String,
    pub quantity: i32,
    pub updated_at: DateTime<Utc>,
}

/// One manual adjustment, as written to the inventory log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLogEntry {
    pub id: InventoryLogId,
    pub perfume_id: PerfumeId,
    pub old_quantity: i32,
    pub new_quantity: i32,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Units to take off one perfume's stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReduction {
    pub perfume_id: PerfumeId,
    pub quantity: i32,
}

/// One reduction per perfume in the order, in item order.
///
/// Items for the same perfume are summed so each stock row is touched once.
#[must_use]
pub fn reductions_for(items: &[OrderItem]) -> Vec<StockReduction> {
    let mut reductions: Vec<StockReduction> = Vec::new();
    for item in items {
        match reductions
            .iter_mut()
            .find(|r| r.perfume_id == item.perfume_id)
        {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity.get());
            }
            None => reductions.push(StockReduction {
                perfume_id: item.perfume_id,
                quantity: item.quantity.get(),
            }),
        }
    }
    reductions
}

/// Dashboard totals over all inventory records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySummary {
    /// Number of perfumes with a stock record.
    pub total_products: usize,
    /// Sum of positive stock counts.
    pub total_units: i64,
    /// Perfumes with `0 < quantity <= threshold`.
    pub low_stock: usize,
    /// Perfumes with `quantity <= 0`.
    pub out_of_stock: usize,
}

impl InventorySummary {
    /// Summarize `records` using `low_stock_threshold` as the low-stock cutoff.
    #[must_use]
    pub fn from_records(records: &[InventoryRecord], low_stock_threshold: i32) -> Self {
        records.iter().fold(Self::default(), |mut summary, record| {
            summary.total_products += 1;
            if record.quantity > 0 {
                summary.total_units += i64::from(record.quantity);
            }
            if record.quantity <= 0 {
                summary.out_of_stock += 1;
            } else if record.quantity <= low_stock_threshold {
                summary.low_stock += 1;
            }
            summary
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::{OrderId, OrderItemId, Quantity};

    fn item(id: i32, perfume: i32, quantity: i32) -> OrderItem {
        OrderItem {
            id: OrderItemId::new(id),
            order_id: OrderId::new(1),
            perfume_id: PerfumeId::new(perfume),
            quantity: Quantity::new(quantity).unwrap(),
            unit_price: Decimal::ONE,
        }
    }

    fn record(perfume: i32, quantity: i32) -> InventoryRecord {
        InventoryRecord {
            perfume_id: PerfumeId::new(perfume),
            perfume_name: format!("Perfume {perfume}"),
            quantity,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_reductions_one_per_item() {
        let reductions = reductions_for(&[item(1, 10, 2), item(2, 11, 1)]);
        assert_eq!(
            reductions,
            vec![
                StockReduction {
                    perfume_id: PerfumeId::new(10),
                    quantity: 2
                },
                StockReduction {
                    perfume_id: PerfumeId::new(11),
                    quantity: 1
                },
            ]
        );
    }

    #[test]
    fn test_reductions_sum_repeated_perfume() {
        let reductions = reductions_for(&[item(1, 10, 2), item(2, 11, 1), item(3, 10, 4)]);
        assert_eq!(reductions.len(), 2);
        assert_eq!(reductions[0].quantity, 6);
    }

    #[test]
    fn test_summary_buckets() {
        let records = [record(1, 0), record(2, 3), record(3, 5), record(4, 40), record(5, -2)];
        let summary = InventorySummary::from_records(&records, 5);

        assert_eq!(summary.total_products, 5);
        assert_eq!(summary.total_units, 48);
        assert_eq!(summary.low_stock, 2);
        assert_eq!(summary.out_of_stock, 2);
    }
}
