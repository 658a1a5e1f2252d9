//! Orders and order items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{OrderId, OrderItemId, OrderStatus, PerfumeId, Quantity, UserId};

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    /// Sum of item subtotals at creation time.
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// One line of an order, priced at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub perfume_id: PerfumeId,
    pub quantity: Quantity,
    pub unit_price: Decimal,
}

impl OrderItem {
    /// `unit_price * quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity.get())
    }
}

/// An order together with its items, in position order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Item to be written when an order is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub perfume_id: PerfumeId,
    pub quantity: Quantity,
    pub unit_price: Decimal,
}

impl NewOrderItem {
    /// `unit_price * quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity.get())
    }
}

/// Order total: the sum of item subtotals.
#[must_use]
pub fn order_total(items: &[NewOrderItem]) -> Decimal {
    items.iter().map(NewOrderItem::subtotal).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_total_sums_subtotals() {
        let items = [
            NewOrderItem {
                perfume_id: PerfumeId::new(1),
                quantity: Quantity::new(2).unwrap(),
                unit_price: Decimal::new(8500, 2),
            },
            NewOrderItem {
                perfume_id: PerfumeId::new(2),
                quantity: Quantity::ONE,
                unit_price: Decimal::new(12000, 2),
            },
        ];

        assert_eq!(order_total(&items), Decimal::new(29000, 2));
        assert_eq!(order_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_order_item_subtotal() {
        let item = OrderItem {
            id: OrderItemId::new(1),
            order_id: OrderId::new(1),
            perfume_id: PerfumeId::new(3),
            quantity: Quantity::new(3).unwrap(),
            unit_price: Decimal::new(1999, 2),
        };
        assert_eq!(item.subtotal(), Decimal::new(5997, 2));
    }
}
