//! Order status.

use serde::{Deserialize, Serialize};

/// Fulfillment status of an order.
///
/// Orders start as `Processing` at checkout and are advanced by the admin
/// panel. Status only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Processing,
    Dispatched,
    Delivered,
}

impl OrderStatus {
    /// Whether an order in this status may move to `next`.
    ///
    /// Any forward move is allowed (`processing -> delivered` skips dispatch
    /// for collected orders); staying put or moving back is not.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        next > self
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Processing => write!(f, "processing"),
            Self::Dispatched => write!(f, "dispatched"),
            Self::Delivered => write!(f, "delivered"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(Self::Processing),
            "dispatched" => Ok(Self::Dispatched),
            "delivered" => Ok(Self::Delivered),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_only_transitions() {
        assert!(OrderStatus::Processing.can_advance_to(OrderStatus::Dispatched));
        assert!(OrderStatus::Processing.can_advance_to(OrderStatus::Delivered));
        assert!(OrderStatus::Dispatched.can_advance_to(OrderStatus::Delivered));

        assert!(!OrderStatus::Delivered.can_advance_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Delivered.can_advance_to(OrderStatus::Processing));
        assert!(!OrderStatus::Dispatched.can_advance_to(OrderStatus::Processing));
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            OrderStatus::Processing,
            OrderStatus::Dispatched,
            OrderStatus::Delivered,
        ] {
            assert_eq!(status.to_string().parse::<OrderStatus>(), Ok(status));
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }
}
