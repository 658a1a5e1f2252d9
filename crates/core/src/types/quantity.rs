//! Positive item quantity.
//!
//! Cart lines and order items always carry at least one unit. Making that a
//! type means a zero or negative quantity is rejected where user input is
//! parsed, never deep inside a database write.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a quantity is below one.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("quantity must be at least 1 (got {0})")]
pub struct QuantityError(pub i32);

/// A quantity of one or more units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Quantity(i32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(1);

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError`] if `value < 1`.
    pub const fn new(value: i32) -> Result<Self, QuantityError> {
        if value < 1 {
            Err(QuantityError(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Add two quantities, clamping at `i32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_and_negative() {
        assert_eq!(Quantity::new(0), Err(QuantityError(0)));
        assert_eq!(Quantity::new(-3), Err(QuantityError(-3)));
        assert_eq!(Quantity::new(2).map(Quantity::get), Ok(2));
    }

    #[test]
    fn test_saturating_add() {
        let max = Quantity::new(i32::MAX).unwrap_or(Quantity::ONE);
        assert_eq!(max.saturating_add(Quantity::ONE).get(), i32::MAX);
        assert_eq!(Quantity::ONE.saturating_add(Quantity::ONE).get(), 2);
    }

    #[test]
    fn test_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert_eq!(serde_json::from_str::<Quantity>("4").ok(), Quantity::new(4).ok());
    }
}
