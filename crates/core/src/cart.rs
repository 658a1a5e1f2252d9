//! Cart lines and the pure halves of the cart routines.
//!
//! A cart exists in two places:
//!
//! - a [`LocalCart`] held in the shopper's session before they sign in, and
//! - account cart rows ([`CartLine`]) stored in the database per user.
//!
//! The database does not enforce one row per (user, perfume), so rows can
//! duplicate. [`lines_to_merge`] and [`duplicate_groups`] decide *what* to do
//! about both situations; executing the plan is the storefront's job.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::types::{CartLineId, PerfumeId, Quantity, UserId};

/// One account cart row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub owner: UserId,
    pub perfume_id: PerfumeId,
    pub quantity: Quantity,
}

/// One guest cart entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalCartLine {
    pub perfume_id: PerfumeId,
    pub quantity: Quantity,
}

/// Guest cart kept in the session until sign-in.
///
/// Holds at most one entry per perfume; adding an existing perfume increases
/// its quantity instead of appending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalCart {
    lines: Vec<LocalCartLine>,
}

impl LocalCart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[LocalCartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .map(|line| u32::try_from(line.quantity.get()).unwrap_or(0))
            .fold(0, u32::saturating_add)
    }

    /// Add `quantity` units of a perfume.
    pub fn add(&mut self, perfume_id: PerfumeId, quantity: Quantity) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.perfume_id == perfume_id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(LocalCartLine {
                perfume_id,
                quantity,
            });
        }
    }

    /// Set the quantity for a perfume already in the cart.
    ///
    /// Returns `false` if the perfume is not in the cart.
    pub fn set_quantity(&mut self, perfume_id: PerfumeId, quantity: Quantity) -> bool {
        match self.lines.iter_mut().find(|l| l.perfume_id == perfume_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove a perfume. Returns `false` if it was not in the cart.
    pub fn remove(&mut self, perfume_id: PerfumeId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.perfume_id != perfume_id);
        self.lines.len() != before
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl FromIterator<LocalCartLine> for LocalCart {
    fn from_iter<I: IntoIterator<Item = LocalCartLine>>(iter: I) -> Self {
        let mut cart = Self::new();
        for line in iter {
            cart.add(line.perfume_id, line.quantity);
        }
        cart
    }
}

/// Sum of quantities across account cart rows.
#[must_use]
pub fn item_count(lines: &[CartLine]) -> u32 {
    lines
        .iter()
        .map(|line| u32::try_from(line.quantity.get()).unwrap_or(0))
        .fold(0, u32::saturating_add)
}

/// Local lines whose perfume is not yet in the account cart.
///
/// Lines for perfumes already present remotely are skipped, not summed. The
/// result never contains the same perfume twice.
#[must_use]
pub fn lines_to_merge(local: &LocalCart, remote: &[CartLine]) -> Vec<LocalCartLine> {
    let mut present: HashSet<PerfumeId> = remote.iter().map(|line| line.perfume_id).collect();

    local
        .lines()
        .iter()
        .filter(|line| present.insert(line.perfume_id))
        .copied()
        .collect()
}

/// Rows of one perfume that must be collapsed into a single survivor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub perfume_id: PerfumeId,
    /// First row of the group in input order; keeps its id.
    pub survivor: CartLineId,
    /// Every other row of the group, in input order.
    pub removed: Vec<CartLineId>,
    /// Sum of the group's quantities (saturating).
    pub total: Quantity,
}

/// Group cart rows by perfume and plan the collapse of every group larger
/// than one row.
///
/// Groups come out in order of their first row; singleton groups are omitted.
#[must_use]
pub fn duplicate_groups(lines: &[CartLine]) -> Vec<DuplicateGroup> {
    let mut order: Vec<PerfumeId> = Vec::new();
    let mut groups: HashMap<PerfumeId, Vec<&CartLine>> = HashMap::new();

    for line in lines {
        groups
            .entry(line.perfume_id)
            .or_insert_with(|| {
                order.push(line.perfume_id);
                Vec::new()
            })
            .push(line);
    }

    order
        .into_iter()
        .filter_map(|perfume_id| {
            let rows = groups.remove(&perfume_id)?;
            let (first, rest) = rows.split_first()?;
            if rest.is_empty() {
                return None;
            }
            let total = rest
                .iter()
                .fold(first.quantity, |acc, row| acc.saturating_add(row.quantity));
            Some(DuplicateGroup {
                perfume_id,
                survivor: first.id,
                removed: rest.iter().map(|row| row.id).collect(),
                total,
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn qty(n: i32) -> Quantity {
        Quantity::new(n).unwrap()
    }

    fn line(id: i32, perfume: i32, quantity: i32) -> CartLine {
        CartLine {
            id: CartLineId::new(id),
            owner: UserId::new(1),
            perfume_id: PerfumeId::new(perfume),
            quantity: qty(quantity),
        }
    }

    #[test]
    fn test_local_cart_add_merges_same_perfume() {
        let mut cart = LocalCart::new();
        cart.add(PerfumeId::new(1), qty(1));
        cart.add(PerfumeId::new(2), qty(2));
        cart.add(PerfumeId::new(1), qty(3));

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].quantity, qty(4));
        assert_eq!(cart.item_count(), 6);
    }

    #[test]
    fn test_local_cart_set_and_remove() {
        let mut cart = LocalCart::new();
        cart.add(PerfumeId::new(5), qty(1));

        assert!(cart.set_quantity(PerfumeId::new(5), qty(7)));
        assert!(!cart.set_quantity(PerfumeId::new(6), qty(7)));
        assert_eq!(cart.item_count(), 7);

        assert!(cart.remove(PerfumeId::new(5)));
        assert!(!cart.remove(PerfumeId::new(5)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_lines_to_merge_skips_present_perfumes() {
        let local: LocalCart = [
            LocalCartLine {
                perfume_id: PerfumeId::new(1),
                quantity: qty(2),
            },
            LocalCartLine {
                perfume_id: PerfumeId::new(3),
                quantity: qty(1),
            },
        ]
        .into_iter()
        .collect();
        let remote = vec![line(10, 1, 5), line(11, 2, 1)];

        let merge = lines_to_merge(&local, &remote);
        assert_eq!(merge.len(), 1);
        assert_eq!(merge[0].perfume_id, PerfumeId::new(3));
        assert_eq!(merge[0].quantity, qty(1));
    }

    #[test]
    fn test_lines_to_merge_empty_remote_takes_everything() {
        let mut local = LocalCart::new();
        local.add(PerfumeId::new(4), qty(1));
        local.add(PerfumeId::new(8), qty(2));

        let merge = lines_to_merge(&local, &[]);
        assert_eq!(merge.as_slice(), local.lines());
    }

    #[test]
    fn test_duplicate_groups_sums_and_keeps_first_row() {
        let lines = vec![
            line(7, 1, 2),
            line(3, 2, 1),
            line(9, 1, 3),
            line(4, 1, 1),
        ];

        let groups = duplicate_groups(&lines);
        assert_eq!(
            groups,
            vec![DuplicateGroup {
                perfume_id: PerfumeId::new(1),
                survivor: CartLineId::new(7),
                removed: vec![CartLineId::new(9), CartLineId::new(4)],
                total: qty(6),
            }]
        );
    }

    #[test]
    fn test_duplicate_groups_ignores_singletons() {
        let lines = vec![line(1, 1, 1), line(2, 2, 4), line(3, 3, 2)];
        assert!(duplicate_groups(&lines).is_empty());
        assert!(duplicate_groups(&[]).is_empty());
    }

    #[test]
    fn test_duplicate_groups_orders_by_first_appearance() {
        let lines = vec![
            line(1, 9, 1),
            line(2, 4, 1),
            line(3, 4, 1),
            line(4, 9, 1),
        ];
        let perfumes: Vec<_> = duplicate_groups(&lines)
            .into_iter()
            .map(|g| g.perfume_id)
            .collect();
        assert_eq!(perfumes, vec![PerfumeId::new(9), PerfumeId::new(4)]);
    }

    #[test]
    fn test_item_count_sums_quantities() {
        assert_eq!(item_count(&[line(1, 1, 2), line(2, 2, 5)]), 7);
        assert_eq!(item_count(&[]), 0);
    }
}
