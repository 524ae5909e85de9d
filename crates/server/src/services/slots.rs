//! Pickup-slot admission control.
//!
//! Pickup times are bucketed into fixed 10-minute windows, and each window
//! accepts at most [`SLOT_LIMIT_ITEMS`] coffee items - the throughput of the
//! single preparation counter. Desserts are exempt: they come out of the
//! display case, not the espresso machine.
//!
//! Everything in this module is pure. Handlers load the window's orders and
//! the catalog's name-to-category mapping, then call into here to count and
//! decide. The surrounding read-then-insert sequence is NOT atomic: two
//! concurrent creations for the same window can both observe free capacity
//! and overshoot the cap. Callers must not treat the limit as a hard
//! guarantee under concurrent load.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use cortado_core::ProductCategory;

use crate::models::OrderItem;

/// Width of a pickup window, in minutes.
pub const SLOT_MINUTES: i64 = 10;

/// Maximum coffee items a single pickup window may accept.
pub const SLOT_LIMIT_ITEMS: u32 = 5;

/// A pickup window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotBounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SlotBounds {
    /// The window containing `pickup`, via floor division on epoch
    /// milliseconds.
    #[must_use]
    pub fn containing(pickup: DateTime<Utc>) -> Self {
        let slot_ms = SLOT_MINUTES * 60 * 1000;
        let offset_ms = pickup.timestamp_millis().rem_euclid(slot_ms);
        let start = pickup - Duration::milliseconds(offset_ms);
        Self {
            start,
            end: start + Duration::milliseconds(slot_ms),
        }
    }
}

/// Name-to-category lookup over the catalog, keyed by lowercased name.
///
/// Order line items reference products by free-form name; matching is
/// case-insensitive, and names that match nothing count as coffee so that
/// off-catalog items still consume capacity.
#[derive(Debug, Clone, Default)]
pub struct CategoryMap(HashMap<String, ProductCategory>);

impl CategoryMap {
    /// Register a product name.
    pub fn insert(&mut self, name: &str, category: ProductCategory) {
        self.0.insert(name.to_lowercase(), category);
    }

    /// The category a line-item name resolves to, if it matches the catalog.
    #[must_use]
    pub fn category_for(&self, name: &str) -> Option<ProductCategory> {
        self.0.get(&name.to_lowercase()).copied()
    }

    /// Whether a line item with this name counts toward the slot cap.
    /// Only a confirmed dessert is exempt.
    #[must_use]
    pub fn counts_toward_capacity(&self, name: &str) -> bool {
        !self
            .category_for(name)
            .is_some_and(ProductCategory::is_dessert)
    }
}

impl FromIterator<(String, ProductCategory)> for CategoryMap {
    fn from_iter<I: IntoIterator<Item = (String, ProductCategory)>>(iter: I) -> Self {
        let mut map = Self::default();
        for (name, category) in iter {
            map.insert(&name, category);
        }
        map
    }
}

/// Count the coffee items an order contributes to its pickup window.
///
/// An order without line items contributes its `total_items` count; the
/// caller substitutes the default of 1 when that is absent too.
#[must_use]
pub fn coffee_item_count(items: &[OrderItem], total_items: u32, categories: &CategoryMap) -> u32 {
    if items.is_empty() {
        return total_items;
    }
    items
        .iter()
        .filter(|item| categories.counts_toward_capacity(&item.name))
        .map(|item| item.quantity)
        .sum()
}

/// Rejection: admitting `requested` more coffee items would push the window
/// past [`SLOT_LIMIT_ITEMS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Pickup slot is full. Please choose another time.")]
pub struct SlotFull {
    pub current: u32,
    pub requested: u32,
}

/// Admit `requested` additional coffee items into a window currently holding
/// `current` of them.
///
/// # Errors
///
/// Returns [`SlotFull`] when the combined count would exceed the cap.
pub fn check_capacity(current: u32, requested: u32) -> Result<(), SlotFull> {
    if current + requested > SLOT_LIMIT_ITEMS {
        return Err(SlotFull { current, requested });
    }
    Ok(())
}

/// Advisory remaining capacity for a window, shown to customers while they
/// pick a time. May be stale by the time the order is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailability {
    pub slot_start: DateTime<Utc>,
    pub slot_end: DateTime<Utc>,
    pub remaining: u32,
    pub limit: u32,
}

impl SlotAvailability {
    /// Availability for a window currently holding `load` coffee items.
    #[must_use]
    pub const fn for_load(bounds: SlotBounds, load: u32) -> Self {
        Self {
            slot_start: bounds.start,
            slot_end: bounds.end,
            remaining: SLOT_LIMIT_ITEMS.saturating_sub(load),
            limit: SLOT_LIMIT_ITEMS,
        }
    }
}
