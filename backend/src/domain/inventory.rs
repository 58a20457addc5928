//! Per-character inventory ledger.
//!
//! The ledger is a multiset of owned items. An entry never holds quantity
//! zero: consuming the last unit removes the entry, so absence and zero are
//! indistinguishable to callers.

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::ItemId;

/// Largest quantity any store holds for one item.
///
/// Equal to the largest PostgreSQL `BIGINT`, so every adapter refuses the
/// same grants.
pub const MAX_QUANTITY: u64 = i64::MAX.unsigned_abs();

/// Owned quantity of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    /// The owned item.
    pub item_id: ItemId,
    /// Units owned; always at least one.
    pub quantity: u64,
}

/// Raised when a consume request exceeds the unreserved units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot consume {requested} units, only {available} available")]
pub struct InsufficientQuantity {
    /// Units requested.
    pub requested: u32,
    /// Units held and not reserved by equipped slots.
    pub available: u64,
}

/// Raised when a grant would push a quantity past [`MAX_QUANTITY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot grant {requested} units on top of {held}")]
pub struct QuantityOverflow {
    /// Units held before the grant.
    pub held: u64,
    /// Units requested.
    pub requested: u32,
}

/// New total after granting `requested` units on top of `held`.
///
/// # Errors
///
/// [`QuantityOverflow`] when the total would exceed [`MAX_QUANTITY`].
pub fn checked_grant(held: u64, requested: NonZeroU32) -> Result<u64, QuantityOverflow> {
    held.checked_add(u64::from(requested.get()))
        .filter(|total| *total <= MAX_QUANTITY)
        .ok_or(QuantityOverflow {
            held,
            requested: requested.get(),
        })
}

/// Units left after consuming `requested` of `held`, `reserved` of which
/// belong to equipped slots.
///
/// # Errors
///
/// [`InsufficientQuantity`] when fewer than `requested` units are
/// unreserved.
pub fn checked_consume(
    held: u64,
    reserved: u32,
    requested: NonZeroU32,
) -> Result<u64, InsufficientQuantity> {
    let available = held.saturating_sub(u64::from(reserved));
    if available < u64::from(requested.get()) {
        return Err(InsufficientQuantity {
            requested: requested.get(),
            available,
        });
    }
    Ok(held - u64::from(requested.get()))
}

/// In-memory inventory ledger for a single character.
///
/// # Examples
///
/// ```
/// # use std::num::NonZeroU32;
/// # use armoury::domain::{InventoryLedger, ItemId};
/// let potion = ItemId::random();
/// let mut ledger = InventoryLedger::default();
/// ledger.grant(potion, NonZeroU32::new(2).unwrap()).unwrap();
/// ledger.consume(potion, NonZeroU32::new(2).unwrap(), 0).unwrap();
/// assert_eq!(ledger.quantity(&potion), 0);
/// assert!(ledger.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryLedger {
    entries: BTreeMap<ItemId, u64>,
}

impl InventoryLedger {
    /// Units of `item_id` held; zero when absent.
    pub fn quantity(&self, item_id: &ItemId) -> u64 {
        self.entries.get(item_id).copied().unwrap_or(0)
    }

    /// Add units, creating the entry if absent. Returns the new quantity.
    ///
    /// # Errors
    ///
    /// [`QuantityOverflow`] leaves the entry untouched.
    pub fn grant(
        &mut self,
        item_id: ItemId,
        quantity: NonZeroU32,
    ) -> Result<u64, QuantityOverflow> {
        let total = checked_grant(self.quantity(&item_id), quantity)?;
        self.entries.insert(item_id, total);
        Ok(total)
    }

    /// Insert an entry loaded from storage. Zero quantities are ignored.
    pub fn restore(&mut self, item_id: ItemId, quantity: u64) {
        if quantity > 0 {
            self.entries.insert(item_id, quantity);
        }
    }

    /// Remove units not reserved by equipped slots, deleting the entry at
    /// zero. Returns the remaining quantity.
    ///
    /// # Errors
    ///
    /// [`InsufficientQuantity`] leaves the entry untouched.
    pub fn consume(
        &mut self,
        item_id: ItemId,
        quantity: NonZeroU32,
        reserved: u32,
    ) -> Result<u64, InsufficientQuantity> {
        let remaining = checked_consume(self.quantity(&item_id), reserved, quantity)?;
        if remaining == 0 {
            self.entries.remove(&item_id);
        } else {
            self.entries.insert(item_id, remaining);
        }
        Ok(remaining)
    }

    /// Entries in item-id order.
    pub fn entries(&self) -> Vec<InventoryEntry> {
        self.entries
            .iter()
            .map(|(item_id, quantity)| InventoryEntry {
                item_id: *item_id,
                quantity: *quantity,
            })
            .collect()
    }

    /// Whether the ledger holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
