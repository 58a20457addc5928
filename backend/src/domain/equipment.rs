//! Per-character equipment board.
//!
//! A pure mapping from slot to the single item occupying it. The board does
//! not check inventory ownership or slot configuration; the equipment
//! service does that before writing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{EquipmentSlot, ItemId};

/// Slot occupancy for one character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EquipmentBoard {
    slots: BTreeMap<EquipmentSlot, ItemId>,
}

impl EquipmentBoard {
    /// Item occupying `slot`, if any.
    pub fn occupant(&self, slot: &EquipmentSlot) -> Option<ItemId> {
        self.slots.get(slot).copied()
    }

    /// Place `item_id` in `slot`, returning the displaced occupant.
    pub fn occupy(&mut self, slot: EquipmentSlot, item_id: ItemId) -> Option<ItemId> {
        self.slots.insert(slot, item_id)
    }

    /// Clear `slot`, returning the removed occupant. No-op when empty.
    pub fn vacate(&mut self, slot: &EquipmentSlot) -> Option<ItemId> {
        self.slots.remove(slot)
    }

    /// Occupied slots in slot-name order.
    pub fn occupied(&self) -> impl Iterator<Item = (&EquipmentSlot, &ItemId)> {
        self.slots.iter()
    }

    /// Number of slots holding `item_id`.
    pub fn count_of(&self, item_id: &ItemId) -> u32 {
        let count = self.slots.values().filter(|held| *held == item_id).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Units of `item_id` reserved by slots other than `slot`.
    pub fn reserved_elsewhere(&self, item_id: &ItemId, slot: &EquipmentSlot) -> u32 {
        let in_slot = u32::from(self.occupant(slot) == Some(*item_id));
        self.count_of(item_id).saturating_sub(in_slot)
    }

    /// Whether no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl FromIterator<(EquipmentSlot, ItemId)> for EquipmentBoard {
    fn from_iter<T: IntoIterator<Item = (EquipmentSlot, ItemId)>>(iter: T) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}
