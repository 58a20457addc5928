//! Driving port for moving items into and out of equipment slots.
//!
//! The [`EquipmentCommand`] is the only entry point that mutates equipment
//! state. Inbound adapters supply already-authorised character ids.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{CharacterId, EquipmentSlot, Error, ItemId, ItemStats};

/// Request to place an owned item into a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipRequest {
    /// Character whose board changes.
    pub character_id: CharacterId,
    /// Item to equip; must be held in inventory.
    pub item_id: ItemId,
    /// Target slot.
    pub slot: EquipmentSlot,
}

/// Result of a successful equip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipOutcome {
    /// Slot written.
    pub slot: EquipmentSlot,
    /// Item now occupying the slot.
    pub item_id: ItemId,
    /// Previous occupant, if a different item was displaced.
    pub replaced: Option<ItemId>,
    /// Change to effective stats: new contribution minus the replaced one.
    pub stat_change: ItemStats,
}

/// Request to clear a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnequipRequest {
    /// Character whose board changes.
    pub character_id: CharacterId,
    /// Slot to clear.
    pub slot: EquipmentSlot,
}

/// Result of a successful unequip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnequipOutcome {
    /// Slot cleared.
    pub slot: EquipmentSlot,
    /// Removed occupant; `None` when the slot was already empty.
    pub removed: Option<ItemId>,
    /// Change to effective stats, the negated contribution of `removed`.
    pub stat_change: ItemStats,
}

/// Driving port for equip and unequip.
///
/// Both operations are all-or-nothing and serialised per character. Neither
/// changes inventory quantities; an equipped item only reserves a unit.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EquipmentCommand: Send + Sync {
    /// Equip an owned item.
    ///
    /// # Errors
    ///
    /// - `slot_invalid` when the slot is not configured or refuses the
    ///   item's type.
    /// - `item_not_owned` when no unreserved unit of the item is held.
    /// - `not_found` when the item is missing from the catalogue.
    /// - `unavailable` on storage failure or lock timeout.
    async fn equip(&self, request: EquipRequest) -> Result<EquipOutcome, Error>;

    /// Clear a slot. An empty slot is a successful no-op.
    ///
    /// # Errors
    ///
    /// Returns `unavailable` on storage failure or lock timeout.
    async fn unequip(&self, request: UnequipRequest) -> Result<UnequipOutcome, Error>;
}

/// Fixture implementation for testing.
///
/// Reports success without touching any state.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEquipmentCommand;

#[async_trait]
impl EquipmentCommand for FixtureEquipmentCommand {
    async fn equip(&self, request: EquipRequest) -> Result<EquipOutcome, Error> {
        Ok(EquipOutcome {
            slot: request.slot,
            item_id: request.item_id,
            replaced: None,
            stat_change: ItemStats::ZERO,
        })
    }

    async fn unequip(&self, request: UnequipRequest) -> Result<UnequipOutcome, Error> {
        Ok(UnequipOutcome {
            slot: request.slot,
            removed: None,
            stat_change: ItemStats::ZERO,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[tokio::test]
    async fn fixture_command_echoes_the_request() {
        let request = EquipRequest {
            character_id: CharacterId::random(),
            item_id: ItemId::random(),
            slot: EquipmentSlot::new("weapon").expect("valid slot"),
        };

        let outcome = FixtureEquipmentCommand
            .equip(request.clone())
            .await
            .expect("fixture equip");

        assert_eq!(outcome.item_id, request.item_id);
        assert_eq!(outcome.slot, request.slot);
        assert!(outcome.replaced.is_none());
    }

    #[test]
    fn outcome_serialises_in_camel_case() {
        let outcome = UnequipOutcome {
            slot: EquipmentSlot::new("head").expect("valid slot"),
            removed: None,
            stat_change: ItemStats::ZERO,
        };
        let value = serde_json::to_value(&outcome).expect("serialise outcome");
        assert!(value.get("statChange").is_some());
    }
}
