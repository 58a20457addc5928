//! Port for per-character equipment board storage.
//!
//! Adapters enforce single occupancy with `(character, slot)` as a unique
//! key. `occupy` re-checks ownership against the inventory inside the same
//! atomic step as the write, serialised per character with inventory
//! consumes, so services in different processes sharing one store cannot
//! equip a unit that is not held. Slot configuration is never checked here.

use async_trait::async_trait;

use crate::domain::{CharacterId, EquipmentBoard, EquipmentSlot, ItemId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by equipment repository adapters.
    pub enum EquipmentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "equipment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "equipment repository query failed: {message}",
        /// Every held unit of the item is already reserved by another slot.
        NotOwned { held: u64, equipped_elsewhere: u32 } =>
            "no free unit: {held} held, {equipped_elsewhere} equipped elsewhere",
    }
}

/// Port for equipment board storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EquipmentRepository: Send + Sync {
    /// Load every occupied slot of a character.
    async fn load(&self, character_id: &CharacterId)
    -> Result<EquipmentBoard, EquipmentRepositoryError>;

    /// Item occupying one slot, if any.
    async fn occupant(
        &self,
        character_id: &CharacterId,
        slot: &EquipmentSlot,
    ) -> Result<Option<ItemId>, EquipmentRepositoryError>;

    /// Overwrite a slot in a single write, returning the displaced occupant.
    ///
    /// Fails with [`EquipmentRepositoryError::NotOwned`] and leaves the slot
    /// untouched unless the character holds more units of `item_id` than
    /// other slots reserve.
    async fn occupy(
        &self,
        character_id: &CharacterId,
        slot: &EquipmentSlot,
        item_id: &ItemId,
    ) -> Result<Option<ItemId>, EquipmentRepositoryError>;

    /// Clear a slot, returning the removed occupant. Clearing an empty slot
    /// succeeds with `None`.
    async fn vacate(
        &self,
        character_id: &CharacterId,
        slot: &EquipmentSlot,
    ) -> Result<Option<ItemId>, EquipmentRepositoryError>;
}

/// Fixture repository whose boards are always empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEquipmentRepository;

#[async_trait]
impl EquipmentRepository for FixtureEquipmentRepository {
    async fn load(
        &self,
        _character_id: &CharacterId,
    ) -> Result<EquipmentBoard, EquipmentRepositoryError> {
        Ok(EquipmentBoard::default())
    }

    async fn occupant(
        &self,
        _character_id: &CharacterId,
        _slot: &EquipmentSlot,
    ) -> Result<Option<ItemId>, EquipmentRepositoryError> {
        Ok(None)
    }

    async fn occupy(
        &self,
        _character_id: &CharacterId,
        _slot: &EquipmentSlot,
        _item_id: &ItemId,
    ) -> Result<Option<ItemId>, EquipmentRepositoryError> {
        Ok(None)
    }

    async fn vacate(
        &self,
        _character_id: &CharacterId,
        _slot: &EquipmentSlot,
    ) -> Result<Option<ItemId>, EquipmentRepositoryError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[tokio::test]
    async fn fixture_board_is_empty() {
        let repo = FixtureEquipmentRepository;
        let board = repo
            .load(&CharacterId::random())
            .await
            .expect("fixture load");
        assert!(board.is_empty());
    }
}
