//! Driving port for reading characters, their equipment, and inventory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{
    CharacterId, EffectiveCharacter, EquipmentSlot, Error, Item, ItemId, ItemType,
};

/// An occupied slot joined with its item definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquippedItemView {
    /// Occupied slot.
    pub slot: EquipmentSlot,
    /// Occupant identifier.
    pub item_id: ItemId,
    /// Item name.
    pub name: String,
    /// Item description.
    pub description: String,
    /// Item category.
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Carry weight.
    pub weight: u32,
    /// Trade value.
    pub value: u32,
}

impl EquippedItemView {
    /// Join an occupied slot with its catalogue definition.
    pub fn new(slot: EquipmentSlot, item: Item) -> Self {
        Self {
            slot,
            item_id: item.id,
            name: item.name,
            description: item.description,
            item_type: item.item_type,
            weight: item.weight,
            value: item.value,
        }
    }
}

/// An inventory entry joined with its item definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemView {
    /// Owned item identifier.
    pub item_id: ItemId,
    /// Item name.
    pub name: String,
    /// Item description.
    pub description: String,
    /// Item category.
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Carry weight.
    pub weight: u32,
    /// Trade value.
    pub value: u32,
    /// Units owned.
    pub quantity: u64,
    /// Units reserved by equipped slots.
    pub equipped: u32,
}

/// Driving port for character reads.
///
/// Effective stats are derived on every read and never stored.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterQuery: Send + Sync {
    /// Character fields with stats replaced by effective stats.
    ///
    /// # Errors
    ///
    /// `not_found` for an unknown character; `unavailable` on storage
    /// failure.
    async fn get_effective_character(
        &self,
        character_id: &CharacterId,
    ) -> Result<EffectiveCharacter, Error>;

    /// Occupied slots in slot-name order.
    async fn get_equipment(
        &self,
        character_id: &CharacterId,
    ) -> Result<Vec<EquippedItemView>, Error>;

    /// Owned items in item-id order.
    async fn get_inventory(
        &self,
        character_id: &CharacterId,
    ) -> Result<Vec<InventoryItemView>, Error>;
}

/// Fixture query that knows no characters.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCharacterQuery;

#[async_trait]
impl CharacterQuery for FixtureCharacterQuery {
    async fn get_effective_character(
        &self,
        character_id: &CharacterId,
    ) -> Result<EffectiveCharacter, Error> {
        Err(Error::not_found(format!("character {character_id} not found")))
    }

    async fn get_equipment(
        &self,
        _character_id: &CharacterId,
    ) -> Result<Vec<EquippedItemView>, Error> {
        Ok(Vec::new())
    }

    async fn get_inventory(
        &self,
        _character_id: &CharacterId,
    ) -> Result<Vec<InventoryItemView>, Error> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;

    #[tokio::test]
    async fn fixture_query_reports_missing_character() {
        let error = FixtureCharacterQuery
            .get_effective_character(&CharacterId::random())
            .await
            .expect_err("fixture knows no characters");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[test]
    fn equipped_view_uses_type_key() {
        let item = Item {
            id: ItemId::random(),
            name: "Iron Helm".to_owned(),
            description: "Dented.".to_owned(),
            item_type: ItemType::new("helmet").expect("valid type"),
            weight: 3,
            value: 15,
        };
        let view = EquippedItemView::new(EquipmentSlot::new("head").expect("slot"), item);
        let value = serde_json::to_value(&view).expect("serialise view");
        assert_eq!(value["type"], "helmet");
        assert_eq!(value["slot"], "head");
    }
}
