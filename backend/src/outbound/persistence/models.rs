//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions to domain types validate every
//! column, so a corrupt row surfaces as a query error instead of a panic.

use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    BaseStats, Character, CharacterId, CharacterName, Item, ItemId, ItemStats, ItemType,
    Progression, UserId,
};

use super::schema::{characters, equipment_slots, inventory_entries, item_stats, items};

/// Reason a row could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("corrupt {column} column: {reason}")]
pub(crate) struct RowConversionError {
    pub column: &'static str,
    pub reason: String,
}

impl RowConversionError {
    fn new(column: &'static str, reason: impl ToString) -> Self {
        Self {
            column,
            reason: reason.to_string(),
        }
    }
}

fn to_u32(column: &'static str, value: i32) -> Result<u32, RowConversionError> {
    u32::try_from(value).map_err(|err| RowConversionError::new(column, err))
}

fn to_u64(column: &'static str, value: i64) -> Result<u64, RowConversionError> {
    u64::try_from(value).map_err(|err| RowConversionError::new(column, err))
}

fn to_i32(column: &'static str, value: u32) -> Result<i32, RowConversionError> {
    i32::try_from(value).map_err(|err| RowConversionError::new(column, err))
}

fn to_i64(column: &'static str, value: u64) -> Result<i64, RowConversionError> {
    i64::try_from(value).map_err(|err| RowConversionError::new(column, err))
}

/// Convert a stored quantity into a domain value.
pub(crate) fn units_from_column(value: i64) -> Result<u64, RowConversionError> {
    to_u64("quantity", value)
}

/// Convert a domain quantity into a column value.
pub(crate) fn units_to_column(value: u64) -> Result<i64, RowConversionError> {
    to_i64("quantity", value)
}

/// Convert a `COUNT(*)` of equipment slots into a domain value.
pub(crate) fn slot_count(value: i64) -> Result<u32, RowConversionError> {
    u32::try_from(value).map_err(|err| RowConversionError::new("count", err))
}

// ---------------------------------------------------------------------------
// Characters
// ---------------------------------------------------------------------------

/// Row struct for the characters table; also used for inserts and full
/// updates.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = characters)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CharacterRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub level: i32,
    pub health: i32,
    pub mana: i32,
    pub strength: i32,
    pub agility: i32,
    pub intelligence: i32,
    pub xp: i64,
    pub gold: i64,
}

impl TryFrom<&Character> for CharacterRow {
    type Error = RowConversionError;

    fn try_from(character: &Character) -> Result<Self, Self::Error> {
        Ok(Self {
            id: *character.id.as_uuid(),
            owner_id: *character.owner_id.as_uuid(),
            name: character.name.as_str().to_owned(),
            level: to_i32("level", character.base.level)?,
            health: character.base.health,
            mana: character.base.mana,
            strength: character.base.strength,
            agility: character.base.agility,
            intelligence: character.base.intelligence,
            xp: to_i64("xp", character.progression.xp)?,
            gold: to_i64("gold", character.progression.gold)?,
        })
    }
}

impl TryFrom<CharacterRow> for Character {
    type Error = RowConversionError;

    fn try_from(row: CharacterRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CharacterId::from_uuid(row.id),
            owner_id: UserId::from_uuid(row.owner_id),
            name: CharacterName::new(row.name).map_err(|err| RowConversionError::new("name", err))?,
            base: BaseStats {
                level: to_u32("level", row.level)?,
                health: row.health,
                mana: row.mana,
                strength: row.strength,
                agility: row.agility,
                intelligence: row.intelligence,
            },
            progression: Progression {
                xp: to_u64("xp", row.xp)?,
                gold: to_u64("gold", row.gold)?,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

/// Row struct for the items table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ItemRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub item_type: String,
    pub weight: i32,
    pub value: i32,
}

impl TryFrom<&Item> for ItemRow {
    type Error = RowConversionError;

    fn try_from(item: &Item) -> Result<Self, Self::Error> {
        Ok(Self {
            id: *item.id.as_uuid(),
            name: item.name.clone(),
            description: item.description.clone(),
            item_type: item.item_type.as_str().to_owned(),
            weight: to_i32("weight", item.weight)?,
            value: to_i32("value", item.value)?,
        })
    }
}

impl TryFrom<ItemRow> for Item {
    type Error = RowConversionError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ItemId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            item_type: ItemType::new(row.item_type)
                .map_err(|err| RowConversionError::new("item_type", err))?,
            weight: to_u32("weight", row.weight)?,
            value: to_u32("value", row.value)?,
        })
    }
}

/// Row struct for the item_stats table.
#[derive(Debug, Clone, Copy, Queryable, Selectable, Insertable)]
#[diesel(table_name = item_stats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ItemStatsRow {
    pub item_id: Uuid,
    pub strength: i32,
    pub agility: i32,
    pub intelligence: i32,
    pub health: i32,
    pub mana: i32,
}

impl ItemStatsRow {
    pub(crate) fn new(item_id: ItemId, stats: ItemStats) -> Self {
        Self {
            item_id: *item_id.as_uuid(),
            strength: stats.strength,
            agility: stats.agility,
            intelligence: stats.intelligence,
            health: stats.health,
            mana: stats.mana,
        }
    }
}

impl From<ItemStatsRow> for ItemStats {
    fn from(row: ItemStatsRow) -> Self {
        Self {
            strength: row.strength,
            agility: row.agility,
            intelligence: row.intelligence,
            health: row.health,
            mana: row.mana,
        }
    }
}

// ---------------------------------------------------------------------------
// Inventory and equipment
// ---------------------------------------------------------------------------

/// Row struct for the inventory_entries table.
#[derive(Debug, Clone, Copy, Queryable, Selectable, Insertable)]
#[diesel(table_name = inventory_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InventoryEntryRow {
    pub character_id: Uuid,
    pub item_id: Uuid,
    pub quantity: i64,
}

impl InventoryEntryRow {
    /// Owned quantity as a domain value.
    pub(crate) fn units(&self) -> Result<u64, RowConversionError> {
        units_from_column(self.quantity)
    }
}

/// Row struct for the equipment_slots table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = equipment_slots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EquipmentSlotRow {
    pub character_id: Uuid,
    pub slot: String,
    pub item_id: Uuid,
}
