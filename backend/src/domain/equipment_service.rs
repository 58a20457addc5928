//! Equipment, inventory, and effective-stat services.
//!
//! [`EquipmentService`] implements the driving ports that touch a
//! character's equipment-and-stat state. Every operation holds the
//! character's lock from [`CharacterLocks`] for its whole duration, performs
//! all reads and validation first, and finishes with at most one storage
//! write. A failure before that write leaves no trace; a failure of the
//! write itself is reported as `unavailable` with nothing applied.
//!
//! The lock registry only serialises callers in one process. Across
//! processes the store is the authority: `occupy` and `consume` repeat the
//! ownership and reservation checks inside their own atomic write, and a
//! refusal there surfaces with the same error codes as the checks here.

use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::OwnedMutexGuard;
use tracing::{error, info, warn};

use crate::domain::ports::{
    CharacterQuery, CharacterRepository, CharacterRepositoryError, EquipOutcome, EquipRequest,
    EquipmentCommand, EquipmentRepository, EquipmentRepositoryError, EquippedItemView,
    InventoryCommand, InventoryItemView, InventoryRepository, InventoryRepositoryError,
    ItemCatalog, ItemCatalogError, UnequipOutcome, UnequipRequest,
};
use crate::domain::stat_aggregator::{aggregate, contribution, equipped_contributions};
use crate::domain::{
    CharacterId, CharacterLocks, EffectiveCharacter, Error, Item, ItemId, ItemStats,
    SlotRejection, SlotSet, checked_consume,
};

/// Service implementing [`EquipmentCommand`], [`InventoryCommand`], and
/// [`CharacterQuery`].
#[derive(Clone)]
pub struct EquipmentService<C, I, V, E> {
    characters: Arc<C>,
    catalog: Arc<I>,
    inventory: Arc<V>,
    equipment: Arc<E>,
    locks: Arc<CharacterLocks>,
    slots: Arc<SlotSet>,
}

impl<C, I, V, E> EquipmentService<C, I, V, E> {
    /// Create a service over the given store handles with the default slot
    /// set and a private lock registry.
    pub fn new(characters: Arc<C>, catalog: Arc<I>, inventory: Arc<V>, equipment: Arc<E>) -> Self {
        Self {
            characters,
            catalog,
            inventory,
            equipment,
            locks: Arc::new(CharacterLocks::default()),
            slots: Arc::new(SlotSet::default()),
        }
    }

    /// Use `slots` as the configured slot set.
    #[must_use]
    pub fn with_slot_set(mut self, slots: SlotSet) -> Self {
        self.slots = Arc::new(slots);
        self
    }

    /// Share a lock registry with other services working on characters.
    #[must_use]
    pub fn with_locks(mut self, locks: Arc<CharacterLocks>) -> Self {
        self.locks = locks;
        self
    }

    /// The configured slot set.
    pub fn slot_set(&self) -> &SlotSet {
        &self.slots
    }
}

impl<C, I, V, E> EquipmentService<C, I, V, E>
where
    C: CharacterRepository,
    I: ItemCatalog,
    V: InventoryRepository,
    E: EquipmentRepository,
{
    fn map_character_error(err: CharacterRepositoryError) -> Error {
        error!(error = %err, "character repository failure");
        Error::unavailable()
    }

    fn map_catalog_error(err: ItemCatalogError) -> Error {
        error!(error = %err, "item catalogue failure");
        Error::unavailable()
    }

    fn map_equipment_error(err: EquipmentRepositoryError) -> Error {
        match err {
            EquipmentRepositoryError::NotOwned {
                held,
                equipped_elsewhere,
            } => Self::not_owned(held, equipped_elsewhere),
            other => {
                error!(error = %other, "equipment repository failure");
                Error::unavailable()
            }
        }
    }

    fn map_inventory_error(err: InventoryRepositoryError) -> Error {
        match err {
            InventoryRepositoryError::InsufficientQuantity {
                requested,
                available,
                equipped,
            } => Self::insufficient(requested, available, equipped),
            InventoryRepositoryError::Overflow { held, requested } => Error::invalid_request(
                format!("cannot grant {requested} units on top of {held}"),
            )
            .with_details(json!({ "held": held, "requested": requested })),
            other => {
                error!(error = %other, "inventory repository failure");
                Error::unavailable()
            }
        }
    }

    fn map_slot_rejection(rejection: SlotRejection) -> Error {
        let details = match &rejection {
            SlotRejection::Unknown { slot } => json!({ "slot": slot }),
            SlotRejection::Incompatible { slot, item_type } => {
                json!({ "slot": slot, "itemType": item_type })
            }
        };
        Error::slot_invalid(rejection.to_string()).with_details(details)
    }

    fn not_owned(owned: u64, elsewhere: u32) -> Error {
        Error::item_not_owned("character does not own a free unit of the item")
            .with_details(json!({ "owned": owned, "equippedElsewhere": elsewhere }))
    }

    fn insufficient(requested: u32, available: u64, equipped: u32) -> Error {
        Error::insufficient_quantity(format!(
            "cannot consume {requested} units, only {available} available"
        ))
        .with_details(json!({
            "requested": requested,
            "available": available,
            "equipped": equipped,
        }))
    }

    async fn lock(&self, character_id: &CharacterId) -> Result<OwnedMutexGuard<()>, Error> {
        self.locks.acquire(character_id).await.map_err(|err| {
            warn!(%character_id, error = %err, "character lock acquisition timed out");
            Error::unavailable()
        })
    }

    async fn require_item(&self, item_id: &ItemId) -> Result<Item, Error> {
        self.catalog
            .find_item(item_id)
            .await
            .map_err(Self::map_catalog_error)?
            .ok_or_else(|| Error::not_found(format!("item {item_id} not found")))
    }

    async fn item_contribution(&self, item_id: &ItemId) -> Result<ItemStats, Error> {
        contribution(self.catalog.as_ref(), item_id)
            .await
            .map_err(Self::map_catalog_error)
    }

    async fn occupant_contribution(&self, occupant: Option<ItemId>) -> Result<ItemStats, Error> {
        match occupant {
            Some(item_id) => self.item_contribution(&item_id).await,
            None => Ok(ItemStats::ZERO),
        }
    }

    /// Contribution of the occupant a write actually displaced.
    ///
    /// `expected` was read before the write; another process may have
    /// changed the slot since, in which case the displaced item is looked up
    /// again.
    async fn displaced_contribution(
        &self,
        expected: Option<ItemId>,
        expected_stats: ItemStats,
        displaced: Option<ItemId>,
    ) -> Result<ItemStats, Error> {
        if displaced == expected {
            return Ok(expected_stats);
        }
        self.occupant_contribution(displaced).await
    }
}

#[async_trait]
impl<C, I, V, E> EquipmentCommand for EquipmentService<C, I, V, E>
where
    C: CharacterRepository,
    I: ItemCatalog,
    V: InventoryRepository,
    E: EquipmentRepository,
{
    async fn equip(&self, request: EquipRequest) -> Result<EquipOutcome, Error> {
        let EquipRequest {
            character_id,
            item_id,
            slot,
        } = request;
        let _guard = self.lock(&character_id).await?;

        self.slots
            .check_known(&slot)
            .map_err(Self::map_slot_rejection)?;

        let board = self
            .equipment
            .load(&character_id)
            .await
            .map_err(Self::map_equipment_error)?;
        let current = board.occupant(&slot);
        let owned = self
            .inventory
            .quantity(&character_id, &item_id)
            .await
            .map_err(Self::map_inventory_error)?;
        let elsewhere = board.reserved_elsewhere(&item_id, &slot);
        if owned <= u64::from(elsewhere) {
            return Err(Self::not_owned(owned, elsewhere));
        }

        let item = self.require_item(&item_id).await?;
        self.slots
            .check(&slot, &item)
            .map_err(Self::map_slot_rejection)?;

        if current == Some(item_id) {
            return Ok(EquipOutcome {
                slot,
                item_id,
                replaced: None,
                stat_change: ItemStats::ZERO,
            });
        }

        let added = self.item_contribution(&item_id).await?;
        let expected = self.occupant_contribution(current).await?;
        let replaced = self
            .equipment
            .occupy(&character_id, &slot, &item_id)
            .await
            .map_err(Self::map_equipment_error)?;
        let removed = self
            .displaced_contribution(current, expected, replaced)
            .await?;

        info!(%character_id, %item_id, %slot, "item equipped");
        Ok(EquipOutcome {
            slot,
            item_id,
            replaced,
            stat_change: added - removed,
        })
    }

    async fn unequip(&self, request: UnequipRequest) -> Result<UnequipOutcome, Error> {
        let UnequipRequest { character_id, slot } = request;
        let _guard = self.lock(&character_id).await?;

        let Some(occupant) = self
            .equipment
            .occupant(&character_id, &slot)
            .await
            .map_err(Self::map_equipment_error)?
        else {
            return Ok(UnequipOutcome {
                slot,
                removed: None,
                stat_change: ItemStats::ZERO,
            });
        };

        let expected = self.item_contribution(&occupant).await?;
        let removed = self
            .equipment
            .vacate(&character_id, &slot)
            .await
            .map_err(Self::map_equipment_error)?;
        let released = self
            .displaced_contribution(Some(occupant), expected, removed)
            .await?;

        info!(%character_id, item_id = %occupant, %slot, "item unequipped");
        Ok(UnequipOutcome {
            slot,
            removed,
            stat_change: -released,
        })
    }
}

#[async_trait]
impl<C, I, V, E> InventoryCommand for EquipmentService<C, I, V, E>
where
    C: CharacterRepository,
    I: ItemCatalog,
    V: InventoryRepository,
    E: EquipmentRepository,
{
    async fn grant_item(
        &self,
        character_id: &CharacterId,
        item_id: &ItemId,
        quantity: NonZeroU32,
    ) -> Result<u64, Error> {
        let _guard = self.lock(character_id).await?;

        self.characters
            .find_by_id(character_id)
            .await
            .map_err(Self::map_character_error)?
            .ok_or_else(|| Error::not_found(format!("character {character_id} not found")))?;
        self.require_item(item_id).await?;

        let total = self
            .inventory
            .grant(character_id, item_id, quantity)
            .await
            .map_err(Self::map_inventory_error)?;
        info!(%character_id, %item_id, granted = quantity.get(), total, "item granted");
        Ok(total)
    }

    async fn consume_item(
        &self,
        character_id: &CharacterId,
        item_id: &ItemId,
        quantity: NonZeroU32,
    ) -> Result<u64, Error> {
        let _guard = self.lock(character_id).await?;

        let board = self
            .equipment
            .load(character_id)
            .await
            .map_err(Self::map_equipment_error)?;
        let equipped = board.count_of(item_id);
        let owned = self
            .inventory
            .quantity(character_id, item_id)
            .await
            .map_err(Self::map_inventory_error)?;
        if let Err(shortfall) = checked_consume(owned, equipped, quantity) {
            return Err(Self::insufficient(
                shortfall.requested,
                shortfall.available,
                equipped,
            ));
        }

        let remaining = self
            .inventory
            .consume(character_id, item_id, quantity)
            .await
            .map_err(Self::map_inventory_error)?;
        info!(%character_id, %item_id, consumed = quantity.get(), remaining, "item consumed");
        Ok(remaining)
    }
}

#[async_trait]
impl<C, I, V, E> CharacterQuery for EquipmentService<C, I, V, E>
where
    C: CharacterRepository,
    I: ItemCatalog,
    V: InventoryRepository,
    E: EquipmentRepository,
{
    async fn get_effective_character(
        &self,
        character_id: &CharacterId,
    ) -> Result<EffectiveCharacter, Error> {
        let _guard = self.lock(character_id).await?;

        let character = self
            .characters
            .find_by_id(character_id)
            .await
            .map_err(Self::map_character_error)?
            .ok_or_else(|| Error::not_found(format!("character {character_id} not found")))?;
        let board = self
            .equipment
            .load(character_id)
            .await
            .map_err(Self::map_equipment_error)?;
        let contributions = equipped_contributions(self.catalog.as_ref(), &board)
            .await
            .map_err(Self::map_catalog_error)?;

        Ok(EffectiveCharacter {
            id: character.id,
            owner_id: character.owner_id,
            name: character.name,
            stats: aggregate(&character.base, contributions),
            progression: character.progression,
        })
    }

    async fn get_equipment(
        &self,
        character_id: &CharacterId,
    ) -> Result<Vec<EquippedItemView>, Error> {
        let _guard = self.lock(character_id).await?;

        let board = self
            .equipment
            .load(character_id)
            .await
            .map_err(Self::map_equipment_error)?;
        let mut views = Vec::new();
        for (slot, item_id) in board.occupied() {
            match self
                .catalog
                .find_item(item_id)
                .await
                .map_err(Self::map_catalog_error)?
            {
                Some(item) => views.push(EquippedItemView::new(slot.clone(), item)),
                None => warn!(%character_id, %item_id, %slot, "equipped item missing from catalogue"),
            }
        }
        Ok(views)
    }

    async fn get_inventory(
        &self,
        character_id: &CharacterId,
    ) -> Result<Vec<InventoryItemView>, Error> {
        let _guard = self.lock(character_id).await?;

        let ledger = self
            .inventory
            .load(character_id)
            .await
            .map_err(Self::map_inventory_error)?;
        let board = self
            .equipment
            .load(character_id)
            .await
            .map_err(Self::map_equipment_error)?;
        let mut views = Vec::new();
        for entry in ledger.entries() {
            let Some(item) = self
                .catalog
                .find_item(&entry.item_id)
                .await
                .map_err(Self::map_catalog_error)?
            else {
                warn!(%character_id, item_id = %entry.item_id, "owned item missing from catalogue");
                continue;
            };
            views.push(InventoryItemView {
                item_id: item.id,
                name: item.name,
                description: item.description,
                item_type: item.item_type,
                weight: item.weight,
                value: item.value,
                quantity: entry.quantity,
                equipped: board.count_of(&entry.item_id),
            });
        }
        Ok(views)
    }
}

#[cfg(test)]
#[path = "equipment_service_tests.rs"]
mod tests;
