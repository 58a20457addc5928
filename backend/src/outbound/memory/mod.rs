//! In-process store implementing every driven port.
//!
//! [`MemoryStore`] keeps characters, the item catalogue, inventories, and
//! equipment boards behind a single mutex. It backs the behaviour tests and
//! local runs that have no database. Every method holds the mutex only for
//! the duration of one read or write, never across an `.await`.
//!
//! Guarded writes read the other half of the character's state under the
//! same mutex: `occupy` checks the ledger and `consume` checks the board, so
//! services with separate lock registries cannot break reservations.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    CharacterRepository, CharacterRepositoryError, EquipmentRepository, EquipmentRepositoryError,
    InventoryRepository, InventoryRepositoryError, ItemCatalog, ItemCatalogError, NameValidator,
    NameValidatorError, NameVerdict,
};
use crate::domain::{
    CatalogueEntry, Character, CharacterId, CharacterName, EquipmentBoard, EquipmentSlot,
    InventoryLedger, Item, ItemId, ItemStats,
};

const POISONED: &str = "memory store lock poisoned";

#[derive(Debug, Default)]
struct State {
    characters: HashMap<CharacterId, Character>,
    catalogue: HashMap<ItemId, CatalogueEntry>,
    inventories: HashMap<CharacterId, InventoryLedger>,
    boards: HashMap<CharacterId, EquipmentBoard>,
}

impl State {
    fn held(&self, character_id: &CharacterId, item_id: &ItemId) -> u64 {
        self.inventories
            .get(character_id)
            .map_or(0, |ledger| ledger.quantity(item_id))
    }

    fn board(&self, character_id: &CharacterId) -> Option<&EquipmentBoard> {
        self.boards.get(character_id)
    }

    fn name_owner(&self, name: &CharacterName) -> Option<CharacterId> {
        let wanted = name.as_str().to_lowercase();
        self.characters
            .values()
            .find(|c| c.name.as_str().to_lowercase() == wanted)
            .map(|c| c.id)
    }
}

/// Mutex-protected store for tests and database-free runs.
///
/// # Examples
///
/// ```
/// # use armoury::outbound::memory::MemoryStore;
/// let store = MemoryStore::new();
/// assert_eq!(store.catalogue_len(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with catalogue entries.
    pub fn with_catalogue(entries: impl IntoIterator<Item = CatalogueEntry>) -> Self {
        let store = Self::new();
        for entry in entries {
            store.insert_item(entry);
        }
        store
    }

    /// Add or replace a catalogue entry.
    pub fn insert_item(&self, entry: CatalogueEntry) {
        let mut state = self.lock_state();
        state.catalogue.insert(entry.item.id, entry);
    }

    /// Number of catalogue entries.
    pub fn catalogue_len(&self) -> usize {
        self.lock_state().catalogue.len()
    }

    // Seeding and inspection helpers recover from poisoning; port methods
    // report it as a connection failure instead.
    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn try_state<E>(
        &self,
        on_poison: impl FnOnce(&'static str) -> E,
    ) -> Result<MutexGuard<'_, State>, E> {
        self.state.lock().map_err(|_| on_poison(POISONED))
    }
}

#[async_trait]
impl CharacterRepository for MemoryStore {
    async fn find_by_id(
        &self,
        id: &CharacterId,
    ) -> Result<Option<Character>, CharacterRepositoryError> {
        let state = self.try_state(CharacterRepositoryError::connection)?;
        Ok(state.characters.get(id).cloned())
    }

    async fn create(&self, character: &Character) -> Result<(), CharacterRepositoryError> {
        let mut state = self.try_state(CharacterRepositoryError::connection)?;
        if state.name_owner(&character.name).is_some() {
            return Err(CharacterRepositoryError::duplicate_name(
                character.name.as_str(),
            ));
        }
        state.characters.insert(character.id, character.clone());
        Ok(())
    }

    async fn update(&self, character: &Character) -> Result<(), CharacterRepositoryError> {
        let mut state = self.try_state(CharacterRepositoryError::connection)?;
        if state
            .name_owner(&character.name)
            .is_some_and(|owner| owner != character.id)
        {
            return Err(CharacterRepositoryError::duplicate_name(
                character.name.as_str(),
            ));
        }
        match state.characters.get_mut(&character.id) {
            Some(stored) => {
                *stored = character.clone();
                Ok(())
            }
            None => Err(CharacterRepositoryError::missing(character.id.to_string())),
        }
    }
}

#[async_trait]
impl ItemCatalog for MemoryStore {
    async fn find_item(&self, id: &ItemId) -> Result<Option<Item>, ItemCatalogError> {
        let state = self.try_state(ItemCatalogError::connection)?;
        Ok(state.catalogue.get(id).map(|entry| entry.item.clone()))
    }

    async fn find_item_stats(&self, id: &ItemId) -> Result<Option<ItemStats>, ItemCatalogError> {
        let state = self.try_state(ItemCatalogError::connection)?;
        Ok(state.catalogue.get(id).and_then(|entry| entry.stats))
    }
}

#[async_trait]
impl InventoryRepository for MemoryStore {
    async fn load(
        &self,
        character_id: &CharacterId,
    ) -> Result<InventoryLedger, InventoryRepositoryError> {
        let state = self.try_state(InventoryRepositoryError::connection)?;
        Ok(state
            .inventories
            .get(character_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn quantity(
        &self,
        character_id: &CharacterId,
        item_id: &ItemId,
    ) -> Result<u64, InventoryRepositoryError> {
        let state = self.try_state(InventoryRepositoryError::connection)?;
        Ok(state.held(character_id, item_id))
    }

    async fn grant(
        &self,
        character_id: &CharacterId,
        item_id: &ItemId,
        quantity: NonZeroU32,
    ) -> Result<u64, InventoryRepositoryError> {
        let mut state = self.try_state(InventoryRepositoryError::connection)?;
        state
            .inventories
            .entry(*character_id)
            .or_default()
            .grant(*item_id, quantity)
            .map_err(|overflow| {
                InventoryRepositoryError::overflow(overflow.held, overflow.requested)
            })
    }

    async fn consume(
        &self,
        character_id: &CharacterId,
        item_id: &ItemId,
        quantity: NonZeroU32,
    ) -> Result<u64, InventoryRepositoryError> {
        let mut state = self.try_state(InventoryRepositoryError::connection)?;
        let equipped = state
            .board(character_id)
            .map_or(0, |board| board.count_of(item_id));
        let Some(ledger) = state.inventories.get_mut(character_id) else {
            return Err(InventoryRepositoryError::insufficient_quantity(
                quantity.get(),
                0_u64,
                equipped,
            ));
        };
        let remaining = ledger
            .consume(*item_id, quantity, equipped)
            .map_err(|shortfall| {
                InventoryRepositoryError::insufficient_quantity(
                    shortfall.requested,
                    shortfall.available,
                    equipped,
                )
            })?;
        if ledger.is_empty() {
            state.inventories.remove(character_id);
        }
        Ok(remaining)
    }
}

#[async_trait]
impl EquipmentRepository for MemoryStore {
    async fn load(
        &self,
        character_id: &CharacterId,
    ) -> Result<EquipmentBoard, EquipmentRepositoryError> {
        let state = self.try_state(EquipmentRepositoryError::connection)?;
        Ok(state.boards.get(character_id).cloned().unwrap_or_default())
    }

    async fn occupant(
        &self,
        character_id: &CharacterId,
        slot: &EquipmentSlot,
    ) -> Result<Option<ItemId>, EquipmentRepositoryError> {
        let state = self.try_state(EquipmentRepositoryError::connection)?;
        Ok(state
            .boards
            .get(character_id)
            .and_then(|board| board.occupant(slot)))
    }

    async fn occupy(
        &self,
        character_id: &CharacterId,
        slot: &EquipmentSlot,
        item_id: &ItemId,
    ) -> Result<Option<ItemId>, EquipmentRepositoryError> {
        let mut state = self.try_state(EquipmentRepositoryError::connection)?;
        let held = state.held(character_id, item_id);
        let elsewhere = state
            .board(character_id)
            .map_or(0, |board| board.reserved_elsewhere(item_id, slot));
        if held <= u64::from(elsewhere) {
            return Err(EquipmentRepositoryError::not_owned(held, elsewhere));
        }
        Ok(state
            .boards
            .entry(*character_id)
            .or_default()
            .occupy(slot.clone(), *item_id))
    }

    async fn vacate(
        &self,
        character_id: &CharacterId,
        slot: &EquipmentSlot,
    ) -> Result<Option<ItemId>, EquipmentRepositoryError> {
        let mut state = self.try_state(EquipmentRepositoryError::connection)?;
        let Some(board) = state.boards.get_mut(character_id) else {
            return Ok(None);
        };
        let removed = board.vacate(slot);
        if board.is_empty() {
            state.boards.remove(character_id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl NameValidator for MemoryStore {
    async fn check_name(
        &self,
        name: &CharacterName,
        renaming: Option<CharacterId>,
    ) -> Result<NameVerdict, NameValidatorError> {
        let state = self.try_state(NameValidatorError::connection)?;
        Ok(match state.name_owner(name) {
            Some(owner) if Some(owner) != renaming => NameVerdict::Taken,
            _ => NameVerdict::Accepted,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{ItemType, MAX_QUANTITY, UserId};
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> MemoryStore {
        MemoryStore::new()
    }

    fn hero(name: &str) -> Character {
        Character::new(UserId::random(), CharacterName::new(name).expect("valid name"))
    }

    fn units(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).expect("non-zero")
    }

    #[rstest]
    #[tokio::test]
    async fn names_are_unique_ignoring_case(store: MemoryStore) {
        store.create(&hero("Aldric")).await.expect("first create");

        let error = store.create(&hero("ALDRIC")).await.expect_err("duplicate");

        assert!(matches!(error, CharacterRepositoryError::DuplicateName { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn a_character_may_keep_its_own_name(store: MemoryStore) {
        let aldric = hero("Aldric");
        store.create(&aldric).await.expect("create");
        let name = CharacterName::new("aldric").expect("valid name");

        let own = store.check_name(&name, Some(aldric.id)).await.expect("check");
        let other = store.check_name(&name, None).await.expect("check");

        assert_eq!(own, NameVerdict::Accepted);
        assert_eq!(other, NameVerdict::Taken);
    }

    #[rstest]
    #[tokio::test]
    async fn updating_an_unknown_character_reports_missing(store: MemoryStore) {
        let error = store.update(&hero("Ghost")).await.expect_err("missing");
        assert!(matches!(error, CharacterRepositoryError::Missing { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn consuming_everything_drops_the_entry(store: MemoryStore) {
        let character = CharacterId::random();
        let potion = ItemId::random();
        store.grant(&character, &potion, units(2)).await.expect("grant");

        let remaining = store
            .consume(&character, &potion, units(2))
            .await
            .expect("consume");

        assert_eq!(remaining, 0);
        let ledger = InventoryRepository::load(&store, &character)
            .await
            .expect("load");
        assert!(ledger.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn over_consumption_is_rejected_without_change(store: MemoryStore) {
        let character = CharacterId::random();
        let potion = ItemId::random();
        store.grant(&character, &potion, units(2)).await.expect("grant");

        let error = store
            .consume(&character, &potion, units(3))
            .await
            .expect_err("too many");

        assert_eq!(
            error,
            InventoryRepositoryError::insufficient_quantity(3_u32, 2_u64, 0_u32)
        );
        assert_eq!(store.quantity(&character, &potion).await.expect("read"), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn occupy_reports_the_displaced_item(store: MemoryStore) {
        let character = CharacterId::random();
        let weapon = EquipmentSlot::new("weapon").expect("slot");
        let first = ItemId::random();
        let second = ItemId::random();
        store.grant(&character, &first, units(1)).await.expect("grant");
        store.grant(&character, &second, units(1)).await.expect("grant");

        store.occupy(&character, &weapon, &first).await.expect("occupy");
        let displaced = store
            .occupy(&character, &weapon, &second)
            .await
            .expect("occupy");

        assert_eq!(displaced, Some(first));
        assert_eq!(
            store.occupant(&character, &weapon).await.expect("read"),
            Some(second)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn occupy_refuses_units_that_are_not_held(store: MemoryStore) {
        let character = CharacterId::random();
        let ring = ItemId::random();
        let left = EquipmentSlot::new("ring-left").expect("slot");
        let right = EquipmentSlot::new("ring-right").expect("slot");

        let unowned = store
            .occupy(&character, &left, &ring)
            .await
            .expect_err("nothing held");
        assert_eq!(unowned, EquipmentRepositoryError::not_owned(0_u64, 0_u32));

        store.grant(&character, &ring, units(1)).await.expect("grant");
        store.occupy(&character, &left, &ring).await.expect("occupy");
        let reserved = store
            .occupy(&character, &right, &ring)
            .await
            .expect_err("only unit reserved");

        assert_eq!(reserved, EquipmentRepositoryError::not_owned(1_u64, 1_u32));
        assert_eq!(store.occupant(&character, &right).await.expect("read"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn consume_refuses_reserved_units(store: MemoryStore) {
        let character = CharacterId::random();
        let sword = ItemId::random();
        let weapon = EquipmentSlot::new("weapon").expect("slot");
        store.grant(&character, &sword, units(2)).await.expect("grant");
        store.occupy(&character, &weapon, &sword).await.expect("occupy");

        let error = store
            .consume(&character, &sword, units(2))
            .await
            .expect_err("one unit equipped");

        assert_eq!(
            error,
            InventoryRepositoryError::insufficient_quantity(2_u32, 1_u64, 1_u32)
        );
        assert_eq!(store.consume(&character, &sword, units(1)).await, Ok(1));
    }

    #[rstest]
    #[tokio::test]
    async fn grants_past_u32_keep_every_unit(store: MemoryStore) {
        let character = CharacterId::random();
        let coin = ItemId::random();
        store
            .grant(&character, &coin, units(u32::MAX))
            .await
            .expect("grant");

        let total = store.grant(&character, &coin, units(5)).await.expect("grant");

        assert_eq!(total, u64::from(u32::MAX) + 5);
    }

    #[rstest]
    #[tokio::test]
    async fn grants_past_the_ceiling_are_refused(store: MemoryStore) {
        let character = CharacterId::random();
        let coin = ItemId::random();
        {
            let mut state = store.lock_state();
            let mut ledger = InventoryLedger::default();
            ledger.restore(coin, MAX_QUANTITY);
            state.inventories.insert(character, ledger);
        }

        let error = store
            .grant(&character, &coin, units(1))
            .await
            .expect_err("ceiling reached");

        assert_eq!(
            error,
            InventoryRepositoryError::overflow(MAX_QUANTITY, 1_u32)
        );
        assert_eq!(
            store.quantity(&character, &coin).await.expect("read"),
            MAX_QUANTITY
        );
    }

    #[rstest]
    #[tokio::test]
    async fn catalogue_lookups_return_item_and_stats() {
        let entry = CatalogueEntry {
            item: Item {
                id: ItemId::random(),
                name: "Iron Sword".to_owned(),
                description: String::new(),
                item_type: ItemType::new("weapon").expect("type"),
                weight: 6,
                value: 40,
            },
            stats: Some(ItemStats {
                strength: 5,
                ..ItemStats::ZERO
            }),
        };
        let id = entry.item.id;
        let store = MemoryStore::with_catalogue([entry]);

        let item = store.find_item(&id).await.expect("lookup");
        let stats = store.find_item_stats(&id).await.expect("lookup");

        assert_eq!(item.map(|i| i.name), Some("Iron Sword".to_owned()));
        assert_eq!(stats.map(|s| s.strength), Some(5));
    }
}
