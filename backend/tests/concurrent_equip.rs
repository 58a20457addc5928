//! Contention tests for per-character serialization.
//!
//! Many tasks race to equip, unequip, and consume the same stack of swords.
//! Whatever the interleaving, equipped units never exceed the units held and
//! effective stats always equal base plus the equipped bonuses. The same
//! holds for services that share only the store, as separate processes do.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use armoury::domain::ports::{
    CharacterQuery, CharacterRepository, EquipRequest, EquipmentCommand, InventoryCommand,
    InventoryRepository, InventoryRepositoryError, UnequipRequest,
};
use armoury::domain::{
    BaseStats, CatalogueEntry, Character, CharacterId, CharacterName, EquipmentService,
    EquipmentSlot, ErrorCode, InventoryLedger, Item, ItemId, ItemStats, ItemType, UserId,
};
use armoury::outbound::memory::MemoryStore;
use async_trait::async_trait;
use rstest::rstest;

const TASKS: usize = 96;
const SWORD_BONUS: i32 = 5;

fn sword() -> CatalogueEntry {
    CatalogueEntry {
        item: Item {
            id: ItemId::random(),
            name: "Iron Sword".to_owned(),
            description: "Plain but sharp.".to_owned(),
            item_type: ItemType::new("weapon").expect("valid type"),
            weight: 6,
            value: 40,
        },
        stats: Some(ItemStats {
            strength: SWORD_BONUS,
            ..ItemStats::ZERO
        }),
    }
}

#[rstest]
#[case::scarce(1)]
#[case::one_per_hand(2)]
#[case::plenty(8)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_changes_conserve_inventory_and_stats(#[case] stock: u32) {
    let entry = sword();
    let sword_id = entry.item.id;
    let store = Arc::new(MemoryStore::with_catalogue([entry]));
    let service = Arc::new(EquipmentService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
    ));

    let character = Character::new(
        UserId::random(),
        CharacterName::new("Brienne").expect("valid name"),
    );
    let id = character.id;
    store.create(&character).await.expect("character stored");
    service
        .grant_item(&id, &sword_id, NonZeroU32::new(stock).expect("positive stock"))
        .await
        .expect("grant succeeds");

    let weapon = EquipmentSlot::new("weapon").expect("valid slot");
    let offhand = EquipmentSlot::new("offhand").expect("valid slot");
    let mut handles = Vec::with_capacity(TASKS);
    for task in 0..TASKS {
        let service = service.clone();
        let slot = if task % 2 == 0 {
            weapon.clone()
        } else {
            offhand.clone()
        };
        handles.push(tokio::spawn(async move {
            let outcome = match task % 3 {
                0 => service
                    .equip(EquipRequest {
                        character_id: id,
                        item_id: sword_id,
                        slot,
                    })
                    .await
                    .map(|_| ()),
                1 => service
                    .unequip(UnequipRequest {
                        character_id: id,
                        slot,
                    })
                    .await
                    .map(|_| ()),
                _ => service
                    .consume_item(&id, &sword_id, NonZeroU32::MIN)
                    .await
                    .map(|_| ()),
            };
            if let Err(error) = outcome {
                assert!(
                    matches!(
                        error.code(),
                        ErrorCode::ItemNotOwned | ErrorCode::InsufficientQuantity
                    ),
                    "unexpected failure: {error:?}"
                );
            }
        }));
    }
    for handle in handles {
        handle.await.expect("task completes");
    }

    let inventory = service.get_inventory(&id).await.expect("inventory readable");
    let equipment = service.get_equipment(&id).await.expect("equipment readable");
    let effective = service
        .get_effective_character(&id)
        .await
        .expect("character readable");

    let equipped = u64::try_from(equipment.len()).expect("few slots");
    let held = inventory
        .iter()
        .find(|view| view.item_id == sword_id)
        .map_or(0, |view| view.quantity);

    assert!(equipped <= held, "{equipped} equipped but {held} held");
    assert!(held <= u64::from(stock));
    let bonus = SWORD_BONUS * i32::try_from(equipped).expect("small count");
    assert_eq!(
        effective.stats.strength,
        BaseStats::default().strength + bonus
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn different_characters_proceed_independently() {
    let entry = sword();
    let sword_id = entry.item.id;
    let store = Arc::new(MemoryStore::with_catalogue([entry]));
    let service = Arc::new(EquipmentService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
    ));

    let mut handles = Vec::new();
    for index in 0..16 {
        let store = store.clone();
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            let character = Character::new(
                UserId::random(),
                CharacterName::new(format!("Hero {index}")).expect("valid name"),
            );
            store.create(&character).await.expect("character stored");
            service
                .grant_item(&character.id, &sword_id, NonZeroU32::MIN)
                .await
                .expect("grant succeeds");
            service
                .equip(EquipRequest {
                    character_id: character.id,
                    item_id: sword_id,
                    slot: EquipmentSlot::new("weapon").expect("valid slot"),
                })
                .await
                .expect("equip succeeds");
            service
                .get_effective_character(&character.id)
                .await
                .expect("character readable")
                .stats
                .strength
        }));
    }

    for handle in handles {
        let strength = handle.await.expect("task completes");
        assert_eq!(strength, BaseStats::default().strength + SWORD_BONUS);
    }
}

/// Inventory adapter whose quantity reads lag behind, so a service's checks
/// and its write are far apart in time.
struct LaggingInventory {
    store: Arc<MemoryStore>,
    lag: Duration,
}

#[async_trait]
impl InventoryRepository for LaggingInventory {
    async fn load(
        &self,
        character_id: &CharacterId,
    ) -> Result<InventoryLedger, InventoryRepositoryError> {
        InventoryRepository::load(self.store.as_ref(), character_id).await
    }

    async fn quantity(
        &self,
        character_id: &CharacterId,
        item_id: &ItemId,
    ) -> Result<u64, InventoryRepositoryError> {
        let held = self.store.quantity(character_id, item_id).await;
        tokio::time::sleep(self.lag).await;
        held
    }

    async fn grant(
        &self,
        character_id: &CharacterId,
        item_id: &ItemId,
        quantity: NonZeroU32,
    ) -> Result<u64, InventoryRepositoryError> {
        self.store.grant(character_id, item_id, quantity).await
    }

    async fn consume(
        &self,
        character_id: &CharacterId,
        item_id: &ItemId,
        quantity: NonZeroU32,
    ) -> Result<u64, InventoryRepositoryError> {
        self.store.consume(character_id, item_id, quantity).await
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn services_sharing_only_the_store_cannot_split_the_last_unit() {
    let entry = sword();
    let sword_id = entry.item.id;
    let store = Arc::new(MemoryStore::with_catalogue([entry]));
    let inventory = Arc::new(LaggingInventory {
        store: store.clone(),
        lag: Duration::from_millis(50),
    });
    // Each service owns a private lock registry, like a separate process.
    let worker = || {
        Arc::new(EquipmentService::new(
            store.clone(),
            store.clone(),
            inventory.clone(),
            store.clone(),
        ))
    };
    let (equipper, consumer) = (worker(), worker());

    let character = Character::new(
        UserId::random(),
        CharacterName::new("Gawain").expect("valid name"),
    );
    let id = character.id;
    store.create(&character).await.expect("character stored");
    equipper
        .grant_item(&id, &sword_id, NonZeroU32::MIN)
        .await
        .expect("grant succeeds");

    let (equipped, consumed) = tokio::join!(
        equipper.equip(EquipRequest {
            character_id: id,
            item_id: sword_id,
            slot: EquipmentSlot::new("weapon").expect("valid slot"),
        }),
        consumer.consume_item(&id, &sword_id, NonZeroU32::MIN),
    );

    assert_ne!(
        equipped.is_ok(),
        consumed.is_ok(),
        "exactly one change may take the only sword"
    );
    if let Err(error) = &equipped {
        assert_eq!(error.code(), ErrorCode::ItemNotOwned);
    }
    if let Err(error) = &consumed {
        assert_eq!(error.code(), ErrorCode::InsufficientQuantity);
    }

    let held = store.quantity(&id, &sword_id).await.expect("quantity readable");
    let on_board = equipper
        .get_equipment(&id)
        .await
        .expect("equipment readable")
        .len();
    let effective = equipper
        .get_effective_character(&id)
        .await
        .expect("character readable");
    assert!(
        u64::try_from(on_board).expect("few slots") <= held,
        "{on_board} equipped while holding {held}"
    );
    let bonus = SWORD_BONUS * i32::try_from(on_board).expect("small count");
    assert_eq!(
        effective.stats.strength,
        BaseStats::default().strength + bonus
    );
}
