//! Tests for argument parsing and dispatch.

use std::str::FromStr;

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::{
    CatalogueEntry, CharacterService, EquipmentService, ErrorCode, Item, ItemStats, ItemType,
};
use crate::outbound::memory::MemoryStore;

const SWORD: &str = "22222222-2222-2222-2222-222222222222";
const OWNER: &str = "11111111-1111-1111-1111-111111111111";

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(std::iter::once("armoury").chain(args.iter().copied()))
}

fn character_action(args: &[&str]) -> CharacterAction {
    match parse(args).expect("arguments parse").command {
        Command::Character(action) => action,
        other => panic!("expected a character action, got {other:?}"),
    }
}

#[fixture]
fn services() -> Services {
    let sword = CatalogueEntry {
        item: Item {
            id: ItemId::from_str(SWORD).expect("valid id"),
            name: "Iron Sword".to_owned(),
            description: "Plain but sharp.".to_owned(),
            item_type: ItemType::new("weapon").expect("valid type"),
            weight: 6,
            value: 40,
        },
        stats: Some(ItemStats {
            strength: 5,
            ..ItemStats::default()
        }),
    };
    let store = Arc::new(MemoryStore::with_catalogue([sword]));
    let equipment = Arc::new(EquipmentService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
    ));
    Services {
        characters: Arc::new(CharacterService::new(store.clone(), store)),
        equipment: equipment.clone(),
        inventory: equipment.clone(),
        query: equipment,
    }
}

async fn create(services: &Services) -> String {
    let created = dispatch(
        character_action(&["create-character", "--owner", OWNER, "--name", "Aldric"]),
        services,
    )
    .await
    .expect("character created");
    created["id"].as_str().expect("id is a string").to_owned()
}

#[rstest]
fn equip_arguments_parse() {
    let action = character_action(&[
        "equip",
        "--character",
        "33333333-3333-3333-3333-333333333333",
        "--item",
        SWORD,
        "--slot",
        "weapon",
    ]);

    let CharacterAction::Equip { slot, item, .. } = action else {
        panic!("expected equip");
    };
    assert_eq!(slot.as_str(), "weapon");
    assert_eq!(item.to_string(), SWORD);
}

#[rstest]
#[case::zero_quantity(&["grant", "--character", OWNER, "--item", SWORD, "--quantity", "0"])]
#[case::bad_slot(&["unequip", "--character", OWNER, "--slot", "Main Hand"])]
#[case::bad_name(&["create-character", "--owner", OWNER, "--name", "x"])]
#[case::bad_id(&["show", "--character", "not-a-uuid"])]
fn invalid_arguments_are_rejected(#[case] args: &[&str]) {
    assert!(parse(args).is_err());
}

#[rstest]
fn seed_catalogue_takes_a_path() {
    let cli = parse(&["seed-catalogue", "--file", "fixtures/catalogue.json"]).expect("parses");
    assert!(matches!(
        cli.command,
        Command::SeedCatalogue { file } if file == PathBuf::from("fixtures/catalogue.json")
    ));
}

#[rstest]
fn stat_flags_override_defaults_only_when_present() {
    assert_eq!(BaseStatArgs::default().into_base(), None);

    let base = BaseStatArgs {
        strength: Some(14),
        ..BaseStatArgs::default()
    }
    .into_base()
    .expect("flag present");
    assert_eq!(base.strength, 14);
    assert_eq!(base.health, BaseStats::default().health);
}

#[rstest]
#[tokio::test]
async fn equip_flow_renders_effective_stats(services: Services) {
    let id = create(&services).await;

    let granted = dispatch(
        character_action(&["grant", "--character", &id, "--item", SWORD]),
        &services,
    )
    .await
    .expect("grant succeeds");
    assert_eq!(granted["quantity"], json!(1));

    let equipped = dispatch(
        character_action(&[
            "equip",
            "--character",
            &id,
            "--item",
            SWORD,
            "--slot",
            "weapon",
        ]),
        &services,
    )
    .await
    .expect("equip succeeds");
    assert_eq!(equipped["statChange"]["strength"], json!(5));

    let shown = dispatch(character_action(&["show", "--character", &id]), &services)
        .await
        .expect("show succeeds");
    assert_eq!(shown["stats"]["strength"], json!(15));
}

#[rstest]
#[tokio::test]
async fn domain_errors_pass_through(services: Services) {
    let id = create(&services).await;

    let error = dispatch(
        character_action(&[
            "equip",
            "--character",
            &id,
            "--item",
            SWORD,
            "--slot",
            "weapon",
        ]),
        &services,
    )
    .await
    .expect_err("sword not owned");

    let DispatchError::Domain(error) = error else {
        panic!("expected a domain error");
    };
    assert_eq!(error.code(), ErrorCode::ItemNotOwned);
}

#[rstest]
#[tokio::test]
async fn update_applies_only_given_flags(services: Services) {
    let id = create(&services).await;

    let updated = dispatch(
        character_action(&[
            "update-character",
            "--character",
            &id,
            "--strength",
            "12",
            "--gold",
            "30",
        ]),
        &services,
    )
    .await
    .expect("update succeeds");

    assert_eq!(updated["base"]["strength"], json!(12));
    assert_eq!(updated["base"]["health"], json!(BaseStats::default().health));
    assert_eq!(updated["progression"]["gold"], json!(30));
}
