//! `armoury` entry-point: loads settings, wires the PostgreSQL adapters into
//! the domain services, and runs one subcommand.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use armoury::config::ArmourySettings;
use armoury::domain::{CatalogueEntry, CharacterLocks, CharacterService, EquipmentService};
use armoury::inbound::cli::{Cli, Command, DispatchError, Services, dispatch};
use armoury::outbound::persistence::{
    DbPool, DieselCharacterRepository, DieselEquipmentRepository, DieselInventoryRepository,
    DieselItemCatalog, PoolConfig, run_pending_migrations,
};

fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let cli = Cli::parse();
    // Flags belong to clap; settings come from the environment and files.
    let settings = ArmourySettings::load_from_iter([OsString::from("armoury")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let database_url = settings.database_url().map_err(io::Error::other)?;

    if matches!(cli.command, Command::Migrate) {
        let applied = run_pending_migrations(&database_url)
            .await
            .map_err(io::Error::other)?;
        print_json(&serde_json::json!({ "applied": applied }))?;
        return Ok(());
    }

    let pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(settings.pool_max_size()))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;

    match cli.command {
        Command::Migrate => Ok(()),
        Command::SeedCatalogue { file } => seed_catalogue(pool, &file).await,
        Command::Character(action) => {
            let services = build_services(pool, &settings)?;
            match dispatch(action, &services).await {
                Ok(value) => print_json(&value),
                Err(DispatchError::Domain(error)) => {
                    print_json(&error)?;
                    Err(io::Error::other(format!("command failed: {error}")))
                }
                Err(error) => Err(io::Error::other(error)),
            }
        }
    }
}

fn build_services(pool: DbPool, settings: &ArmourySettings) -> io::Result<Services> {
    let slots = settings.slot_set().map_err(io::Error::other)?;
    let locks = Arc::new(CharacterLocks::new(settings.lock_timeout()));

    let characters = Arc::new(DieselCharacterRepository::new(pool.clone()));
    let catalog = Arc::new(DieselItemCatalog::new(pool.clone()));
    let inventory = Arc::new(DieselInventoryRepository::new(pool.clone()));
    let equipment = Arc::new(DieselEquipmentRepository::new(pool));

    let equipment_service = Arc::new(
        EquipmentService::new(characters.clone(), catalog, inventory, equipment)
            .with_slot_set(slots)
            .with_locks(locks.clone()),
    );
    let character_service =
        Arc::new(CharacterService::new(characters.clone(), characters).with_locks(locks));

    Ok(Services {
        characters: character_service,
        equipment: equipment_service.clone(),
        inventory: equipment_service.clone(),
        query: equipment_service,
    })
}

async fn seed_catalogue(pool: DbPool, path: &Path) -> io::Result<()> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|error| {
        io::Error::other(format!("read catalogue '{}': {error}", path.display()))
    })?;
    let entries: Vec<CatalogueEntry> = serde_json::from_str(&raw).map_err(|error| {
        io::Error::other(format!("parse catalogue '{}': {error}", path.display()))
    })?;

    let written = DieselItemCatalog::new(pool)
        .upsert_entries(&entries)
        .await
        .map_err(|error| io::Error::other(format!("seed catalogue: {error}")))?;
    print_json(&serde_json::json!({ "upserted": written }))
}

fn print_json<T: serde::Serialize>(value: &T) -> io::Result<()> {
    let rendered = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    println!("{rendered}");
    Ok(())
}
