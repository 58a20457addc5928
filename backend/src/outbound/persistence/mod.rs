//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the driven ports backed
//! by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations translate between Diesel
//!   rows and domain types. The only rule they enforce is the ownership and
//!   reservation check that guards `occupy` and `consume`, repeated inside
//!   the write transaction under a lock on the character row.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) never leave this module.
//! - **Constraint-backed invariants**: Quantities are checked positive and
//!   each `(character, slot)` pair is a primary key, so the database rejects
//!   states the domain forbids.
//!
//! # Example
//!
//! ```ignore
//! use armoury::outbound::persistence::{DbPool, DieselItemCatalog, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/armoury")).await?;
//! let catalog = DieselItemCatalog::new(pool);
//! ```

mod character_guard;
mod diesel_character_repository;
mod diesel_equipment_repository;
mod diesel_inventory_repository;
mod diesel_item_catalog;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_character_repository::DieselCharacterRepository;
pub use diesel_equipment_repository::DieselEquipmentRepository;
pub use diesel_inventory_repository::DieselInventoryRepository;
pub use diesel_item_catalog::DieselItemCatalog;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
