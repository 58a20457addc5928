//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`ItemCatalog`], [`NameValidator`]) are
//! implemented by outbound adapters. Driving ports (`*Command`, `*Query`) are
//! implemented by domain services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod character_command;
mod character_query;
mod character_repository;
mod equipment_command;
mod equipment_repository;
mod inventory_command;
mod inventory_repository;
mod item_catalog;
mod name_validator;

#[cfg(test)]
pub use character_command::MockCharacterCommand;
pub use character_command::{CharacterCommand, FixtureCharacterCommand};
#[cfg(test)]
pub use character_query::MockCharacterQuery;
pub use character_query::{
    CharacterQuery, EquippedItemView, FixtureCharacterQuery, InventoryItemView,
};
#[cfg(test)]
pub use character_repository::MockCharacterRepository;
pub use character_repository::{
    CharacterRepository, CharacterRepositoryError, FixtureCharacterRepository,
};
#[cfg(test)]
pub use equipment_command::MockEquipmentCommand;
pub use equipment_command::{
    EquipOutcome, EquipRequest, EquipmentCommand, FixtureEquipmentCommand, UnequipOutcome,
    UnequipRequest,
};
#[cfg(test)]
pub use equipment_repository::MockEquipmentRepository;
pub use equipment_repository::{
    EquipmentRepository, EquipmentRepositoryError, FixtureEquipmentRepository,
};
#[cfg(test)]
pub use inventory_command::MockInventoryCommand;
pub use inventory_command::{FixtureInventoryCommand, InventoryCommand};
#[cfg(test)]
pub use inventory_repository::MockInventoryRepository;
pub use inventory_repository::{
    FixtureInventoryRepository, InventoryRepository, InventoryRepositoryError,
};
#[cfg(test)]
pub use item_catalog::MockItemCatalog;
pub use item_catalog::{FixtureItemCatalog, ItemCatalog, ItemCatalogError};
#[cfg(test)]
pub use name_validator::MockNameValidator;
pub use name_validator::{FixtureNameValidator, NameValidator, NameValidatorError, NameVerdict};
