//! Port for per-character inventory storage.
//!
//! Adapters must never persist a zero quantity: consuming the last unit
//! deletes the entry. Consumes check reservations by equipped slots inside
//! the same atomic step as the decrement, serialised per character with
//! guarded equipment writes, so services in different processes sharing one
//! store cannot consume a reserved unit.

use std::num::NonZeroU32;

use async_trait::async_trait;

use crate::domain::{CharacterId, InventoryLedger, ItemId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by inventory repository adapters.
    pub enum InventoryRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "inventory repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "inventory repository query failed: {message}",
        /// A consume asked for more units than are held and unreserved.
        InsufficientQuantity { requested: u32, available: u64, equipped: u32 } =>
            "cannot consume {requested} units, only {available} available",
        /// A grant would push the quantity past `MAX_QUANTITY`.
        Overflow { held: u64, requested: u32 } =>
            "cannot grant {requested} units on top of {held}",
    }
}

/// Port for inventory ledger storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Load the full ledger of a character. Unknown characters have an empty
    /// ledger.
    async fn load(&self, character_id: &CharacterId)
    -> Result<InventoryLedger, InventoryRepositoryError>;

    /// Units of one item held; zero when absent.
    async fn quantity(
        &self,
        character_id: &CharacterId,
        item_id: &ItemId,
    ) -> Result<u64, InventoryRepositoryError>;

    /// Add units and return the new quantity.
    ///
    /// Fails with [`InventoryRepositoryError::Overflow`] and leaves the
    /// entry untouched when the total would exceed
    /// [`MAX_QUANTITY`](crate::domain::MAX_QUANTITY).
    async fn grant(
        &self,
        character_id: &CharacterId,
        item_id: &ItemId,
        quantity: NonZeroU32,
    ) -> Result<u64, InventoryRepositoryError>;

    /// Remove units not reserved by equipped slots and return the remaining
    /// quantity.
    ///
    /// Fails with [`InventoryRepositoryError::InsufficientQuantity`] and
    /// leaves the entry untouched when fewer unreserved units are held.
    async fn consume(
        &self,
        character_id: &CharacterId,
        item_id: &ItemId,
        quantity: NonZeroU32,
    ) -> Result<u64, InventoryRepositoryError>;
}

/// Fixture repository whose ledgers are always empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureInventoryRepository;

#[async_trait]
impl InventoryRepository for FixtureInventoryRepository {
    async fn load(
        &self,
        _character_id: &CharacterId,
    ) -> Result<InventoryLedger, InventoryRepositoryError> {
        Ok(InventoryLedger::default())
    }

    async fn quantity(
        &self,
        _character_id: &CharacterId,
        _item_id: &ItemId,
    ) -> Result<u64, InventoryRepositoryError> {
        Ok(0)
    }

    async fn grant(
        &self,
        _character_id: &CharacterId,
        _item_id: &ItemId,
        quantity: NonZeroU32,
    ) -> Result<u64, InventoryRepositoryError> {
        Ok(u64::from(quantity.get()))
    }

    async fn consume(
        &self,
        _character_id: &CharacterId,
        _item_id: &ItemId,
        quantity: NonZeroU32,
    ) -> Result<u64, InventoryRepositoryError> {
        Err(InventoryRepositoryError::insufficient_quantity(
            quantity.get(),
            0_u64,
            0_u32,
        ))
    }
}
