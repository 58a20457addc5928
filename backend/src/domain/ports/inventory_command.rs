//! Driving port for inventory mutations.

use std::num::NonZeroU32;

use async_trait::async_trait;

use crate::domain::{CharacterId, Error, ItemId};

/// Driving port for granting and consuming items.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryCommand: Send + Sync {
    /// Add units of an item, returning the new quantity.
    ///
    /// # Errors
    ///
    /// `not_found` when the character or item is unknown; `invalid_request`
    /// when the total would exceed
    /// [`MAX_QUANTITY`](crate::domain::MAX_QUANTITY); `unavailable` on
    /// storage failure.
    async fn grant_item(
        &self,
        character_id: &CharacterId,
        item_id: &ItemId,
        quantity: NonZeroU32,
    ) -> Result<u64, Error>;

    /// Remove units of an item, returning the remaining quantity.
    ///
    /// Units reserved by equipped slots cannot be consumed.
    ///
    /// # Errors
    ///
    /// `insufficient_quantity` when fewer unreserved units are held, leaving
    /// the entry unchanged; `unavailable` on storage failure.
    async fn consume_item(
        &self,
        character_id: &CharacterId,
        item_id: &ItemId,
        quantity: NonZeroU32,
    ) -> Result<u64, Error>;
}

/// Fixture implementation that echoes the requested quantity.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureInventoryCommand;

#[async_trait]
impl InventoryCommand for FixtureInventoryCommand {
    async fn grant_item(
        &self,
        _character_id: &CharacterId,
        _item_id: &ItemId,
        quantity: NonZeroU32,
    ) -> Result<u64, Error> {
        Ok(u64::from(quantity.get()))
    }

    async fn consume_item(
        &self,
        _character_id: &CharacterId,
        _item_id: &ItemId,
        _quantity: NonZeroU32,
    ) -> Result<u64, Error> {
        Ok(0)
    }
}
