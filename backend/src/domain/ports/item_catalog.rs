//! Read-only port over item definitions and their stat deltas.

use async_trait::async_trait;

use crate::domain::{Item, ItemId, ItemStats};

use super::define_port_error;

define_port_error! {
    /// Errors raised by item catalogue adapters.
    pub enum ItemCatalogError {
        /// Catalogue connection could not be established.
        Connection { message: String } =>
            "item catalogue connection failed: {message}",
        /// Lookup failed during execution.
        Query { message: String } =>
            "item catalogue query failed: {message}",
    }
}

/// Port for catalogue lookups.
///
/// Absence is not an error here: a missing item is `None`, and a missing
/// stat record means the item has no combat effect.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemCatalog: Send + Sync {
    /// Fetch an item definition.
    async fn find_item(&self, id: &ItemId) -> Result<Option<Item>, ItemCatalogError>;

    /// Fetch the stat delta of an item, if it has one.
    async fn find_item_stats(&self, id: &ItemId) -> Result<Option<ItemStats>, ItemCatalogError>;
}

/// Fixture catalogue that knows no items.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureItemCatalog;

#[async_trait]
impl ItemCatalog for FixtureItemCatalog {
    async fn find_item(&self, _id: &ItemId) -> Result<Option<Item>, ItemCatalogError> {
        Ok(None)
    }

    async fn find_item_stats(&self, _id: &ItemId) -> Result<Option<ItemStats>, ItemCatalogError> {
        Ok(None)
    }
}
