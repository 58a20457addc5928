//! PostgreSQL-backed `ItemCatalog` with catalogue seeding.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};
use tracing::info;

use crate::domain::ports::{ItemCatalog, ItemCatalogError};
use crate::domain::{CatalogueEntry, Item, ItemId, ItemStats};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ItemRow, ItemStatsRow};
use super::pool::{DbPool, PoolError};
use super::schema::{item_stats, items};

/// Diesel-backed item catalogue.
#[derive(Clone)]
pub struct DieselItemCatalog {
    pool: DbPool,
}

impl DieselItemCatalog {
    /// Create a catalogue over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert or replace catalogue entries in one transaction.
    ///
    /// An entry without stats removes any stat row previously stored for
    /// that item. Returns the number of entries written.
    pub async fn upsert_entries(
        &self,
        entries: &[CatalogueEntry],
    ) -> Result<usize, ItemCatalogError> {
        let item_rows = entries
            .iter()
            .map(|entry| ItemRow::try_from(&entry.item))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| ItemCatalogError::query(err.to_string()))?;
        let stat_rows: Vec<ItemStatsRow> = entries
            .iter()
            .filter_map(|entry| entry.stats.map(|stats| ItemStatsRow::new(entry.item.id, stats)))
            .collect();
        let statless: Vec<uuid::Uuid> = entries
            .iter()
            .filter(|entry| entry.stats.is_none())
            .map(|entry| *entry.item.id.as_uuid())
            .collect();
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(items::table)
                    .values(&item_rows)
                    .on_conflict(items::id)
                    .do_update()
                    .set((
                        items::name.eq(excluded(items::name)),
                        items::description.eq(excluded(items::description)),
                        items::item_type.eq(excluded(items::item_type)),
                        items::weight.eq(excluded(items::weight)),
                        items::value.eq(excluded(items::value)),
                    ))
                    .execute(conn)
                    .await?;

                if !stat_rows.is_empty() {
                    diesel::insert_into(item_stats::table)
                        .values(&stat_rows)
                        .on_conflict(item_stats::item_id)
                        .do_update()
                        .set((
                            item_stats::strength.eq(excluded(item_stats::strength)),
                            item_stats::agility.eq(excluded(item_stats::agility)),
                            item_stats::intelligence.eq(excluded(item_stats::intelligence)),
                            item_stats::health.eq(excluded(item_stats::health)),
                            item_stats::mana.eq(excluded(item_stats::mana)),
                        ))
                        .execute(conn)
                        .await?;
                }

                diesel::delete(item_stats::table.filter(item_stats::item_id.eq_any(&statless)))
                    .execute(conn)
                    .await?;

                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(diesel_error)?;

        info!(count = entries.len(), "catalogue entries upserted");
        Ok(entries.len())
    }
}

fn pool_error(error: PoolError) -> ItemCatalogError {
    map_pool_error(error, ItemCatalogError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ItemCatalogError {
    map_diesel_error(error, ItemCatalogError::query, ItemCatalogError::connection)
}

#[async_trait]
impl ItemCatalog for DieselItemCatalog {
    async fn find_item(&self, id: &ItemId) -> Result<Option<Item>, ItemCatalogError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row: Option<ItemRow> = items::table
            .find(id.as_uuid())
            .select(ItemRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(Item::try_from)
            .transpose()
            .map_err(|err| ItemCatalogError::query(err.to_string()))
    }

    async fn find_item_stats(&self, id: &ItemId) -> Result<Option<ItemStats>, ItemCatalogError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row: Option<ItemStatsRow> = item_stats::table
            .find(id.as_uuid())
            .select(ItemStatsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        Ok(row.map(ItemStats::from))
    }
}
