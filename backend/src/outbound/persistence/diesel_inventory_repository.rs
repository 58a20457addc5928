//! PostgreSQL-backed `InventoryRepository`.
//!
//! Grants and consumes run inside one transaction that first locks the
//! owning character row. Consumes count equipped reservations after taking
//! that lock, then decrement or delete the entry so a zero quantity is never
//! stored.

use std::num::NonZeroU32;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};

use crate::domain::ports::{InventoryRepository, InventoryRepositoryError};
use crate::domain::{
    CharacterId, InsufficientQuantity, InventoryLedger, ItemId, QuantityOverflow,
    checked_consume, checked_grant,
};

use super::character_guard::{GuardFailure, equipped_units, held_units, lock_character};
use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{InventoryEntryRow, RowConversionError, units_to_column};
use super::pool::{DbPool, PoolError};
use super::schema::inventory_entries;

/// Diesel-backed inventory storage.
#[derive(Clone)]
pub struct DieselInventoryRepository {
    pool: DbPool,
}

impl DieselInventoryRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Reason a consume was refused inside its transaction.
#[derive(Debug)]
struct Shortfall {
    refusal: InsufficientQuantity,
    equipped: u32,
}

fn pool_error(error: PoolError) -> InventoryRepositoryError {
    map_pool_error(error, InventoryRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> InventoryRepositoryError {
    map_diesel_error(
        error,
        InventoryRepositoryError::query,
        InventoryRepositoryError::connection,
    )
}

fn conversion_error(error: RowConversionError) -> InventoryRepositoryError {
    InventoryRepositoryError::query(error.to_string())
}

fn guard_error<R>(
    failure: GuardFailure<R>,
    refused: impl FnOnce(R) -> InventoryRepositoryError,
) -> InventoryRepositoryError {
    match failure {
        GuardFailure::Diesel(err) => diesel_error(err),
        GuardFailure::Corrupt(err) => conversion_error(err),
        GuardFailure::Refused(reason) => refused(reason),
    }
}

#[async_trait]
impl InventoryRepository for DieselInventoryRepository {
    async fn load(
        &self,
        character_id: &CharacterId,
    ) -> Result<InventoryLedger, InventoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows: Vec<InventoryEntryRow> = inventory_entries::table
            .filter(inventory_entries::character_id.eq(character_id.as_uuid()))
            .select(InventoryEntryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        let mut ledger = InventoryLedger::default();
        for row in rows {
            let units = row.units().map_err(conversion_error)?;
            ledger.restore(ItemId::from_uuid(row.item_id), units);
        }
        Ok(ledger)
    }

    async fn quantity(
        &self,
        character_id: &CharacterId,
        item_id: &ItemId,
    ) -> Result<u64, InventoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row: Option<InventoryEntryRow> = inventory_entries::table
            .find((character_id.as_uuid(), item_id.as_uuid()))
            .select(InventoryEntryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map_or(Ok(0), |row| row.units().map_err(conversion_error))
    }

    async fn grant(
        &self,
        character_id: &CharacterId,
        item_id: &ItemId,
        quantity: NonZeroU32,
    ) -> Result<u64, InventoryRepositoryError> {
        let (character, item) = (*character_id.as_uuid(), *item_id.as_uuid());
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let outcome = conn
            .transaction(|conn| {
                async move {
                    lock_character(conn, character).await?;
                    let held = held_units(conn, character, item).await?;
                    let total = checked_grant(held, quantity).map_err(GuardFailure::Refused)?;

                    let row = InventoryEntryRow {
                        character_id: character,
                        item_id: item,
                        quantity: units_to_column(total)?,
                    };
                    diesel::insert_into(inventory_entries::table)
                        .values(&row)
                        .on_conflict((inventory_entries::character_id, inventory_entries::item_id))
                        .do_update()
                        .set(inventory_entries::quantity.eq(excluded(inventory_entries::quantity)))
                        .execute(conn)
                        .await?;
                    Ok::<_, GuardFailure<QuantityOverflow>>(total)
                }
                .scope_boxed()
            })
            .await;

        outcome.map_err(|failure| {
            guard_error(failure, |overflow| {
                InventoryRepositoryError::overflow(overflow.held, overflow.requested)
            })
        })
    }

    async fn consume(
        &self,
        character_id: &CharacterId,
        item_id: &ItemId,
        quantity: NonZeroU32,
    ) -> Result<u64, InventoryRepositoryError> {
        let (character, item) = (*character_id.as_uuid(), *item_id.as_uuid());
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let outcome = conn
            .transaction(|conn| {
                async move {
                    lock_character(conn, character).await?;
                    let held = held_units(conn, character, item).await?;
                    let equipped = equipped_units(conn, character, item, None).await?;
                    let remaining = checked_consume(held, equipped, quantity).map_err(|refusal| {
                        GuardFailure::Refused(Shortfall { refusal, equipped })
                    })?;

                    let target = inventory_entries::table.find((character, item));
                    if remaining == 0 {
                        diesel::delete(target).execute(conn).await?;
                    } else {
                        diesel::update(target)
                            .set(inventory_entries::quantity.eq(units_to_column(remaining)?))
                            .execute(conn)
                            .await?;
                    }
                    Ok::<_, GuardFailure<Shortfall>>(remaining)
                }
                .scope_boxed()
            })
            .await;

        outcome.map_err(|failure| {
            guard_error(failure, |shortfall| {
                InventoryRepositoryError::insufficient_quantity(
                    shortfall.refusal.requested,
                    shortfall.refusal.available,
                    shortfall.equipped,
                )
            })
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let error = pool_error(PoolError::checkout("refused"));
        assert!(matches!(error, InventoryRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn diesel_errors_map_to_query_errors() {
        let error = diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(error, InventoryRepositoryError::Query { .. }));
    }

    #[rstest]
    fn refused_grants_become_overflow_errors() {
        let failure = GuardFailure::Refused(QuantityOverflow {
            held: 7,
            requested: 3,
        });

        let error = guard_error(failure, |overflow: QuantityOverflow| {
            InventoryRepositoryError::overflow(overflow.held, overflow.requested)
        });

        assert_eq!(error, InventoryRepositoryError::overflow(7_u64, 3_u32));
    }
}
