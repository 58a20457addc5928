//! PostgreSQL-backed `EquipmentRepository`.
//!
//! `(character_id, slot)` is the primary key of `equipment_slots`, so the
//! database itself rules out two occupants for one slot. `occupy` locks the
//! owning character row, then checks the held quantity against the other
//! slots holding the item before it writes.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{EquipmentRepository, EquipmentRepositoryError};
use crate::domain::{CharacterId, EquipmentBoard, EquipmentSlot, ItemId};

use super::character_guard::{GuardFailure, equipped_units, held_units, lock_character};
use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::EquipmentSlotRow;
use super::pool::{DbPool, PoolError};
use super::schema::equipment_slots;

/// Diesel-backed equipment board storage.
#[derive(Clone)]
pub struct DieselEquipmentRepository {
    pool: DbPool,
}

impl DieselEquipmentRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> EquipmentRepositoryError {
    map_pool_error(error, EquipmentRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> EquipmentRepositoryError {
    map_diesel_error(
        error,
        EquipmentRepositoryError::query,
        EquipmentRepositoryError::connection,
    )
}

/// Units of the item held and reserved by other slots when `occupy` refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NoFreeUnit {
    held: u64,
    elsewhere: u32,
}

fn occupy_error(failure: GuardFailure<NoFreeUnit>) -> EquipmentRepositoryError {
    match failure {
        GuardFailure::Diesel(err) => diesel_error(err),
        GuardFailure::Corrupt(err) => EquipmentRepositoryError::query(err.to_string()),
        GuardFailure::Refused(NoFreeUnit { held, elsewhere }) => {
            EquipmentRepositoryError::not_owned(held, elsewhere)
        }
    }
}

fn row_to_entry(row: EquipmentSlotRow) -> Result<(EquipmentSlot, ItemId), EquipmentRepositoryError> {
    let slot = EquipmentSlot::new(row.slot)
        .map_err(|err| EquipmentRepositoryError::query(format!("corrupt slot column: {err}")))?;
    Ok((slot, ItemId::from_uuid(row.item_id)))
}

#[async_trait]
impl EquipmentRepository for DieselEquipmentRepository {
    async fn load(
        &self,
        character_id: &CharacterId,
    ) -> Result<EquipmentBoard, EquipmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows: Vec<EquipmentSlotRow> = equipment_slots::table
            .filter(equipment_slots::character_id.eq(character_id.as_uuid()))
            .select(EquipmentSlotRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        rows.into_iter().map(row_to_entry).collect()
    }

    async fn occupant(
        &self,
        character_id: &CharacterId,
        slot: &EquipmentSlot,
    ) -> Result<Option<ItemId>, EquipmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let item: Option<Uuid> = equipment_slots::table
            .find((character_id.as_uuid(), slot.as_str()))
            .select(equipment_slots::item_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        Ok(item.map(ItemId::from_uuid))
    }

    async fn occupy(
        &self,
        character_id: &CharacterId,
        slot: &EquipmentSlot,
        item_id: &ItemId,
    ) -> Result<Option<ItemId>, EquipmentRepositoryError> {
        let row = EquipmentSlotRow {
            character_id: *character_id.as_uuid(),
            slot: slot.as_str().to_owned(),
            item_id: *item_id.as_uuid(),
        };
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let previous = conn
            .transaction(|conn| {
                async move {
                    lock_character(conn, row.character_id).await?;
                    let held = held_units(conn, row.character_id, row.item_id).await?;
                    let elsewhere =
                        equipped_units(conn, row.character_id, row.item_id, Some(&row.slot))
                            .await?;
                    if held <= u64::from(elsewhere) {
                        return Err(GuardFailure::Refused(NoFreeUnit { held, elsewhere }));
                    }

                    let previous: Option<Uuid> = equipment_slots::table
                        .find((row.character_id, row.slot.as_str()))
                        .select(equipment_slots::item_id)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;

                    diesel::insert_into(equipment_slots::table)
                        .values(&row)
                        .on_conflict((equipment_slots::character_id, equipment_slots::slot))
                        .do_update()
                        .set(equipment_slots::item_id.eq(excluded(equipment_slots::item_id)))
                        .execute(conn)
                        .await?;

                    Ok::<_, GuardFailure<NoFreeUnit>>(previous)
                }
                .scope_boxed()
            })
            .await
            .map_err(occupy_error)?;

        Ok(previous.map(ItemId::from_uuid))
    }

    async fn vacate(
        &self,
        character_id: &CharacterId,
        slot: &EquipmentSlot,
    ) -> Result<Option<ItemId>, EquipmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let removed: Option<Uuid> =
            diesel::delete(equipment_slots::table.find((character_id.as_uuid(), slot.as_str())))
                .returning(equipment_slots::item_id)
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(diesel_error)?;

        Ok(removed.map(ItemId::from_uuid))
    }
}
