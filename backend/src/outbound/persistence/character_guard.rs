//! Row-level serialisation for writes that check inventory against the
//! equipment board.
//!
//! Such writes first lock the owning `characters` row with
//! `SELECT ... FOR UPDATE`, so for one character they run one at a time in
//! every process sharing the database. Reads taken after the lock see the
//! committed state of both tables.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use super::models::{RowConversionError, slot_count, units_from_column};
use super::schema::{characters, equipment_slots, inventory_entries};

/// Storage failure while reading guarded state.
#[derive(Debug)]
pub(crate) enum ReadFailure {
    Diesel(diesel::result::Error),
    Corrupt(RowConversionError),
}

impl From<diesel::result::Error> for ReadFailure {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

/// Failure inside a guarded transaction: a storage failure or the guard's
/// own refusal `R`.
#[derive(Debug)]
pub(crate) enum GuardFailure<R> {
    Diesel(diesel::result::Error),
    Corrupt(RowConversionError),
    Refused(R),
}

impl<R> From<diesel::result::Error> for GuardFailure<R> {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

impl<R> From<RowConversionError> for GuardFailure<R> {
    fn from(value: RowConversionError) -> Self {
        Self::Corrupt(value)
    }
}

impl<R> From<ReadFailure> for GuardFailure<R> {
    fn from(value: ReadFailure) -> Self {
        match value {
            ReadFailure::Diesel(err) => Self::Diesel(err),
            ReadFailure::Corrupt(err) => Self::Corrupt(err),
        }
    }
}

/// Lock the character row until the surrounding transaction ends.
///
/// An unknown character takes no lock; it also owns no rows to protect.
pub(crate) async fn lock_character(
    conn: &mut AsyncPgConnection,
    character_id: Uuid,
) -> QueryResult<()> {
    let _locked: Option<Uuid> = characters::table
        .find(character_id)
        .select(characters::id)
        .for_update()
        .first(conn)
        .await
        .optional()?;
    Ok(())
}

/// Units of an item held, locking the inventory row if present.
pub(crate) async fn held_units(
    conn: &mut AsyncPgConnection,
    character_id: Uuid,
    item_id: Uuid,
) -> Result<u64, ReadFailure> {
    let stored: Option<i64> = inventory_entries::table
        .find((character_id, item_id))
        .select(inventory_entries::quantity)
        .for_update()
        .first(conn)
        .await
        .optional()?;
    stored.map_or(Ok(0), units_from_column).map_err(ReadFailure::Corrupt)
}

/// Slots holding `item_id`, excluding `except` when given.
pub(crate) async fn equipped_units(
    conn: &mut AsyncPgConnection,
    character_id: Uuid,
    item_id: Uuid,
    except: Option<&str>,
) -> Result<u32, ReadFailure> {
    let holding = equipment_slots::table
        .filter(equipment_slots::character_id.eq(character_id))
        .filter(equipment_slots::item_id.eq(item_id));
    let count: i64 = match except {
        Some(slot) => {
            holding
                .filter(equipment_slots::slot.ne(slot))
                .count()
                .get_result(conn)
                .await?
        }
        None => holding.count().get_result(conn).await?,
    };
    slot_count(count).map_err(ReadFailure::Corrupt)
}
