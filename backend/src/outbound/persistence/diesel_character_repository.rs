//! PostgreSQL-backed `CharacterRepository` and `NameValidator`.
//!
//! Name uniqueness is enforced by a unique index on `lower(name)`; the
//! validator performs the same comparison so a clash is reported before the
//! insert is attempted. A concurrent insert that slips past the validator is
//! still caught by the index and mapped to `DuplicateName`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{
    CharacterRepository, CharacterRepositoryError, NameValidator, NameValidatorError, NameVerdict,
};
use crate::domain::{Character, CharacterId, CharacterName};

use super::error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{CharacterRow, RowConversionError};
use super::pool::{DbPool, PoolError};
use super::schema::characters;

diesel::define_sql_function! {
    /// SQL `lower(text)`.
    fn lower(value: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

/// Diesel-backed character storage and name policy.
#[derive(Clone)]
pub struct DieselCharacterRepository {
    pool: DbPool,
}

impl DieselCharacterRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> CharacterRepositoryError {
    map_pool_error(error, CharacterRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> CharacterRepositoryError {
    map_diesel_error(
        error,
        CharacterRepositoryError::query,
        CharacterRepositoryError::connection,
    )
}

fn write_error(error: diesel::result::Error, character: &Character) -> CharacterRepositoryError {
    if is_unique_violation(&error) {
        CharacterRepositoryError::duplicate_name(character.name.as_str())
    } else {
        diesel_error(error)
    }
}

fn conversion_error(error: RowConversionError) -> CharacterRepositoryError {
    CharacterRepositoryError::query(error.to_string())
}

#[async_trait]
impl CharacterRepository for DieselCharacterRepository {
    async fn find_by_id(
        &self,
        id: &CharacterId,
    ) -> Result<Option<Character>, CharacterRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row: Option<CharacterRow> = characters::table
            .filter(characters::id.eq(id.as_uuid()))
            .select(CharacterRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(Character::try_from)
            .transpose()
            .map_err(conversion_error)
    }

    async fn create(&self, character: &Character) -> Result<(), CharacterRepositoryError> {
        let row = CharacterRow::try_from(character).map_err(conversion_error)?;
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        diesel::insert_into(characters::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| write_error(err, character))
    }

    async fn update(&self, character: &Character) -> Result<(), CharacterRepositoryError> {
        let row = CharacterRow::try_from(character).map_err(conversion_error)?;
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let updated = diesel::update(characters::table.find(row.id))
            .set(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| write_error(err, character))?;

        if updated == 0 {
            return Err(CharacterRepositoryError::missing(character.id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl NameValidator for DieselCharacterRepository {
    async fn check_name(
        &self,
        name: &CharacterName,
        renaming: Option<CharacterId>,
    ) -> Result<NameVerdict, NameValidatorError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, NameValidatorError::connection))?;

        let owner: Option<Uuid> = characters::table
            .filter(lower(characters::name).eq(name.as_str().to_lowercase()))
            .select(characters::id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| {
                map_diesel_error(err, NameValidatorError::query, NameValidatorError::connection)
            })?;

        Ok(match owner.map(CharacterId::from_uuid) {
            Some(owner) if Some(owner) != renaming => NameVerdict::Taken,
            _ => NameVerdict::Accepted,
        })
    }
}
