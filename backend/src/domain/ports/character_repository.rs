//! Port for character persistence.
//!
//! The [`CharacterRepository`] stores characters with their base stats and
//! progression counters. Base stats never include equipment bonuses; the
//! repository has no notion of equipment at all.

use async_trait::async_trait;

use crate::domain::{Character, CharacterId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by character repository adapters.
    pub enum CharacterRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "character repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "character repository query failed: {message}",
        /// Another character already uses the name.
        DuplicateName { name: String } =>
            "character name already taken: {name}",
        /// The character to update does not exist.
        Missing { id: String } =>
            "character not found: {id}",
    }
}

/// Port for character storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterRepository: Send + Sync {
    /// Fetch a character by identifier.
    ///
    /// Returns `None` when no such character exists.
    async fn find_by_id(
        &self,
        id: &CharacterId,
    ) -> Result<Option<Character>, CharacterRepositoryError>;

    /// Insert a new character.
    ///
    /// Fails with [`CharacterRepositoryError::DuplicateName`] when the name is
    /// already in use, compared case-insensitively.
    async fn create(&self, character: &Character) -> Result<(), CharacterRepositoryError>;

    /// Overwrite name, base stats, and progression of an existing character.
    async fn update(&self, character: &Character) -> Result<(), CharacterRepositoryError>;
}

/// Fixture implementation for testing without a real database.
///
/// Lookups find nothing and writes are discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCharacterRepository;

#[async_trait]
impl CharacterRepository for FixtureCharacterRepository {
    async fn find_by_id(
        &self,
        _id: &CharacterId,
    ) -> Result<Option<Character>, CharacterRepositoryError> {
        Ok(None)
    }

    async fn create(&self, _character: &Character) -> Result<(), CharacterRepositoryError> {
        Ok(())
    }

    async fn update(&self, _character: &Character) -> Result<(), CharacterRepositoryError> {
        Ok(())
    }
}
