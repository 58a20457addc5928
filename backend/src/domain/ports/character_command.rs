//! Driving port for creating and updating characters.

use async_trait::async_trait;

use crate::domain::{Character, CharacterId, CharacterName, CharacterPatch, Error, NewCharacter};

/// Driving port for character lifecycle writes.
///
/// Updates change base stats directly and never touch equipment.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterCommand: Send + Sync {
    /// Create a character.
    ///
    /// # Errors
    ///
    /// - `invalid_request` when the name is malformed or refused by policy.
    /// - `conflict` when the name is already taken.
    /// - `unavailable` on storage failure.
    async fn create_character(&self, request: NewCharacter) -> Result<Character, Error>;

    /// Apply a partial update and return the stored character.
    ///
    /// # Errors
    ///
    /// `not_found` for an unknown character, plus the name errors of
    /// [`CharacterCommand::create_character`] when the patch renames.
    async fn update_character(
        &self,
        character_id: &CharacterId,
        patch: CharacterPatch,
    ) -> Result<Character, Error>;
}

/// Fixture implementation that builds characters without storing them.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCharacterCommand;

#[async_trait]
impl CharacterCommand for FixtureCharacterCommand {
    async fn create_character(&self, request: NewCharacter) -> Result<Character, Error> {
        let name = CharacterName::new(request.name)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let mut character = Character::new(request.owner_id, name);
        if let Some(base) = request.base {
            character.base = base;
        }
        Ok(character)
    }

    async fn update_character(
        &self,
        character_id: &CharacterId,
        _patch: CharacterPatch,
    ) -> Result<Character, Error> {
        Err(Error::not_found(format!("character {character_id} not found")))
    }
}
