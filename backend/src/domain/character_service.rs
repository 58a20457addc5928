//! Character creation and partial updates.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info, warn};

use crate::domain::ports::{
    CharacterCommand, CharacterRepository, CharacterRepositoryError, NameValidator,
    NameValidatorError, NameVerdict,
};
use crate::domain::{
    Character, CharacterId, CharacterLocks, CharacterName, CharacterPatch, Error, NewCharacter,
};

/// Service implementing [`CharacterCommand`].
///
/// Name format is checked locally; uniqueness and content policy come from
/// the injected [`NameValidator`].
#[derive(Clone)]
pub struct CharacterService<R, N> {
    characters: Arc<R>,
    names: Arc<N>,
    locks: Arc<CharacterLocks>,
}

impl<R, N> CharacterService<R, N> {
    /// Create a service with a private lock registry.
    pub fn new(characters: Arc<R>, names: Arc<N>) -> Self {
        Self {
            characters,
            names,
            locks: Arc::new(CharacterLocks::default()),
        }
    }

    /// Share a lock registry with the equipment service so base-stat
    /// updates never interleave with effective-stat reads.
    #[must_use]
    pub fn with_locks(mut self, locks: Arc<CharacterLocks>) -> Self {
        self.locks = locks;
        self
    }
}

impl<R, N> CharacterService<R, N>
where
    R: CharacterRepository,
    N: NameValidator,
{
    fn map_repository_error(err: CharacterRepositoryError) -> Error {
        match err {
            CharacterRepositoryError::DuplicateName { name } => Self::name_taken(&name),
            CharacterRepositoryError::Missing { id } => {
                Error::not_found(format!("character {id} not found"))
            }
            other => {
                error!(error = %other, "character repository failure");
                Error::unavailable()
            }
        }
    }

    fn map_validator_error(err: NameValidatorError) -> Error {
        error!(error = %err, "name validator failure");
        Error::unavailable()
    }

    fn name_taken(name: &str) -> Error {
        Error::conflict(format!("character name {name} is already taken"))
            .with_details(json!({ "field": "name", "code": "name_taken" }))
    }

    fn parse_name(raw: String) -> Result<CharacterName, Error> {
        CharacterName::new(raw).map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": "name", "code": "invalid_name" }))
        })
    }

    fn validate_patch(patch: &CharacterPatch) -> Result<(), Error> {
        if patch.level == Some(0) {
            return Err(Error::invalid_request("level must be at least 1")
                .with_details(json!({ "field": "level", "code": "out_of_range" })));
        }
        Ok(())
    }

    async fn vet_name(
        &self,
        name: &CharacterName,
        renaming: Option<CharacterId>,
    ) -> Result<(), Error> {
        let verdict = self
            .names
            .check_name(name, renaming)
            .await
            .map_err(Self::map_validator_error)?;
        match verdict {
            NameVerdict::Accepted => Ok(()),
            NameVerdict::Taken => Err(Self::name_taken(name.as_str())),
            NameVerdict::Rejected { reason } => {
                warn!(name = %name, %reason, "character name rejected by policy");
                Err(Error::invalid_request(reason)
                    .with_details(json!({ "field": "name", "code": "name_rejected" })))
            }
        }
    }
}

#[async_trait]
impl<R, N> CharacterCommand for CharacterService<R, N>
where
    R: CharacterRepository,
    N: NameValidator,
{
    async fn create_character(&self, request: NewCharacter) -> Result<Character, Error> {
        let NewCharacter {
            owner_id,
            name,
            base,
        } = request;
        let name = Self::parse_name(name)?;
        self.vet_name(&name, None).await?;

        let mut character = Character::new(owner_id, name);
        if let Some(base) = base {
            Self::validate_patch(&CharacterPatch::default().level(base.level))?;
            character.base = base;
        }
        self.characters
            .create(&character)
            .await
            .map_err(Self::map_repository_error)?;

        info!(character_id = %character.id, %owner_id, "character created");
        Ok(character)
    }

    async fn update_character(
        &self,
        character_id: &CharacterId,
        patch: CharacterPatch,
    ) -> Result<Character, Error> {
        Self::validate_patch(&patch)?;
        let _guard = self.locks.acquire(character_id).await.map_err(|err| {
            warn!(%character_id, error = %err, "character lock acquisition timed out");
            Error::unavailable()
        })?;

        let mut character = self
            .characters
            .find_by_id(character_id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("character {character_id} not found")))?;

        if let Some(name) = patch.name.as_ref().filter(|name| **name != character.name) {
            self.vet_name(name, Some(*character_id)).await?;
        }
        character.apply(&patch);
        self.characters
            .update(&character)
            .await
            .map_err(Self::map_repository_error)?;

        info!(%character_id, "character updated");
        Ok(character)
    }
}
