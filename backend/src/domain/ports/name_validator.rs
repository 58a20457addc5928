//! Pluggable character name policy.
//!
//! Format rules live on [`crate::domain::CharacterName`]. Uniqueness and any
//! content policy are delegated to a [`NameValidator`] so deployments can
//! choose their own rules.

use async_trait::async_trait;

use crate::domain::{CharacterId, CharacterName};

use super::define_port_error;

define_port_error! {
    /// Errors raised by name validator adapters.
    pub enum NameValidatorError {
        /// Backing store connection could not be established.
        Connection { message: String } =>
            "name validator connection failed: {message}",
        /// Lookup failed during execution.
        Query { message: String } =>
            "name validator query failed: {message}",
    }
}

/// Outcome of a name check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameVerdict {
    /// The name may be used.
    Accepted,
    /// Another character already uses the name.
    Taken,
    /// Policy forbids the name.
    Rejected {
        /// Human-readable reason.
        reason: String,
    },
}

/// Port deciding whether a character name may be used.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NameValidator: Send + Sync {
    /// Check `name`, ignoring the character `renaming` when it already owns
    /// the name.
    async fn check_name(
        &self,
        name: &CharacterName,
        renaming: Option<CharacterId>,
    ) -> Result<NameVerdict, NameValidatorError>;
}

/// Fixture validator that accepts every name.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNameValidator;

#[async_trait]
impl NameValidator for FixtureNameValidator {
    async fn check_name(
        &self,
        _name: &CharacterName,
        _renaming: Option<CharacterId>,
    ) -> Result<NameVerdict, NameValidatorError> {
        Ok(NameVerdict::Accepted)
    }
}
