//! Runtime settings loaded via OrthoConfig.
//!
//! Values come from `ARMOURY_*` environment variables, command-line flags, or
//! a configuration file, layered by `ortho_config`.

use std::env;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{DEFAULT_LOCK_TIMEOUT, SlotSet, SlotSetParseError};

const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Configuration values for the equipment engine.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ARMOURY")]
pub struct ArmourySettings {
    /// PostgreSQL connection URL. Falls back to `DATABASE_URL`.
    pub database_url: Option<String>,
    /// Slot definitions as `slot[=type|type],...`.
    pub slots: Option<String>,
    /// Longest wait for a per-character lock, in milliseconds.
    pub lock_timeout_ms: Option<u64>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
}

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// Neither `ARMOURY_DATABASE_URL` nor `DATABASE_URL` is set.
    #[error("database URL missing: set ARMOURY_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,
    /// The slot definitions could not be parsed.
    #[error("invalid slot configuration: {0}")]
    Slots(#[from] SlotSetParseError),
}

impl ArmourySettings {
    /// Return the database URL, falling back to `DATABASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when neither source
    /// holds a non-blank value.
    pub fn database_url(&self) -> Result<String, SettingsError> {
        self.database_url
            .clone()
            .or_else(|| env::var("DATABASE_URL").ok())
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Return the configured slot set, or the permissive default.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Slots`] for malformed definitions.
    pub fn slot_set(&self) -> Result<SlotSet, SettingsError> {
        match self.slots.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Ok(raw.parse()?),
            _ => Ok(SlotSet::default()),
        }
    }

    /// Return the lock timeout.
    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout_ms
            .map_or(DEFAULT_LOCK_TIMEOUT, Duration::from_millis)
    }

    /// Return the pool size.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use crate::domain::EquipmentSlot;
    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "ARMOURY_DATABASE_URL",
        "ARMOURY_SLOTS",
        "ARMOURY_LOCK_TIMEOUT_MS",
        "ARMOURY_POOL_MAX_SIZE",
        "DATABASE_URL",
    ];

    fn load_from_empty_args() -> ArmourySettings {
        ArmourySettings::load_from_iter([OsString::from("armoury")]).expect("config should load")
    }

    fn cleared() -> Vec<(&'static str, Option<String>)> {
        VARS.iter().map(|name| (*name, None)).collect()
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(cleared());

        let settings = load_from_empty_args();
        assert_eq!(settings.lock_timeout(), DEFAULT_LOCK_TIMEOUT);
        assert_eq!(settings.pool_max_size(), DEFAULT_POOL_MAX_SIZE);
        assert_eq!(settings.slot_set().expect("default slots"), SlotSet::default());
        assert_eq!(
            settings.database_url(),
            Err(SettingsError::MissingDatabaseUrl)
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let mut vars = cleared();
        vars.extend([
            ("ARMOURY_SLOTS", Some("head=helmet,weapon=sword|axe".to_owned())),
            ("ARMOURY_LOCK_TIMEOUT_MS", Some("250".to_owned())),
            ("ARMOURY_POOL_MAX_SIZE", Some("3".to_owned())),
            ("DATABASE_URL", Some("postgres://localhost/armoury".to_owned())),
        ]);
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();
        let slots = settings.slot_set().expect("slots parse");
        assert_eq!(slots.len(), 2);
        assert!(slots.contains(&EquipmentSlot::new("weapon").expect("valid slot")));
        assert_eq!(settings.lock_timeout(), Duration::from_millis(250));
        assert_eq!(settings.pool_max_size(), 3);
        assert_eq!(
            settings.database_url().as_deref(),
            Ok("postgres://localhost/armoury")
        );
    }

    #[rstest]
    fn prefixed_database_url_wins_over_fallback() {
        let mut vars = cleared();
        vars.extend([
            ("ARMOURY_DATABASE_URL", Some("postgres://primary/db".to_owned())),
            ("DATABASE_URL", Some("postgres://fallback/db".to_owned())),
        ]);
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.database_url().as_deref(),
            Ok("postgres://primary/db")
        );
    }

    #[rstest]
    #[case::duplicate("head,head")]
    #[case::bad_slot("Head")]
    #[case::bad_type("weapon=Sword")]
    fn malformed_slots_are_reported(#[case] raw: &str) {
        let settings = ArmourySettings {
            database_url: None,
            slots: Some(raw.to_owned()),
            lock_timeout_ms: None,
            pool_max_size: None,
        };

        assert!(matches!(settings.slot_set(), Err(SettingsError::Slots(_))));
    }
}
