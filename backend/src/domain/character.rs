//! Character aggregate and its partial-update value object.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{BaseStats, CharacterId, EffectiveStats, Progression, UserId};

/// Minimum allowed length for a character name.
pub const CHARACTER_NAME_MIN: usize = 3;
/// Maximum allowed length for a character name.
pub const CHARACTER_NAME_MAX: usize = 24;

/// Validation errors for character names.
///
/// These cover the format only; uniqueness and content policy belong to the
/// pluggable [`crate::domain::ports::NameValidator`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CharacterNameValidationError {
    /// The name was blank.
    #[error("character name must not be empty")]
    Empty,
    /// Leading or trailing whitespace.
    #[error("character name must not start or end with whitespace")]
    Untrimmed,
    /// Shorter than [`CHARACTER_NAME_MIN`].
    #[error("character name must be at least {min} characters")]
    TooShort {
        /// Minimum length.
        min: usize,
    },
    /// Longer than [`CHARACTER_NAME_MAX`].
    #[error("character name must be at most {max} characters")]
    TooLong {
        /// Maximum length.
        max: usize,
    },
    /// Contains characters other than letters, digits, spaces, `_`, or `-`.
    #[error("character name may only contain letters, digits, spaces, '_' or '-'")]
    InvalidCharacters,
}

/// Display name of a character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CharacterName(String);

impl CharacterName {
    /// Validate and construct a character name.
    pub fn new(raw: impl Into<String>) -> Result<Self, CharacterNameValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(CharacterNameValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(CharacterNameValidationError::Untrimmed);
        }
        let length = raw.chars().count();
        if length < CHARACTER_NAME_MIN {
            return Err(CharacterNameValidationError::TooShort {
                min: CHARACTER_NAME_MIN,
            });
        }
        if length > CHARACTER_NAME_MAX {
            return Err(CharacterNameValidationError::TooLong {
                max: CHARACTER_NAME_MAX,
            });
        }
        let allowed = |c: char| c.is_alphanumeric() || c == ' ' || c == '_' || c == '-';
        if !raw.chars().all(allowed) {
            return Err(CharacterNameValidationError::InvalidCharacters);
        }
        Ok(Self(raw))
    }

    /// Borrow the name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for CharacterName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CharacterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CharacterName> for String {
    fn from(value: CharacterName) -> Self {
        value.0
    }
}

impl TryFrom<String> for CharacterName {
    type Error = CharacterNameValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Persistent RPG character.
///
/// `base` excludes every equipment bonus. Equip and unequip never write it;
/// only [`CharacterPatch`] updates do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    /// Character identifier.
    pub id: CharacterId,
    /// Owning account.
    pub owner_id: UserId,
    /// Unique display name.
    pub name: CharacterName,
    /// Attributes without equipment.
    pub base: BaseStats,
    /// Experience and gold.
    pub progression: Progression,
}

impl Character {
    /// Create a level-one character with default stats.
    pub fn new(owner_id: UserId, name: CharacterName) -> Self {
        Self {
            id: CharacterId::random(),
            owner_id,
            name,
            base: BaseStats::default(),
            progression: Progression::default(),
        }
    }

    /// Apply every present field of `patch`.
    pub fn apply(&mut self, patch: &CharacterPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        let base = &mut self.base;
        patch.level.inspect(|v| base.level = *v);
        patch.health.inspect(|v| base.health = *v);
        patch.mana.inspect(|v| base.mana = *v);
        patch.strength.inspect(|v| base.strength = *v);
        patch.agility.inspect(|v| base.agility = *v);
        patch.intelligence.inspect(|v| base.intelligence = *v);
        let progression = &mut self.progression;
        patch.xp.inspect(|v| progression.xp = *v);
        patch.gold.inspect(|v| progression.gold = *v);
    }
}

/// Request to create a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCharacter {
    /// Owning account.
    pub owner_id: UserId,
    /// Requested name, validated before the name validator runs.
    pub name: String,
    /// Starting attributes; defaults apply when absent.
    #[serde(default)]
    pub base: Option<BaseStats>,
}

/// Partial update of a character; absent fields are left untouched.
///
/// # Examples
///
/// ```
/// # use armoury::domain::{Character, CharacterName, CharacterPatch, UserId};
/// let mut hero = Character::new(UserId::random(), CharacterName::new("Aldric").unwrap());
/// let patch = CharacterPatch::default().level(2).strength(12);
/// hero.apply(&patch);
/// assert_eq!(hero.base.level, 2);
/// assert_eq!(hero.base.strength, 12);
/// assert_eq!(hero.base.mana, 50);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterPatch {
    /// New name.
    pub name: Option<CharacterName>,
    /// New level.
    pub level: Option<u32>,
    /// New base health.
    pub health: Option<i32>,
    /// New base mana.
    pub mana: Option<i32>,
    /// New base strength.
    pub strength: Option<i32>,
    /// New base agility.
    pub agility: Option<i32>,
    /// New base intelligence.
    pub intelligence: Option<i32>,
    /// New experience total.
    pub xp: Option<u64>,
    /// New gold total.
    pub gold: Option<u64>,
}

macro_rules! patch_setters {
    ($($field:ident: $ty:ty),* $(,)?) => {
        impl CharacterPatch {
            $(
                #[doc = concat!("Set `", stringify!($field), "`.")]
                #[must_use]
                pub fn $field(mut self, value: $ty) -> Self {
                    self.$field = Some(value);
                    self
                }
            )*
        }
    };
}

patch_setters!(
    name: CharacterName,
    level: u32,
    health: i32,
    mana: i32,
    strength: i32,
    agility: i32,
    intelligence: i32,
    xp: u64,
    gold: u64,
);

impl CharacterPatch {
    /// Whether no field is present.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Character view whose stats include equipment bonuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveCharacter {
    /// Character identifier.
    pub id: CharacterId,
    /// Owning account.
    pub owner_id: UserId,
    /// Display name.
    pub name: CharacterName,
    /// Base stats plus every equipped item's delta.
    pub stats: EffectiveStats,
    /// Experience and gold.
    pub progression: Progression,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty("  ", CharacterNameValidationError::Empty)]
    #[case::untrimmed(" Aldric", CharacterNameValidationError::Untrimmed)]
    #[case::short("Al", CharacterNameValidationError::TooShort { min: CHARACTER_NAME_MIN })]
    #[case::long(
        "Aldric the Unnecessarily Long",
        CharacterNameValidationError::TooLong { max: CHARACTER_NAME_MAX }
    )]
    #[case::symbols("Al$ric", CharacterNameValidationError::InvalidCharacters)]
    fn name_rejects_invalid_input(
        #[case] raw: &str,
        #[case] expected: CharacterNameValidationError,
    ) {
        assert_eq!(CharacterName::new(raw), Err(expected));
    }

    #[rstest]
    #[case("Aldric")]
    #[case("Mira_the-Bold 2")]
    fn name_accepts_valid_input(#[case] raw: &str) {
        assert_eq!(CharacterName::new(raw).expect("valid").as_str(), raw);
    }

    #[rstest]
    fn empty_patch_changes_nothing() {
        let name = CharacterName::new("Aldric").expect("valid name");
        let mut hero = Character::new(UserId::random(), name);
        let before = hero.clone();

        hero.apply(&CharacterPatch::default());

        assert_eq!(hero, before);
        assert!(CharacterPatch::default().is_empty());
    }

    #[rstest]
    fn patch_updates_progression_and_name() {
        let mut hero = Character::new(
            UserId::random(),
            CharacterName::new("Aldric").expect("valid name"),
        );
        let renamed = CharacterName::new("Aldric II").expect("valid name");
        let patch = CharacterPatch::default()
            .name(renamed.clone())
            .xp(120)
            .gold(7);

        hero.apply(&patch);

        assert_eq!(hero.name, renamed);
        assert_eq!(hero.progression, Progression { xp: 120, gold: 7 });
    }

    #[rstest]
    fn patch_deserialises_missing_fields_as_absent() {
        let patch: CharacterPatch =
            serde_json::from_str(r#"{"mana": 80}"#).expect("patch parses");
        assert_eq!(patch, CharacterPatch::default().mana(80));
    }
}
