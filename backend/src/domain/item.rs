//! Catalogue item definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ItemId, ItemStats};

/// Validation errors for item types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemTypeValidationError {
    /// The type was blank.
    #[error("item type must not be empty")]
    Empty,
    /// The type contained characters other than lowercase ASCII letters,
    /// digits, `_`, or `-`.
    #[error("item type may only contain lowercase letters, digits, '_' or '-'")]
    InvalidCharacters,
}

/// Lowercase item category such as `weapon`, `helmet`, or `quest`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemType(String);

impl ItemType {
    /// Validate and construct an item type.
    pub fn new(raw: impl Into<String>) -> Result<Self, ItemTypeValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ItemTypeValidationError::Empty);
        }
        if !raw.chars().all(is_identifier_char) {
            return Err(ItemTypeValidationError::InvalidCharacters);
        }
        Ok(Self(raw))
    }

    /// Borrow the type as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

pub(crate) fn is_identifier_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ItemType> for String {
    fn from(value: ItemType) -> Self {
        value.0
    }
}

impl TryFrom<String> for ItemType {
    type Error = ItemTypeValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Immutable catalogue item definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Catalogue identifier.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Flavour text.
    pub description: String,
    /// Category used for slot compatibility.
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Carry weight.
    pub weight: u32,
    /// Trade value in gold.
    pub value: u32,
}

/// One catalogue record as loaded from a seed file: the item plus its
/// optional stat delta.
///
/// # Examples
///
/// ```
/// # use armoury::domain::CatalogueEntry;
/// let json = r#"{
///     "id": "22222222-2222-2222-2222-222222222222",
///     "name": "Iron Sword",
///     "description": "Plain but sharp.",
///     "type": "weapon",
///     "weight": 6,
///     "value": 40,
///     "stats": { "strength": 5 }
/// }"#;
/// let entry: CatalogueEntry = serde_json::from_str(json).unwrap();
/// assert_eq!(entry.stats.map(|s| s.strength), Some(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueEntry {
    /// The item definition.
    #[serde(flatten)]
    pub item: Item,
    /// Stat delta, absent for items without combat effect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<ItemStats>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty("", ItemTypeValidationError::Empty)]
    #[case::uppercase("Weapon", ItemTypeValidationError::InvalidCharacters)]
    #[case::space("two handed", ItemTypeValidationError::InvalidCharacters)]
    fn item_type_rejects_invalid_input(
        #[case] raw: &str,
        #[case] expected: ItemTypeValidationError,
    ) {
        assert_eq!(ItemType::new(raw), Err(expected));
    }

    #[rstest]
    fn catalogue_entry_without_stats_parses() {
        let json = r#"{
            "id": "33333333-3333-3333-3333-333333333333",
            "name": "Old Key",
            "description": "Opens something.",
            "type": "quest",
            "weight": 0,
            "value": 0
        }"#;
        let entry: CatalogueEntry = serde_json::from_str(json).expect("entry parses");
        assert!(entry.stats.is_none());
        assert_eq!(entry.item.item_type.as_str(), "quest");
    }
}
