//! Equipment slots and the configured slot set.
//!
//! The slot set is configuration, not a core concern: it names the legal
//! slots and, per slot, optionally restricts which item types may occupy it.
//! A slot without a restriction accepts any item.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::item::is_identifier_char;
use super::{Item, ItemType, ItemTypeValidationError};

/// Maximum length of a slot name.
pub const SLOT_NAME_MAX: usize = 32;

/// Validation errors for slot names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotValidationError {
    /// The slot name was blank.
    #[error("slot name must not be empty")]
    Empty,
    /// The slot name exceeded [`SLOT_NAME_MAX`].
    #[error("slot name must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The slot name contained unsupported characters.
    #[error("slot name may only contain lowercase letters, digits, '_' or '-'")]
    InvalidCharacters,
}

/// Named equipment position, e.g. `head` or `weapon`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EquipmentSlot(String);

impl EquipmentSlot {
    /// Validate and construct a slot name.
    pub fn new(raw: impl Into<String>) -> Result<Self, SlotValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(SlotValidationError::Empty);
        }
        if raw.chars().count() > SLOT_NAME_MAX {
            return Err(SlotValidationError::TooLong { max: SLOT_NAME_MAX });
        }
        if !raw.chars().all(is_identifier_char) {
            return Err(SlotValidationError::InvalidCharacters);
        }
        Ok(Self(raw))
    }

    /// Borrow the slot name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EquipmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EquipmentSlot {
    type Err = SlotValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<EquipmentSlot> for String {
    fn from(value: EquipmentSlot) -> Self {
        value.0
    }
}

impl TryFrom<String> for EquipmentSlot {
    type Error = SlotValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Why a slot refused an item.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotRejection {
    /// The slot is not part of the configured set.
    #[error("slot '{slot}' is not configured")]
    Unknown {
        /// The rejected slot.
        slot: EquipmentSlot,
    },
    /// The slot only accepts other item types.
    #[error("slot '{slot}' does not accept items of type '{item_type}'")]
    Incompatible {
        /// The rejected slot.
        slot: EquipmentSlot,
        /// The offending item type.
        item_type: ItemType,
    },
}

/// Errors raised while parsing a slot set specification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotSetParseError {
    /// The specification listed no slots.
    #[error("slot set must name at least one slot")]
    Empty,
    /// A slot name was invalid.
    #[error("invalid slot '{raw}': {source}")]
    Slot {
        /// The offending entry.
        raw: String,
        /// Underlying validation error.
        source: SlotValidationError,
    },
    /// An accepted item type was invalid.
    #[error("invalid item type '{raw}': {source}")]
    ItemType {
        /// The offending entry.
        raw: String,
        /// Underlying validation error.
        source: ItemTypeValidationError,
    },
    /// The same slot appeared twice.
    #[error("slot '{slot}' is listed more than once")]
    Duplicate {
        /// The repeated slot.
        slot: String,
    },
}

/// The configured set of legal slots and their item-type restrictions.
///
/// # Examples
///
/// ```
/// # use armoury::domain::SlotSet;
/// let slots: SlotSet = "head=helmet,weapon=sword|axe,ring".parse().unwrap();
/// assert_eq!(slots.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSet {
    // `None` accepts every item type.
    slots: BTreeMap<EquipmentSlot, Option<BTreeSet<ItemType>>>,
}

/// Slots used when configuration names none.
pub const DEFAULT_SLOTS: &str = "head,body,weapon,offhand,ring,amulet";

impl Default for SlotSet {
    fn default() -> Self {
        let slots = DEFAULT_SLOTS
            .split(',')
            .filter_map(|name| EquipmentSlot::new(name).ok())
            .map(|slot| (slot, None))
            .collect();
        Self { slots }
    }
}

impl SlotSet {
    /// Number of configured slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slot is configured.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether `slot` is configured.
    pub fn contains(&self, slot: &EquipmentSlot) -> bool {
        self.slots.contains_key(slot)
    }

    /// Iterate over configured slots in name order.
    pub fn slots(&self) -> impl Iterator<Item = &EquipmentSlot> {
        self.slots.keys()
    }

    /// Check that `slot` exists and accepts `item`.
    pub fn check(&self, slot: &EquipmentSlot, item: &Item) -> Result<(), SlotRejection> {
        self.check_known(slot)?;
        match self.slots.get(slot) {
            Some(Some(accepted)) if !accepted.contains(&item.item_type) => {
                Err(SlotRejection::Incompatible {
                    slot: slot.clone(),
                    item_type: item.item_type.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Check only that `slot` is configured.
    pub fn check_known(&self, slot: &EquipmentSlot) -> Result<(), SlotRejection> {
        if self.contains(slot) {
            Ok(())
        } else {
            Err(SlotRejection::Unknown { slot: slot.clone() })
        }
    }

    fn parse_entry(
        entry: &str,
    ) -> Result<(EquipmentSlot, Option<BTreeSet<ItemType>>), SlotSetParseError> {
        let (name, types) = match entry.split_once('=') {
            Some((name, types)) => (name.trim(), Some(types)),
            None => (entry, None),
        };
        let slot = EquipmentSlot::new(name).map_err(|source| SlotSetParseError::Slot {
            raw: name.to_owned(),
            source,
        })?;
        let accepted = types
            .map(|types| {
                types
                    .split('|')
                    .map(str::trim)
                    .map(|raw| {
                        ItemType::new(raw).map_err(|source| SlotSetParseError::ItemType {
                            raw: raw.to_owned(),
                            source,
                        })
                    })
                    .collect::<Result<BTreeSet<_>, _>>()
            })
            .transpose()?;
        Ok((slot, accepted))
    }
}

impl std::str::FromStr for SlotSet {
    type Err = SlotSetParseError;

    /// Parse `slot[=type|type],...`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut slots = BTreeMap::new();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (slot, accepted) = Self::parse_entry(entry)?;
            if slots.contains_key(&slot) {
                return Err(SlotSetParseError::Duplicate {
                    slot: slot.to_string(),
                });
            }
            slots.insert(slot, accepted);
        }
        if slots.is_empty() {
            return Err(SlotSetParseError::Empty);
        }
        Ok(Self { slots })
    }
}
