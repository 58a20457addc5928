//! Domain primitives, aggregates, ports, and services.
//!
//! Purpose: model characters whose effective stats are base stats plus the
//! deltas of every equipped item. Base stats are never written by equipment
//! changes; effective stats are derived on every read.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure taxonomy.
//! - Character, CharacterPatch, EffectiveCharacter: the character aggregate.
//! - InventoryLedger, EquipmentBoard, SlotSet: per-character state and slot
//!   configuration.
//! - EquipmentService, CharacterService: driving-port implementations.

pub mod character;
pub mod character_locks;
pub mod character_service;
pub mod equipment;
pub mod equipment_service;
pub mod error;
pub mod ids;
pub mod inventory;
pub mod item;
pub mod ports;
pub mod slot;
pub mod stat_aggregator;
pub mod stats;

pub use self::character::{
    CHARACTER_NAME_MAX, CHARACTER_NAME_MIN, Character, CharacterName,
    CharacterNameValidationError, CharacterPatch, EffectiveCharacter, NewCharacter,
};
pub use self::character_locks::{CharacterLocks, DEFAULT_LOCK_TIMEOUT, LockTimeout};
pub use self::character_service::CharacterService;
pub use self::equipment::EquipmentBoard;
pub use self::equipment_service::EquipmentService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{CharacterId, IdValidationError, ItemId, UserId};
pub use self::inventory::{
    InsufficientQuantity, InventoryEntry, InventoryLedger, MAX_QUANTITY, QuantityOverflow,
    checked_consume, checked_grant,
};
pub use self::item::{CatalogueEntry, Item, ItemType, ItemTypeValidationError};
pub use self::slot::{
    DEFAULT_SLOTS, EquipmentSlot, SLOT_NAME_MAX, SlotRejection, SlotSet, SlotSetParseError,
    SlotValidationError,
};
pub use self::stat_aggregator::aggregate;
pub use self::stats::{BaseStats, EffectiveStats, ItemStats, Progression};

/// Convenient domain result alias.
///
/// # Examples
/// ```
/// use armoury::domain::{DomainResult, Error};
///
/// fn lookup() -> DomainResult<u32> {
///     Err(Error::not_found("no such character"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
