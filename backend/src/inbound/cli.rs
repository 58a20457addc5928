//! Command-line driving adapter.
//!
//! Parses `armoury` subcommands with clap and forwards the character-facing
//! ones to the driving ports. Results render as JSON so scripts can consume
//! them; domain failures keep their structured details.

use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;

use crate::domain::ports::{
    CharacterCommand, CharacterQuery, EquipRequest, EquipmentCommand, InventoryCommand,
    UnequipRequest,
};
use crate::domain::{
    BaseStats, CharacterId, CharacterName, CharacterPatch, EquipmentSlot, Error, ItemId,
    NewCharacter, UserId,
};

/// `armoury` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "armoury",
    about = "Manage character equipment, inventories, and derived stats",
    version
)]
pub struct Cli {
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Apply pending database migrations.
    Migrate,
    /// Load catalogue entries from a JSON file.
    SeedCatalogue {
        /// Path to a JSON array of catalogue entries.
        #[arg(long, value_name = "path")]
        file: PathBuf,
    },
    /// Character operations served by the domain services.
    #[command(flatten)]
    Character(CharacterAction),
}

/// Subcommands that go through the driving ports.
#[derive(Debug, Clone, Subcommand)]
pub enum CharacterAction {
    /// Create a character.
    CreateCharacter {
        /// Owning account.
        #[arg(long, value_name = "uuid")]
        owner: UserId,
        /// Display name.
        #[arg(long, value_parser = parse_name)]
        name: CharacterName,
        /// Starting attributes.
        #[command(flatten)]
        base: BaseStatArgs,
    },
    /// Change a character's name, base stats, or progression.
    UpdateCharacter {
        /// Character to update.
        #[arg(long, value_name = "uuid")]
        character: CharacterId,
        /// New display name.
        #[arg(long, value_parser = parse_name)]
        name: Option<CharacterName>,
        /// Attribute overrides.
        #[command(flatten)]
        base: BaseStatArgs,
        /// New experience total.
        #[arg(long)]
        xp: Option<u64>,
        /// New gold total.
        #[arg(long)]
        gold: Option<u64>,
    },
    /// Print a character with effective stats.
    Show {
        /// Character to show.
        #[arg(long, value_name = "uuid")]
        character: CharacterId,
    },
    /// List equipped items.
    Equipment {
        /// Character to inspect.
        #[arg(long, value_name = "uuid")]
        character: CharacterId,
    },
    /// List inventory entries.
    Inventory {
        /// Character to inspect.
        #[arg(long, value_name = "uuid")]
        character: CharacterId,
    },
    /// Equip an owned item into a slot.
    Equip {
        /// Character to equip.
        #[arg(long, value_name = "uuid")]
        character: CharacterId,
        /// Item to equip.
        #[arg(long, value_name = "uuid")]
        item: ItemId,
        /// Target slot.
        #[arg(long)]
        slot: EquipmentSlot,
    },
    /// Empty a slot.
    Unequip {
        /// Character to unequip.
        #[arg(long, value_name = "uuid")]
        character: CharacterId,
        /// Slot to clear.
        #[arg(long)]
        slot: EquipmentSlot,
    },
    /// Add units of an item to an inventory.
    Grant {
        /// Receiving character.
        #[arg(long, value_name = "uuid")]
        character: CharacterId,
        /// Item to grant.
        #[arg(long, value_name = "uuid")]
        item: ItemId,
        /// Units to add.
        #[arg(long, default_value = "1")]
        quantity: NonZeroU32,
    },
    /// Remove unreserved units of an item from an inventory.
    Consume {
        /// Owning character.
        #[arg(long, value_name = "uuid")]
        character: CharacterId,
        /// Item to consume.
        #[arg(long, value_name = "uuid")]
        item: ItemId,
        /// Units to remove.
        #[arg(long, default_value = "1")]
        quantity: NonZeroU32,
    },
}

/// Optional attribute flags shared by create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct BaseStatArgs {
    /// Character level.
    #[arg(long)]
    pub level: Option<u32>,
    /// Hit points.
    #[arg(long)]
    pub health: Option<i32>,
    /// Mana pool.
    #[arg(long)]
    pub mana: Option<i32>,
    /// Physical power.
    #[arg(long)]
    pub strength: Option<i32>,
    /// Speed and evasion.
    #[arg(long)]
    pub agility: Option<i32>,
    /// Spell power.
    #[arg(long)]
    pub intelligence: Option<i32>,
}

impl BaseStatArgs {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Defaults overridden by any flag present, or `None` when no flag is.
    fn into_base(self) -> Option<BaseStats> {
        if self.is_empty() {
            return None;
        }
        let defaults = BaseStats::default();
        Some(BaseStats {
            level: self.level.unwrap_or(defaults.level),
            health: self.health.unwrap_or(defaults.health),
            mana: self.mana.unwrap_or(defaults.mana),
            strength: self.strength.unwrap_or(defaults.strength),
            agility: self.agility.unwrap_or(defaults.agility),
            intelligence: self.intelligence.unwrap_or(defaults.intelligence),
        })
    }
}

fn parse_name(raw: &str) -> Result<CharacterName, String> {
    CharacterName::new(raw).map_err(|error| error.to_string())
}

/// Driving ports used by [`dispatch`].
#[derive(Clone)]
pub struct Services {
    /// Character creation and updates.
    pub characters: Arc<dyn CharacterCommand>,
    /// Equip and unequip.
    pub equipment: Arc<dyn EquipmentCommand>,
    /// Grant and consume.
    pub inventory: Arc<dyn InventoryCommand>,
    /// Read models.
    pub query: Arc<dyn CharacterQuery>,
}

/// Failures raised by [`dispatch`].
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The domain rejected the operation.
    #[error("{0}")]
    Domain(#[from] Error),
    /// The result could not be rendered.
    #[error("failed to render result: {0}")]
    Render(#[from] serde_json::Error),
}

fn render<T: Serialize>(value: &T) -> Result<Value, DispatchError> {
    Ok(serde_json::to_value(value)?)
}

/// Run `action` against `services` and render the result as JSON.
///
/// # Errors
///
/// Returns [`DispatchError::Domain`] with the service error unchanged.
pub async fn dispatch(action: CharacterAction, services: &Services) -> Result<Value, DispatchError> {
    match action {
        CharacterAction::CreateCharacter { owner, name, base } => {
            let request = NewCharacter {
                owner_id: owner,
                name: name.into(),
                base: base.into_base(),
            };
            render(&services.characters.create_character(request).await?)
        }
        CharacterAction::UpdateCharacter {
            character,
            name,
            base,
            xp,
            gold,
        } => {
            let patch = CharacterPatch {
                name,
                level: base.level,
                health: base.health,
                mana: base.mana,
                strength: base.strength,
                agility: base.agility,
                intelligence: base.intelligence,
                xp,
                gold,
            };
            render(&services.characters.update_character(&character, patch).await?)
        }
        CharacterAction::Show { character } => {
            render(&services.query.get_effective_character(&character).await?)
        }
        CharacterAction::Equipment { character } => {
            render(&services.query.get_equipment(&character).await?)
        }
        CharacterAction::Inventory { character } => {
            render(&services.query.get_inventory(&character).await?)
        }
        CharacterAction::Equip {
            character,
            item,
            slot,
        } => {
            let request = EquipRequest {
                character_id: character,
                item_id: item,
                slot,
            };
            render(&services.equipment.equip(request).await?)
        }
        CharacterAction::Unequip { character, slot } => {
            let request = UnequipRequest {
                character_id: character,
                slot,
            };
            render(&services.equipment.unequip(request).await?)
        }
        CharacterAction::Grant {
            character,
            item,
            quantity,
        } => {
            let total = services
                .inventory
                .grant_item(&character, &item, quantity)
                .await?;
            render(&serde_json::json!({ "itemId": item, "quantity": total }))
        }
        CharacterAction::Consume {
            character,
            item,
            quantity,
        } => {
            let remaining = services
                .inventory
                .consume_item(&character, &item, quantity)
                .await?;
            render(&serde_json::json!({ "itemId": item, "quantity": remaining }))
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
