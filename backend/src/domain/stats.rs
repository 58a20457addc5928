//! Character attributes and item stat deltas.
//!
//! [`BaseStats`] are a character's attributes excluding equipment.
//! [`ItemStats`] are the signed deltas an equipped item contributes, and
//! [`EffectiveStats`] is the derived sum of the two. Effective stats are never
//! stored; see [`crate::domain::stat_aggregator`].

use std::iter::Sum;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Attributes of a character independent of currently equipped items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseStats {
    /// Character level.
    pub level: u32,
    /// Hit points.
    pub health: i32,
    /// Mana pool.
    pub mana: i32,
    /// Physical power.
    pub strength: i32,
    /// Speed and evasion.
    pub agility: i32,
    /// Spell power.
    pub intelligence: i32,
}

impl Default for BaseStats {
    fn default() -> Self {
        Self {
            level: 1,
            health: 100,
            mana: 50,
            strength: 10,
            agility: 10,
            intelligence: 10,
        }
    }
}

/// Experience and currency counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progression {
    /// Accumulated experience points.
    pub xp: u64,
    /// Gold carried.
    pub gold: u64,
}

/// Immutable per-item stat delta.
///
/// Zero-valued fields contribute nothing. A catalogue item without a stats
/// record behaves exactly like [`ItemStats::ZERO`].
///
/// # Examples
///
/// ```
/// # use armoury::domain::ItemStats;
/// let sword = ItemStats { strength: 5, ..ItemStats::ZERO };
/// let axe = ItemStats { strength: 8, agility: -1, ..ItemStats::ZERO };
///
/// assert_eq!((axe - sword).strength, 3);
/// assert_eq!([sword, axe].into_iter().sum::<ItemStats>().strength, 13);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemStats {
    /// Strength delta.
    pub strength: i32,
    /// Agility delta.
    pub agility: i32,
    /// Intelligence delta.
    pub intelligence: i32,
    /// Health delta.
    pub health: i32,
    /// Mana delta.
    pub mana: i32,
}

impl ItemStats {
    /// The delta that contributes nothing.
    pub const ZERO: Self = Self {
        strength: 0,
        agility: 0,
        intelligence: 0,
        health: 0,
        mana: 0,
    };

    /// Whether every field is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Add for ItemStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            strength: self.strength.saturating_add(rhs.strength),
            agility: self.agility.saturating_add(rhs.agility),
            intelligence: self.intelligence.saturating_add(rhs.intelligence),
            health: self.health.saturating_add(rhs.health),
            mana: self.mana.saturating_add(rhs.mana),
        }
    }
}

impl Neg for ItemStats {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            strength: self.strength.saturating_neg(),
            agility: self.agility.saturating_neg(),
            intelligence: self.intelligence.saturating_neg(),
            health: self.health.saturating_neg(),
            mana: self.mana.saturating_neg(),
        }
    }
}

impl Sub for ItemStats {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Sum for ItemStats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Displayed attributes: base stats plus the bonuses of all equipped items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveStats {
    /// Character level; equipment never changes it.
    pub level: u32,
    /// Hit points including bonuses.
    pub health: i32,
    /// Mana including bonuses.
    pub mana: i32,
    /// Strength including bonuses.
    pub strength: i32,
    /// Agility including bonuses.
    pub agility: i32,
    /// Intelligence including bonuses.
    pub intelligence: i32,
}

impl EffectiveStats {
    /// Combine base stats with an aggregated equipment bonus.
    pub fn from_parts(base: &BaseStats, bonus: ItemStats) -> Self {
        Self {
            level: base.level,
            health: base.health.saturating_add(bonus.health),
            mana: base.mana.saturating_add(bonus.mana),
            strength: base.strength.saturating_add(bonus.strength),
            agility: base.agility.saturating_add(bonus.agility),
            intelligence: base.intelligence.saturating_add(bonus.intelligence),
        }
    }
}
