//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. The case-insensitive
//! unique index on `characters.name` is an expression index and has no
//! representation here.

diesel::table! {
    /// Characters with base stats that exclude equipment bonuses.
    characters (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning account.
        owner_id -> Uuid,
        /// Display name, unique ignoring case.
        name -> Varchar,
        /// Level, at least 1.
        level -> Int4,
        /// Base health.
        health -> Int4,
        /// Base mana.
        mana -> Int4,
        /// Base strength.
        strength -> Int4,
        /// Base agility.
        agility -> Int4,
        /// Base intelligence.
        intelligence -> Int4,
        /// Experience total.
        xp -> Int8,
        /// Gold total.
        gold -> Int8,
    }
}

diesel::table! {
    /// Immutable item definitions.
    items (id) {
        /// Primary key.
        id -> Uuid,
        /// Display name.
        name -> Varchar,
        /// Flavour text.
        description -> Text,
        /// Category used for slot compatibility.
        item_type -> Varchar,
        /// Carry weight.
        weight -> Int4,
        /// Trade value.
        value -> Int4,
    }
}

diesel::table! {
    /// Optional per-item stat deltas.
    item_stats (item_id) {
        /// Item the delta belongs to.
        item_id -> Uuid,
        /// Strength delta.
        strength -> Int4,
        /// Agility delta.
        agility -> Int4,
        /// Intelligence delta.
        intelligence -> Int4,
        /// Health delta.
        health -> Int4,
        /// Mana delta.
        mana -> Int4,
    }
}

diesel::table! {
    /// Owned quantities; rows with zero quantity never exist.
    inventory_entries (character_id, item_id) {
        /// Owning character.
        character_id -> Uuid,
        /// Owned item.
        item_id -> Uuid,
        /// Units held, strictly positive.
        quantity -> Int8,
    }
}

diesel::table! {
    /// Slot occupancy, one row per occupied slot.
    equipment_slots (character_id, slot) {
        /// Owning character.
        character_id -> Uuid,
        /// Slot name.
        slot -> Varchar,
        /// Occupying item.
        item_id -> Uuid,
    }
}

diesel::joinable!(item_stats -> items (item_id));
diesel::joinable!(inventory_entries -> characters (character_id));
diesel::joinable!(inventory_entries -> items (item_id));
diesel::joinable!(equipment_slots -> characters (character_id));
diesel::joinable!(equipment_slots -> items (item_id));

diesel::allow_tables_to_appear_in_same_query!(
    characters,
    items,
    item_stats,
    inventory_entries,
    equipment_slots,
);
