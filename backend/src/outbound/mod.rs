//! Outbound adapters implementing the driven ports.
//!
//! - **memory**: a process-local store used by tests and demos
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//!
//! Adapters are thin translators between domain types and storage
//! representations. They contain no equip or inventory rules.

pub mod memory;
pub mod persistence;
