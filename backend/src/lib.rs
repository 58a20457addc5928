//! Character equipment and stat aggregation engine.
//!
//! The crate is a hexagonal modular monolith: `domain` holds the types,
//! ports, and services; `outbound` holds storage adapters; `inbound` holds
//! the command-line driving adapter.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
