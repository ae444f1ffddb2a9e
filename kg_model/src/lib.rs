//! # KG Model
//!
//! Value-level data model shared by the knowledge graph engine: entity ids,
//! attribute values, attribute triples, relation quadruples, ingestion rows
//! and tracker configuration. This crate holds no graph state.

pub mod config;
pub mod entities;
pub mod records;
pub mod values;

pub use config::*;
pub use entities::*;
pub use records::*;
pub use values::*;
