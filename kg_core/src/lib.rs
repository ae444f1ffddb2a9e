//! # KG Core
//!
//! An in-memory, mutable multi-relational knowledge graph built from streamed
//! attribute triples and relation quadruples. Alongside the graph it keeps a
//! derived schema, the ontology: how many edges match each
//! `(head type, relation, tail type)` pattern.
//!
//! ## Core Components
//!
//! - **knowledge_base**: The graph store and the incremental ontology tracker
//! - **merge**: Combines two graphs by replaying one onto a copy of the other
//! - **audit**: Compares graphs and checks the tracked ontology against a recount
//!
//! ## Design Philosophy
//!
//! - **Incremental**: The ontology is updated by deltas on every add, never recomputed in steady state
//! - **Owned State**: A graph is a plain value passed by reference; there is no global store
//! - **Append Only**: Triples and quadruples are upserted, never deleted

pub mod audit;
pub mod error;
pub mod knowledge_base;
pub mod merge;

pub use audit::*;
pub use error::*;
pub use knowledge_base::*;
pub use merge::*;
