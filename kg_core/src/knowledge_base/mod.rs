//! Knowledge Base module - the graph store and its ontology tracker.
//!
//! The knowledge graph consists of:
//! - **Entities**: Nodes carrying an attribute map, one of which is the type
//! - **Edges**: Directed relations keyed by `(head, relation, tail)`
//! - **Ontology**: Counts of `(head type, relation, tail type)` over all edges

mod edge;
mod graph;
mod ontology;
mod pattern;
mod tracker;

pub use edge::EdgeKey;
pub use graph::*;
pub use ontology::*;
pub use pattern::*;
