//! Merge - combine two knowledge graphs into a new one.
//!
//! The merge is not a structural union of the two graphs. The first graph is
//! cloned and the second graph's data is replayed through the clone's normal
//! add operations, so every type change re-triggers ontology maintenance:
//!
//! 1. **Clone**: deep copy of `first`, sharing nothing with either input
//! 2. **Attributes**: all of `second`'s attribute triples, in entity order
//! 3. **Relations**: all of `second`'s relation quadruples, in insertion order
//!
//! On conflicting attribute values or edge attribute maps, `second` wins.

use tracing::info;

use crate::error::{KgError, KgResult};
use crate::knowledge_base::KnowledgeGraph;

/// Merge `second` into a copy of `first`.
///
/// # Errors
///
/// `KgError::ConfigMismatch` if the graphs were built with different
/// ontology configs.
pub fn merge(first: &KnowledgeGraph, second: &KnowledgeGraph) -> KgResult<KnowledgeGraph> {
    if first.config() != second.config() {
        return Err(KgError::ConfigMismatch);
    }

    let mut merged = first.clone();
    merged.add_attribute_triples(second.attribute_triple_list());
    merged.add_relation_quadruples(second.relation_quadruples(None, None)?);

    info!(
        entities = merged.entity_count(),
        edges = merged.edge_count(),
        patterns = merged.ontology().len(),
        "Merged knowledge graphs"
    );
    Ok(merged)
}
