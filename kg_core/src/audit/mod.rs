//! Audit - check graphs against each other and against a full recount.
//!
//! Everything here goes through the public query API only, so the same
//! checks apply to independently built, merged or batch-vs-single graphs.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::error::KgResult;
use crate::knowledge_base::{KnowledgeGraph, SchemaPattern};

/// Aspect-by-aspect equality of two graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphComparison {
    pub entities_equal: bool,
    pub attribute_triples_equal: bool,
    /// Compared as sets; insertion order is ignored.
    pub relation_quadruples_equal: bool,
    pub relations_equal: bool,
    pub ontology_equal: bool,
}

impl GraphComparison {
    /// Check if every aspect matched.
    pub fn is_identical(&self) -> bool {
        self.entities_equal
            && self.attribute_triples_equal
            && self.relation_quadruples_equal
            && self.relations_equal
            && self.ontology_equal
    }
}

/// Compare two graphs.
pub fn compare(first: &KnowledgeGraph, second: &KnowledgeGraph) -> KgResult<GraphComparison> {
    let first_quads: HashSet<_> = first.relation_quadruples(None, None)?.into_iter().collect();
    let second_quads: HashSet<_> = second.relation_quadruples(None, None)?.into_iter().collect();

    let comparison = GraphComparison {
        entities_equal: first.entities() == second.entities(),
        attribute_triples_equal: first.attribute_triples(None)? == second.attribute_triples(None)?,
        relation_quadruples_equal: first_quads == second_quads,
        relations_equal: first.relations() == second.relations(),
        ontology_equal: first.ontology() == second.ontology(),
    };
    debug!(?comparison, "Compared knowledge graphs");
    Ok(comparison)
}

/// A pattern whose tracked count differs from the recount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDrift {
    pub pattern: SchemaPattern,
    pub tracked: i64,
    pub recounted: i64,
}

/// Result of checking the tracked ontology against a full recount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyAudit {
    /// Drifting patterns, sorted by rendered pattern.
    pub drifts: Vec<PatternDrift>,
}

impl OntologyAudit {
    pub fn is_consistent(&self) -> bool {
        self.drifts.is_empty()
    }
}

/// Recount the ontology and report every pattern where it disagrees with
/// the tracked one.
///
/// Disagreement is expected only when tail entities changed type under
/// the default tail type policy.
///
/// # Errors
///
/// `KgError::MissingType` if any edge endpoint is untyped.
pub fn audit_ontology(graph: &KnowledgeGraph) -> KgResult<OntologyAudit> {
    let tracked = graph.ontology();
    let recounted = graph.recompute_ontology()?;

    let patterns: HashSet<&SchemaPattern> = tracked
        .iter()
        .chain(recounted.iter())
        .map(|(pattern, _)| pattern)
        .collect();

    let mut drifts: Vec<PatternDrift> = patterns
        .into_iter()
        .filter_map(|pattern| {
            let drift = PatternDrift {
                pattern: pattern.clone(),
                tracked: tracked.count(pattern),
                recounted: recounted.count(pattern),
            };
            (drift.tracked != drift.recounted).then_some(drift)
        })
        .collect();
    drifts.sort_by_cached_key(|drift| drift.pattern.to_string());

    if !drifts.is_empty() {
        warn!(patterns = drifts.len(), "Tracked ontology drifted from recount");
    }
    Ok(OntologyAudit { drifts })
}
