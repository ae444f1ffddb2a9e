//! Ontology - the multiset of schema patterns observed on a graph's edges.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::warn;

use super::SchemaPattern;

/// Signed count per distinct schema pattern.
///
/// Patterns whose count reaches zero are removed, so two ontologies
/// compare equal exactly when they are equal as multisets. A count can go
/// negative when a type change decrements a pattern no edge was counted
/// under, which happens after a tail entity changed type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ontology {
    counts: HashMap<SchemaPattern, i64>,
}

impl Ontology {
    /// Create an empty ontology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count tracked for `pattern`, zero when absent.
    pub fn count(&self, pattern: &SchemaPattern) -> i64 {
        self.counts.get(pattern).copied().unwrap_or(0)
    }

    /// Number of distinct patterns.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts. Equals the number of edges, since every type
    /// change moves exactly one count per edge.
    pub fn total(&self) -> i64 {
        self.counts.values().sum()
    }

    /// Iterate over `(pattern, count)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&SchemaPattern, i64)> {
        self.counts.iter().map(|(pattern, count)| (pattern, *count))
    }

    /// Pairs sorted by rendered pattern, for stable output.
    pub fn sorted(&self) -> Vec<(&SchemaPattern, i64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by_cached_key(|(pattern, _)| pattern.to_string());
        entries
    }

    /// Add one occurrence of `pattern`.
    pub fn increment(&mut self, pattern: SchemaPattern) {
        adjust(&mut self.counts, pattern, 1);
    }

    /// Apply a batch of signed changes.
    pub fn apply(&mut self, delta: OntologyDelta) {
        for (pattern, change) in delta.changes {
            let current = self.count(&pattern);
            if current + change < 0 {
                warn!(%pattern, current, change, "Ontology count went negative");
            }
            adjust(&mut self.counts, pattern, change);
        }
    }
}

impl FromIterator<SchemaPattern> for Ontology {
    fn from_iter<I: IntoIterator<Item = SchemaPattern>>(iter: I) -> Self {
        let mut ontology = Ontology::new();
        for pattern in iter {
            ontology.increment(pattern);
        }
        ontology
    }
}

/// Pending signed changes to an ontology, collected over one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OntologyDelta {
    changes: HashMap<SchemaPattern, i64>,
}

impl OntologyDelta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one new occurrence of `pattern`.
    pub fn increment(&mut self, pattern: SchemaPattern) {
        adjust(&mut self.changes, pattern, 1);
    }

    /// Record one edge moving from `old` to `new`. No-op when equal.
    pub fn record_move(&mut self, old: SchemaPattern, new: SchemaPattern) {
        if old != new {
            adjust(&mut self.changes, old, -1);
            adjust(&mut self.changes, new, 1);
        }
    }

    /// Check if the delta has no net effect.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Add `change` to the count of `pattern`, dropping it when it reaches zero.
fn adjust(counts: &mut HashMap<SchemaPattern, i64>, pattern: SchemaPattern, change: i64) {
    match counts.entry(pattern) {
        Entry::Occupied(mut entry) => {
            *entry.get_mut() += change;
            if *entry.get() == 0 {
                entry.remove();
            }
        }
        Entry::Vacant(entry) => {
            if change != 0 {
                entry.insert(change);
            }
        }
    }
}
