//! Ontology maintenance - keeps the tracked ontology in step with the graph.
//!
//! 1. **New edge**: counts the pattern of its endpoints' current types.
//! 2. **Re-added edge**: replaces the attribute map; the ontology is untouched.
//! 3. **Type change**: for every edge leaving the entity, the pattern
//!    `(old type, relation, tail type)` loses one count and
//!    `(new type, relation, tail type)` gains one.
//!
//! Under the default [`TailTypePolicy::Ignore`] a batch of attribute triples
//! is resolved against the graph as it was before the batch: old types and
//! tail types are read first, the attributes are written, then the delta is
//! applied. Edges entering a re-typed entity are not corrected, so the
//! tracked ontology may differ from [`KnowledgeGraph::recompute_ontology`],
//! and a pattern whose edges moved away through such a tail can even go
//! negative.
//!
//! [`TailTypePolicy::Reconcile`] instead keeps every edge counted under its
//! endpoints' current types, incoming edges included.

use std::collections::HashMap;

use kg_model::{AttributeTriple, AttributeValue, Entity, TailTypePolicy};
use tracing::{debug, info};

use super::{KnowledgeGraph, Ontology, OntologyDelta, SchemaPattern, TypeLabel};
use crate::error::{KgError, KgResult};

impl KnowledgeGraph {
    /// Write a batch of attribute triples and return the ontology changes
    /// they cause.
    pub(super) fn on_attribute_triples_added(&mut self, triples: Vec<AttributeTriple>) -> OntologyDelta {
        match self.config.tail_type_policy {
            TailTypePolicy::Ignore => {
                let delta = self.head_type_changes(&triples);
                for triple in triples {
                    self.entity_entry(triple.entity).insert(triple.attribute, triple.value);
                }
                delta
            }
            TailTypePolicy::Reconcile => {
                let mut delta = OntologyDelta::new();
                for triple in triples {
                    if triple.attribute == self.config.type_attribute {
                        self.reconcile_type_change(&triple.entity, &triple.value, &mut delta);
                    }
                    self.entity_entry(triple.entity).insert(triple.attribute, triple.value);
                }
                delta
            }
        }
    }

    /// Moves for every outgoing edge of every entity re-typed by `triples`,
    /// read from the graph before any triple is written.
    ///
    /// An entity typed several times in one batch moves once, from its type
    /// before the batch to the last type in the batch.
    fn head_type_changes(&self, triples: &[AttributeTriple]) -> OntologyDelta {
        let mut new_types: HashMap<&Entity, &AttributeValue> = HashMap::new();
        for triple in triples {
            // new entities have no edges yet
            if triple.attribute == self.config.type_attribute && self.contains_entity(&triple.entity) {
                new_types.insert(&triple.entity, &triple.value);
            }
        }

        let mut delta = OntologyDelta::new();
        for (entity, value) in new_types {
            let old_type = self.entity_type(entity);
            let new_type = TypeLabel::Known(value.clone());
            if old_type == new_type {
                continue;
            }

            let mut edges = 0usize;
            for slot in self.outgoing_slots(entity) {
                let tail_type = self.entity_type(&slot.key.tail);
                delta.record_move(
                    SchemaPattern::new(old_type.clone(), slot.key.relation.clone(), tail_type.clone()),
                    SchemaPattern::new(new_type.clone(), slot.key.relation.clone(), tail_type),
                );
                edges += 1;
            }
            if edges > 0 {
                debug!(%entity, %old_type, %new_type, edges, "Head type change moves ontology patterns");
            }
        }
        delta
    }

    /// Move every edge touching `entity` from the pattern of the current
    /// types to the pattern with `entity` re-typed to `value`.
    ///
    /// Runs before the attribute is overwritten, so the current type is the
    /// old one.
    fn reconcile_type_change(&self, entity: &Entity, value: &AttributeValue, delta: &mut OntologyDelta) {
        if !self.contains_entity(entity) {
            return;
        }
        let new_type = TypeLabel::Known(value.clone());
        if self.entity_type(entity) == new_type {
            return;
        }

        let mut affected: Vec<usize> = self.outgoing.get(entity).cloned().unwrap_or_default();
        for &position in self.incoming.get(entity).into_iter().flatten() {
            // self-loops are already listed as outgoing
            if self.edges[position].key.head != *entity {
                affected.push(position);
            }
        }

        let retyped = |endpoint: &Entity| {
            if endpoint == entity {
                new_type.clone()
            } else {
                self.entity_type(endpoint)
            }
        };
        for &position in &affected {
            let key = &self.edges[position].key;
            delta.record_move(
                self.resolve_pattern(key),
                SchemaPattern::new(retyped(&key.head), key.relation.clone(), retyped(&key.tail)),
            );
        }
        debug!(%entity, %new_type, edges = affected.len(), "Type change reconciles ontology patterns");
    }

    /// Count every edge from scratch using current types.
    ///
    /// Audit only. Unlike the incremental path there is no unknown fallback.
    ///
    /// # Errors
    ///
    /// `KgError::MissingType` for the first edge with an untyped endpoint.
    pub fn recompute_ontology(&self) -> KgResult<Ontology> {
        let mut ontology = Ontology::new();
        for slot in &self.edges {
            ontology.increment(self.strict_pattern(&slot.key.head, &slot.key.relation, &slot.key.tail)?);
        }
        Ok(ontology)
    }

    /// Replace the tracked ontology with a full recount.
    ///
    /// Leaves the graph untouched if any endpoint is untyped.
    pub fn rebuild_ontology(&mut self) -> KgResult<()> {
        self.ontology = self.recompute_ontology()?;
        info!(
            edges = self.edges.len(),
            patterns = self.ontology.len(),
            "Rebuilt ontology from scratch"
        );
        Ok(())
    }

    fn strict_pattern(&self, head: &Entity, relation: &str, tail: &Entity) -> KgResult<SchemaPattern> {
        let strict_type = |entity: &Entity| {
            self.attribute(entity, &self.config.type_attribute)
                .map(|value| TypeLabel::Known(value.clone()))
                .ok_or_else(|| KgError::MissingType {
                    entity: entity.clone(),
                    attribute: self.config.type_attribute.clone(),
                    head: head.clone(),
                    relation: relation.to_string(),
                    tail: tail.clone(),
                })
        };
        Ok(SchemaPattern::new(strict_type(head)?, relation, strict_type(tail)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kg_model::{AttributeTriple, OntologyConfig, RelationQuadruple};

    fn typed(entity: &str, entity_type: &str) -> AttributeTriple {
        AttributeTriple::new(entity, "type", entity_type)
    }

    fn drug_targets_protein() -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new();
        graph.add_attribute_triples(vec![typed("A", "drug"), typed("B", "protein")]);
        graph.add_relation_quadruple(RelationQuadruple::new("A", "interacts", "B"));
        graph
    }

    fn reconciling() -> KnowledgeGraph {
        KnowledgeGraph::with_config(OntologyConfig::new().with_tail_type_policy(TailTypePolicy::Reconcile))
            .unwrap()
    }

    #[test]
    fn test_type_change_moves_pattern() {
        let mut graph = drug_targets_protein();
        let old = SchemaPattern::typed("drug", "interacts", "protein");
        let new = SchemaPattern::typed("compound", "interacts", "protein");
        assert_eq!(graph.ontology().count(&old), 1);

        graph.add_attribute_triple(typed("A", "compound"));

        assert_eq!(graph.ontology().count(&old), 0);
        assert_eq!(graph.ontology().count(&new), 1);
        assert_eq!(graph.ontology().len(), 1);
    }

    #[test]
    fn test_same_type_re_add_is_noop() {
        let mut graph = drug_targets_protein();
        let before = graph.ontology().clone();
        graph.add_attribute_triple(typed("A", "drug"));
        graph.add_attribute_triple(typed("B", "protein"));
        assert_eq!(graph.ontology(), &before);
    }

    #[test]
    fn test_unknown_fallback_and_head_fix() {
        let mut graph = KnowledgeGraph::new();
        graph.add_relation_quadruple(RelationQuadruple::new("A", "interacts", "B"));
        let unknown = SchemaPattern::new(TypeLabel::Unknown, "interacts", TypeLabel::Unknown);
        assert_eq!(graph.ontology().count(&unknown), 1);

        // typing the tail alone does not touch the edge
        graph.add_attribute_triple(typed("B", "protein"));
        assert_eq!(graph.ontology().count(&unknown), 1);

        // typing the head moves from the old head type with the tail's current type
        graph.add_attribute_triple(typed("A", "drug"));
        assert_eq!(graph.ontology().count(&unknown), 1);
        assert_eq!(
            graph
                .ontology()
                .count(&SchemaPattern::new(TypeLabel::Unknown, "interacts", TypeLabel::known("protein"))),
            -1
        );
        assert_eq!(
            graph.ontology().count(&SchemaPattern::typed("drug", "interacts", "protein")),
            1
        );
        assert_eq!(graph.ontology().len(), 3);
        assert_eq!(graph.ontology().total(), 1);
        assert_eq!(
            graph.describe_ontology(),
            vec![
                "drug -[interacts]-> protein: 1".to_string(),
                "unknown -[interacts]-> protein: -1".to_string(),
                "unknown -[interacts]-> unknown: 1".to_string(),
            ]
        );
    }

    #[test]
    fn test_head_typed_with_untyped_tail() {
        let mut graph = KnowledgeGraph::new();
        graph.add_relation_quadruple(RelationQuadruple::new("A", "interacts", "B"));
        graph.add_attribute_triple(typed("A", "drug"));

        assert_eq!(
            graph
                .ontology()
                .count(&SchemaPattern::new(TypeLabel::known("drug"), "interacts", TypeLabel::Unknown)),
            1
        );
        assert_eq!(graph.ontology().len(), 1);
    }

    #[test]
    fn test_tail_type_change_gap() {
        let mut graph = drug_targets_protein();
        graph.add_attribute_triple(typed("B", "enzyme"));

        assert_eq!(
            graph.ontology().count(&SchemaPattern::typed("drug", "interacts", "protein")),
            1
        );
        let recounted = graph.recompute_ontology().unwrap();
        assert_eq!(
            recounted.count(&SchemaPattern::typed("drug", "interacts", "enzyme")),
            1
        );
        assert_ne!(graph.ontology(), &recounted);
    }

    #[test]
    fn test_reconcile_policy_fixes_incoming_edges() {
        let mut graph = reconciling();
        graph.add_attribute_triples(vec![typed("A", "drug"), typed("B", "protein")]);
        graph.add_relation_quadruple(RelationQuadruple::new("A", "interacts", "B"));
        graph.add_attribute_triple(typed("B", "enzyme"));

        assert_eq!(
            graph.ontology().count(&SchemaPattern::typed("drug", "interacts", "enzyme")),
            1
        );
        assert_eq!(graph.ontology(), &graph.recompute_ontology().unwrap());
    }

    #[test]
    fn test_reconcile_self_loop_counted_once() {
        let mut graph = reconciling();
        graph.add_attribute_triple(typed("A", "protein"));
        graph.add_relation_quadruple(RelationQuadruple::new("A", "binds", "A"));
        graph.add_attribute_triple(typed("A", "enzyme"));

        assert_eq!(graph.ontology().total(), 1);
        assert_eq!(
            graph.ontology().count(&SchemaPattern::typed("enzyme", "binds", "enzyme")),
            1
        );
    }

    #[test]
    fn test_ignore_policy_self_loop_keeps_old_tail() {
        let mut graph = KnowledgeGraph::new();
        graph.add_attribute_triple(typed("A", "protein"));
        graph.add_relation_quadruple(RelationQuadruple::new("A", "binds", "A"));
        graph.add_attribute_triple(typed("A", "enzyme"));

        assert_eq!(
            graph.ontology().count(&SchemaPattern::typed("enzyme", "binds", "protein")),
            1
        );
    }

    #[test]
    fn test_batch_reads_types_before_the_batch() {
        let head_first = vec![typed("A", "compound"), typed("B", "enzyme")];
        let tail_first = vec![typed("B", "enzyme"), typed("A", "compound")];

        let mut forward = drug_targets_protein();
        forward.add_attribute_triples(head_first);
        let mut backward = drug_targets_protein();
        backward.add_attribute_triples(tail_first);

        assert_eq!(forward.ontology(), backward.ontology());
        assert_eq!(forward.describe_ontology(), vec!["compound -[interacts]-> protein: 1".to_string()]);
        assert_eq!(
            forward.attribute_triples(None).unwrap(),
            backward.attribute_triples(None).unwrap()
        );
    }

    #[test]
    fn test_repeated_head_in_batch_moves_to_last_type() {
        let mut graph = drug_targets_protein();
        graph.add_attribute_triples(vec![
            typed("A", "compound"),
            typed("A", "compound"),
            typed("A", "inhibitor"),
        ]);
        assert_eq!(
            graph.describe_ontology(),
            vec!["inhibitor -[interacts]-> protein: 1".to_string()]
        );

        // round trip within one batch is a no-op
        let before = graph.ontology().clone();
        graph.add_attribute_triples(vec![typed("A", "drug"), typed("A", "inhibitor")]);
        assert_eq!(graph.ontology(), &before);

        let mut single = drug_targets_protein();
        for entity_type in ["compound", "compound", "inhibitor"] {
            single.add_attribute_triple(typed("A", entity_type));
        }
        assert_eq!(single.ontology(), &before);
    }

    #[test]
    fn test_reconcile_batch_is_order_independent() {
        let mut forward = reconciling();
        forward.add_attribute_triples(vec![typed("A", "drug"), typed("B", "protein")]);
        forward.add_relation_quadruple(RelationQuadruple::new("A", "interacts", "B"));
        let mut backward = forward.clone();

        forward.add_attribute_triples(vec![typed("A", "compound"), typed("B", "enzyme")]);
        backward.add_attribute_triples(vec![typed("B", "enzyme"), typed("A", "compound")]);

        assert_eq!(forward.ontology(), backward.ontology());
        assert_eq!(forward.ontology(), &forward.recompute_ontology().unwrap());
        assert_eq!(forward.describe_ontology(), vec!["compound -[interacts]-> enzyme: 1".to_string()]);
    }

    #[test]
    fn test_re_added_edge_counts_once() {
        let mut graph = KnowledgeGraph::new();
        graph.add_relation_quadruple(RelationQuadruple::new("A", "interacts", "B"));
        graph.add_attribute_triple(typed("B", "protein"));
        graph.add_attribute_triple(typed("A", "drug"));
        let before = graph.ontology().clone();

        graph.add_relation_quadruple(RelationQuadruple::new("A", "interacts", "B").with_attribute("k", 1));

        assert_eq!(graph.ontology(), &before);
        assert_eq!(graph.ontology().total(), 1);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_reconcile_re_added_edge_matches_recount() {
        let mut graph = reconciling();
        graph.add_relation_quadruple(RelationQuadruple::new("A", "interacts", "B"));
        graph.add_attribute_triple(typed("B", "protein"));
        graph.add_attribute_triple(typed("A", "drug"));
        graph.add_relation_quadruple(RelationQuadruple::new("A", "interacts", "B"));

        assert_eq!(graph.describe_ontology(), vec!["drug -[interacts]-> protein: 1".to_string()]);
        assert_eq!(graph.ontology(), &graph.recompute_ontology().unwrap());
    }

    #[test]
    fn test_recompute_requires_types() {
        let mut graph = drug_targets_protein();
        graph.add_relation_quadruple(RelationQuadruple::new("A", "interacts", "C"));

        let err = graph.recompute_ontology().unwrap_err();
        assert!(matches!(err, KgError::MissingType { ref entity, .. } if *entity == Entity::from("C")));

        let before = graph.ontology().clone();
        assert!(graph.rebuild_ontology().is_err());
        assert_eq!(graph.ontology(), &before);
    }

    #[test]
    fn test_rebuild_closes_the_gap() {
        let mut graph = drug_targets_protein();
        graph.add_attribute_triple(typed("B", "enzyme"));
        graph.rebuild_ontology().unwrap();

        let fixed = SchemaPattern::typed("drug", "interacts", "enzyme");
        assert_eq!(graph.ontology().count(&fixed), 1);

        // later head changes start from the rebuilt pattern
        graph.add_attribute_triple(typed("A", "compound"));
        assert_eq!(graph.ontology().count(&fixed), 0);
        assert_eq!(
            graph.ontology().count(&SchemaPattern::typed("compound", "interacts", "enzyme")),
            1
        );
    }
}
