//! Knowledge Graph - the store of entities, attributes and labelled edges.

use std::collections::{HashMap, HashSet};
use tracing::debug;

use kg_model::{
    AttributeMap, AttributeTriple, AttributeValue, Entity, KgRow, OntologyConfig, RelationQuadruple,
};

use super::edge::{EdgeKey, EdgeSlot};
use super::{Ontology, OntologyDelta, SchemaPattern, TypeLabel};
use crate::error::{KgError, KgResult};

/// The main knowledge graph structure.
///
/// A directed multigraph whose nodes are entities carrying an attribute map
/// and whose edges are keyed by `(head, relation, tail)`. Every mutation
/// also updates the graph's [`Ontology`] incrementally.
///
/// Entities and edges are never removed. Edge listings follow insertion
/// order.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    pub(super) config: OntologyConfig,

    /// Attribute map per entity.
    pub(super) entities: HashMap<Entity, AttributeMap>,

    /// Entities in order of first reference.
    pub(super) entity_order: Vec<Entity>,

    /// All edges, in insertion order.
    pub(super) edges: Vec<EdgeSlot>,

    /// Index: edge key -> position in `edges`.
    pub(super) edge_index: HashMap<EdgeKey, usize>,

    /// Index: entity -> positions of edges leaving it.
    pub(super) outgoing: HashMap<Entity, Vec<usize>>,

    /// Index: entity -> positions of edges entering it.
    pub(super) incoming: HashMap<Entity, Vec<usize>>,

    /// Every relation label ever used.
    pub(super) relations: HashSet<String>,

    pub(super) ontology: Ontology,
}

impl KnowledgeGraph {
    /// Create a new empty knowledge graph with the default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph with the given config.
    pub fn with_config(config: OntologyConfig) -> KgResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Create a graph and load initial data: attribute triples first, then
    /// relation quadruples.
    pub fn from_parts<T, Q>(config: OntologyConfig, triples: T, quadruples: Q) -> KgResult<Self>
    where
        T: IntoIterator<Item = AttributeTriple>,
        Q: IntoIterator<Item = RelationQuadruple>,
    {
        let mut graph = Self::with_config(config)?;
        graph.add_attribute_triples(triples);
        graph.add_relation_quadruples(quadruples);
        Ok(graph)
    }

    pub fn config(&self) -> &OntologyConfig {
        &self.config
    }

    // Mutation

    /// Set attributes on entities, creating entities as needed.
    ///
    /// Last write wins per `(entity, attribute)`. The ontology changes of the
    /// whole batch are applied together at the end, and do not depend on the
    /// order of the triples within the batch.
    pub fn add_attribute_triples<I>(&mut self, triples: I)
    where
        I: IntoIterator<Item = AttributeTriple>,
    {
        let triples: Vec<AttributeTriple> = triples.into_iter().collect();
        let added = triples.len();

        let delta = self.on_attribute_triples_added(triples);

        debug!(triples = added, "Added attribute triples");
        self.ontology.apply(delta);
    }

    /// Set a single attribute.
    pub fn add_attribute_triple(&mut self, triple: AttributeTriple) {
        self.add_attribute_triples(std::iter::once(triple));
    }

    /// Add or overwrite edges.
    ///
    /// A quadruple whose `(head, relation, tail)` already exists replaces the
    /// stored attribute map and leaves the ontology alone, so every edge is
    /// counted once. New edges read endpoint types from the current
    /// attributes.
    pub fn add_relation_quadruples<I>(&mut self, quadruples: I)
    where
        I: IntoIterator<Item = RelationQuadruple>,
    {
        let mut delta = OntologyDelta::new();
        let mut added = 0usize;
        let mut replaced = 0usize;

        for quad in quadruples {
            self.entity_entry(quad.head.clone());
            self.entity_entry(quad.tail.clone());
            if !self.relations.contains(&quad.relation) {
                self.relations.insert(quad.relation.clone());
            }

            let key = EdgeKey::new(quad.head, quad.relation, quad.tail);
            match self.edge_index.get(&key).copied() {
                Some(position) => {
                    // counted when first inserted
                    self.edges[position].attributes = quad.attributes;
                    replaced += 1;
                }
                None => {
                    self.insert_edge(key, quad.attributes, &mut delta);
                    added += 1;
                }
            }
        }

        debug!(added, replaced, "Added relation quadruples");
        self.ontology.apply(delta);
    }

    /// Add or overwrite a single edge.
    pub fn add_relation_quadruple(&mut self, quadruple: RelationQuadruple) {
        self.add_relation_quadruples(std::iter::once(quadruple));
    }

    /// Ingest export rows: every row's attribute triples, then every row's
    /// relation quadruple.
    pub fn ingest_rows(&mut self, rows: &[KgRow]) {
        self.add_attribute_triples(rows.iter().flat_map(|row| row.attribute_triples()));
        self.add_relation_quadruples(rows.iter().map(KgRow::relation_quadruple));
    }

    pub(super) fn entity_entry(&mut self, entity: Entity) -> &mut AttributeMap {
        if !self.entities.contains_key(&entity) {
            self.entity_order.push(entity.clone());
        }
        self.entities.entry(entity).or_default()
    }

    fn insert_edge(&mut self, key: EdgeKey, attributes: AttributeMap, delta: &mut OntologyDelta) {
        delta.increment(self.resolve_pattern(&key));

        let position = self.edges.len();
        self.outgoing.entry(key.head.clone()).or_default().push(position);
        self.incoming.entry(key.tail.clone()).or_default().push(position);
        self.edge_index.insert(key.clone(), position);
        self.edges.push(EdgeSlot { key, attributes });
    }

    // Queries

    /// All entity ids ever referenced.
    pub fn entities(&self) -> HashSet<Entity> {
        self.entities.keys().cloned().collect()
    }

    /// Entity ids in order of first reference.
    pub fn entities_in_order(&self) -> &[Entity] {
        &self.entity_order
    }

    pub fn contains_entity(&self, entity: &Entity) -> bool {
        self.entities.contains_key(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Attribute triples of one entity, or of all entities when `entity`
    /// is `None`.
    ///
    /// # Errors
    ///
    /// `KgError::EntityNotFound` if the given entity was never referenced.
    pub fn attribute_triples(&self, entity: Option<&Entity>) -> KgResult<HashSet<AttributeTriple>> {
        match entity {
            Some(entity) => {
                let attributes = self
                    .entities
                    .get(entity)
                    .ok_or_else(|| KgError::EntityNotFound {
                        entity: entity.clone(),
                    })?;
                Ok(triples_of(entity, attributes).collect())
            }
            None => Ok(self
                .entities
                .iter()
                .flat_map(|(entity, attributes)| triples_of(entity, attributes))
                .collect()),
        }
    }

    /// All attribute triples ordered by entity first reference, then
    /// attribute name.
    pub fn attribute_triple_list(&self) -> Vec<AttributeTriple> {
        self.entity_order
            .iter()
            .filter_map(|entity| self.entities.get(entity).map(|attrs| (entity, attrs)))
            .flat_map(|(entity, attributes)| triples_of(entity, attributes))
            .collect()
    }

    /// Value of one attribute, if set.
    pub fn attribute(&self, entity: &Entity, attribute: &str) -> Option<&AttributeValue> {
        self.entities.get(entity)?.get(attribute)
    }

    /// Current type of an entity; `Unknown` when untyped or absent.
    pub fn entity_type(&self, entity: &Entity) -> TypeLabel {
        TypeLabel::from(self.attribute(entity, &self.config.type_attribute))
    }

    /// Edges in insertion order, filtered by endpoints.
    ///
    /// - no head, no tail: every edge
    /// - head only: edges leaving `head`
    /// - head and tail: edges leaving `head` that land on `tail`
    ///
    /// An unknown head yields an empty list.
    ///
    /// # Errors
    ///
    /// `KgError::TailWithoutHead` if a tail is given without a head.
    pub fn relation_quadruples(
        &self,
        head: Option<&Entity>,
        tail: Option<&Entity>,
    ) -> KgResult<Vec<RelationQuadruple>> {
        match (head, tail) {
            (None, None) => Ok(self.edges.iter().map(EdgeSlot::to_quadruple).collect()),
            (Some(head), tail) => Ok(self
                .outgoing_slots(head)
                .filter(|slot| tail.map_or(true, |tail| slot.key.tail == *tail))
                .map(EdgeSlot::to_quadruple)
                .collect()),
            (None, Some(tail)) => Err(KgError::TailWithoutHead { tail: tail.clone() }),
        }
    }

    /// Attribute map of one edge slot, if present.
    pub fn relation_attributes(
        &self,
        head: &Entity,
        relation: &str,
        tail: &Entity,
    ) -> Option<&AttributeMap> {
        let key = EdgeKey::new(head.clone(), relation.to_string(), tail.clone());
        self.edge_index
            .get(&key)
            .map(|&position| &self.edges[position].attributes)
    }

    /// Every relation label ever used.
    pub fn relations(&self) -> &HashSet<String> {
        &self.relations
    }

    /// The incrementally tracked ontology.
    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    /// Ontology lines `head -[relation]-> tail: count`, sorted, using the
    /// configured unknown label.
    pub fn describe_ontology(&self) -> Vec<String> {
        self.ontology
            .sorted()
            .into_iter()
            .map(|(pattern, count)| format!("{}: {}", pattern.render(&self.config.unknown_label), count))
            .collect()
    }

    pub(super) fn outgoing_slots<'a>(&'a self, entity: &Entity) -> impl Iterator<Item = &'a EdgeSlot> + 'a {
        self.outgoing
            .get(entity)
            .into_iter()
            .flatten()
            .map(move |&position| &self.edges[position])
    }

    /// Pattern of an edge under the current endpoint types.
    pub(super) fn resolve_pattern(&self, key: &EdgeKey) -> SchemaPattern {
        SchemaPattern::new(
            self.entity_type(&key.head),
            key.relation.clone(),
            self.entity_type(&key.tail),
        )
    }
}

fn triples_of<'a>(
    entity: &'a Entity,
    attributes: &'a AttributeMap,
) -> impl Iterator<Item = AttributeTriple> + 'a {
    attributes.iter().map(move |(attribute, value)| AttributeTriple {
        entity: entity.clone(),
        attribute: attribute.clone(),
        value: value.clone(),
    })
}
