//! Edge slots - the stored form of relation quadruples.

use kg_model::{AttributeMap, Entity, RelationQuadruple};

/// Identity of an edge slot: one per `(head, relation, tail)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub head: Entity,
    pub relation: String,
    pub tail: Entity,
}

impl EdgeKey {
    pub fn new(head: Entity, relation: String, tail: Entity) -> Self {
        Self { head, relation, tail }
    }
}

/// A stored edge with its attribute map.
#[derive(Debug, Clone)]
pub(crate) struct EdgeSlot {
    pub key: EdgeKey,
    pub attributes: AttributeMap,
}

impl EdgeSlot {
    pub fn to_quadruple(&self) -> RelationQuadruple {
        RelationQuadruple {
            head: self.key.head.clone(),
            relation: self.key.relation.clone(),
            tail: self.key.tail.clone(),
            attributes: self.attributes.clone(),
        }
    }
}
