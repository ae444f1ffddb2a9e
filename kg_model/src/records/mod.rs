//! Triples, quadruples and ingestion rows - the units of data fed to a graph.

use serde::{Deserialize, Serialize};

use crate::entities::Entity;
use crate::values::{AttributeMap, AttributeValue};

/// Attribute name conventionally holding an entity's display name.
pub const NAME_ATTRIBUTE: &str = "name";
/// Attribute name conventionally holding an entity's type.
pub const TYPE_ATTRIBUTE: &str = "type";
/// Attribute name conventionally holding an entity's data source.
pub const SOURCE_ATTRIBUTE: &str = "source";
/// Edge attribute carrying the human-readable relation label.
pub const DISPLAY_RELATION_ATTRIBUTE: &str = "display_relation";

/// `(entity, attribute, value)` - sets one attribute on one entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeTriple {
    pub entity: Entity,
    pub attribute: String,
    pub value: AttributeValue,
}

impl AttributeTriple {
    pub fn new(
        entity: impl Into<Entity>,
        attribute: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        Self {
            entity: entity.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

/// `(head, relation, tail, attributes)` - one directed, labelled edge.
///
/// `(head, relation, tail)` identifies the edge slot; the attribute map is
/// the slot's payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationQuadruple {
    pub head: Entity,
    pub relation: String,
    pub tail: Entity,
    #[serde(default)]
    pub attributes: AttributeMap,
}

impl RelationQuadruple {
    /// Create a quadruple with an empty attribute map.
    pub fn new(head: impl Into<Entity>, relation: impl Into<String>, tail: impl Into<Entity>) -> Self {
        Self {
            head: head.into(),
            relation: relation.into(),
            tail: tail.into(),
            attributes: AttributeMap::new(),
        }
    }

    /// Add an edge attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// One record of the tabular knowledge-graph export.
///
/// Each row describes two entities (`x` and `y`) and the relation from `x`
/// to `y`. Indices may be integers or strings and keep that form as entity
/// ids. Rows are assumed well formed; reading and chunking the source file
/// is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KgRow {
    pub x_index: Entity,
    pub x_name: String,
    pub x_type: String,
    pub x_source: String,
    pub y_index: Entity,
    pub y_name: String,
    pub y_type: String,
    pub y_source: String,
    pub relation: String,
    pub display_relation: String,
}

impl KgRow {
    /// The six attribute triples of this row: name, type and source of `x`,
    /// then name, type and source of `y`.
    pub fn attribute_triples(&self) -> [AttributeTriple; 6] {
        let x = self.x_index.clone();
        let y = self.y_index.clone();
        [
            AttributeTriple::new(x.clone(), NAME_ATTRIBUTE, self.x_name.as_str()),
            AttributeTriple::new(x.clone(), TYPE_ATTRIBUTE, self.x_type.as_str()),
            AttributeTriple::new(x, SOURCE_ATTRIBUTE, self.x_source.as_str()),
            AttributeTriple::new(y.clone(), NAME_ATTRIBUTE, self.y_name.as_str()),
            AttributeTriple::new(y.clone(), TYPE_ATTRIBUTE, self.y_type.as_str()),
            AttributeTriple::new(y, SOURCE_ATTRIBUTE, self.y_source.as_str()),
        ]
    }

    /// The relation quadruple `x -relation-> y` carrying the display label.
    pub fn relation_quadruple(&self) -> RelationQuadruple {
        RelationQuadruple::new(self.x_index.clone(), self.relation.as_str(), self.y_index.clone())
            .with_attribute(DISPLAY_RELATION_ATTRIBUTE, self.display_relation.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> KgRow {
        serde_json::from_str(
            r#"{
                "x_index": "0", "x_name": "PHYHIP", "x_type": "gene/protein", "x_source": "NCBI",
                "y_index": "8889", "y_name": "KIF15", "y_type": "gene/protein", "y_source": "NCBI",
                "relation": "protein_protein", "display_relation": "ppi"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_row_attribute_triples() {
        let row = sample_row();
        let triples = row.attribute_triples();

        assert_eq!(triples[0], AttributeTriple::new("0", "name", "PHYHIP"));
        assert_eq!(triples[1], AttributeTriple::new("0", "type", "gene/protein"));
        assert_eq!(triples[2], AttributeTriple::new("0", "source", "NCBI"));
        assert_eq!(triples[4].entity, Entity::from("8889"));
        assert_eq!(triples[4].attribute, TYPE_ATTRIBUTE);
    }

    #[test]
    fn test_row_relation_quadruple() {
        let quad = sample_row().relation_quadruple();
        assert_eq!(quad.head, Entity::from("0"));
        assert_eq!(quad.tail, Entity::from("8889"));
        assert_eq!(quad.relation, "protein_protein");
        assert_eq!(quad.attributes.len(), 1);
        assert_eq!(
            quad.attributes[DISPLAY_RELATION_ATTRIBUTE],
            AttributeValue::from("ppi")
        );
    }

    #[test]
    fn test_row_integer_indices() {
        let row: KgRow = serde_json::from_str(
            r#"{
                "x_index": 14012, "x_name": "aspirin", "x_type": "drug", "x_source": "DrugBank",
                "y_index": "0", "y_name": "PHYHIP", "y_type": "gene/protein", "y_source": "NCBI",
                "relation": "drug_protein", "display_relation": "target"
            }"#,
        )
        .unwrap();

        assert_eq!(row.x_index, Entity::Int(14012));
        assert_eq!(row.attribute_triples()[0], AttributeTriple::new(14012, "name", "aspirin"));
        assert_eq!(row.attribute_triples()[3].entity, Entity::from("0"));

        let quad = row.relation_quadruple();
        assert_eq!(quad.head, Entity::from(14012));
        assert_ne!(quad.head, Entity::from("14012"));
        assert_eq!(quad.tail, Entity::from("0"));
    }

    #[test]
    fn test_quadruple_builder() {
        let quad = RelationQuadruple::new(1, "targets", 2)
            .with_attribute("k", 1)
            .with_attribute("k", 2);
        assert_eq!(quad.attributes.len(), 1);
        assert_eq!(quad.attributes["k"], AttributeValue::Int(2));
    }

    #[test]
    fn test_quadruple_deserialize_without_attributes() {
        let quad: RelationQuadruple =
            serde_json::from_str(r#"{"head": "a", "relation": "r", "tail": 3}"#).unwrap();
        assert_eq!(quad, RelationQuadruple::new("a", "r", 3));
    }
}
