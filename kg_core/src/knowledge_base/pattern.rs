//! Schema patterns - the keys of the ontology multiset.

use kg_model::{AttributeValue, DEFAULT_UNKNOWN_LABEL};
use serde::{Deserialize, Serialize};

/// The resolved type of an entity.
///
/// `Unknown` is its own variant, so an entity literally typed `"unknown"`
/// is never confused with an untyped one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeLabel {
    /// Value of the entity's type attribute.
    Known(AttributeValue),

    /// The entity has no type attribute.
    Unknown,
}

impl TypeLabel {
    /// Create a known type label.
    pub fn known(value: impl Into<AttributeValue>) -> Self {
        TypeLabel::Known(value.into())
    }

    /// Render with the given text for the unknown sentinel.
    pub fn render(&self, unknown_label: &str) -> String {
        match self {
            TypeLabel::Known(value) => value.to_string(),
            TypeLabel::Unknown => unknown_label.to_string(),
        }
    }
}

impl From<Option<&AttributeValue>> for TypeLabel {
    fn from(value: Option<&AttributeValue>) -> Self {
        value.cloned().map_or(TypeLabel::Unknown, TypeLabel::Known)
    }
}

impl std::fmt::Display for TypeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(DEFAULT_UNKNOWN_LABEL))
    }
}

/// `(head type, relation, tail type)` observed on at least one edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaPattern {
    pub head_type: TypeLabel,
    pub relation: String,
    pub tail_type: TypeLabel,
}

impl SchemaPattern {
    pub fn new(head_type: TypeLabel, relation: impl Into<String>, tail_type: TypeLabel) -> Self {
        Self {
            head_type,
            relation: relation.into(),
            tail_type,
        }
    }

    /// Shorthand for a pattern between two known types.
    pub fn typed(
        head_type: impl Into<AttributeValue>,
        relation: impl Into<String>,
        tail_type: impl Into<AttributeValue>,
    ) -> Self {
        Self::new(TypeLabel::known(head_type), relation, TypeLabel::known(tail_type))
    }

    /// Render as `head -[relation]-> tail`.
    pub fn render(&self, unknown_label: &str) -> String {
        format!(
            "{} -[{}]-> {}",
            self.head_type.render(unknown_label),
            self.relation,
            self.tail_type.render(unknown_label)
        )
    }
}

impl std::fmt::Display for SchemaPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(DEFAULT_UNKNOWN_LABEL))
    }
}
