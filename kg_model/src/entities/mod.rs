//! Entity identifiers for the knowledge graph.

use serde::{Deserialize, Serialize};

/// Identifier for a node in the knowledge graph.
///
/// Entities are opaque and compared by value. A string id and an integer id
/// never compare equal, even when they print the same (`"7"` vs `7`).
/// Entities have no creation step: they exist once a triple or quadruple
/// references them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entity {
    Int(i64),
    Str(String),
}

impl From<&str> for Entity {
    fn from(id: &str) -> Self {
        Entity::Str(id.to_string())
    }
}

impl From<String> for Entity {
    fn from(id: String) -> Self {
        Entity::Str(id)
    }
}

impl From<i64> for Entity {
    fn from(id: i64) -> Self {
        Entity::Int(id)
    }
}

impl From<i32> for Entity {
    fn from(id: i32) -> Self {
        Entity::Int(i64::from(id))
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Int(id) => write!(f, "{}", id),
            Entity::Str(id) => write!(f, "{}", id),
        }
    }
}
