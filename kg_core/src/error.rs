//! Error types for kg_core.

use kg_model::{ConfigError, Entity};
use thiserror::Error;

/// Top-level error type for kg_core.
#[derive(Debug, Error)]
pub enum KgError {
    #[error("Entity {entity} not in knowledge graph")]
    EntityNotFound { entity: Entity },

    #[error("Relation query named tail entity {tail} without a head entity")]
    TailWithoutHead { tail: Entity },

    #[error("Entity {entity} has no {attribute} attribute (edge {head} -[{relation}]-> {tail})")]
    MissingType {
        entity: Entity,
        attribute: String,
        head: Entity,
        relation: String,
        tail: Entity,
    },

    #[error("Cannot merge graphs with different ontology configs")]
    ConfigMismatch,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for graph operations.
pub type KgResult<T> = Result<T, KgError>;
