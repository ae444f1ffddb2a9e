//! Ontology tracking configuration, loadable from TOML.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::records::TYPE_ATTRIBUTE;

/// Text shown for entities without a type attribute.
pub const DEFAULT_UNKNOWN_LABEL: &str = "unknown";

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

/// How a change of an entity's type treats edges pointing *at* that entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TailTypePolicy {
    /// Only the entity's outgoing edges move, from `(old type, relation,
    /// tail type)` to `(new type, relation, tail type)`, with types read
    /// before the batch. Incoming edges are left alone, so the tracked
    /// ontology can drift from a full recount.
    #[default]
    Ignore,
    /// Outgoing and incoming edges are re-counted. The tracked ontology
    /// always equals a full recount.
    Reconcile,
}

/// Settings for the ontology tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OntologyConfig {
    /// Attribute whose value is an entity's type.
    pub type_attribute: String,

    /// Display text for the unknown-type sentinel.
    pub unknown_label: String,

    pub tail_type_policy: TailTypePolicy,
}

impl Default for OntologyConfig {
    fn default() -> Self {
        Self {
            type_attribute: TYPE_ATTRIBUTE.to_string(),
            unknown_label: DEFAULT_UNKNOWN_LABEL.to_string(),
            tail_type_policy: TailTypePolicy::Ignore,
        }
    }
}

impl OntologyConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the type attribute name.
    pub fn with_type_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.type_attribute = attribute.into();
        self
    }

    /// Set the display text of the unknown type.
    pub fn with_unknown_label(mut self, label: impl Into<String>) -> Self {
        self.unknown_label = label.into();
        self
    }

    /// Set the tail type policy.
    pub fn with_tail_type_policy(mut self, policy: TailTypePolicy) -> Self {
        self.tail_type_policy = policy;
        self
    }

    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        info!(
            path = %path.display(),
            type_attribute = %config.type_attribute,
            policy = ?config.tail_type_policy,
            "Loaded ontology config"
        );
        Ok(config)
    }

    /// Check that every field holds a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.type_attribute.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "type_attribute",
                message: "must not be empty".to_string(),
            });
        }
        if self.unknown_label.is_empty() {
            return Err(ConfigError::Invalid {
                field: "unknown_label",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
