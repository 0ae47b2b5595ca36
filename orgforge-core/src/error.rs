//! Error types for orgforge-core.
//!
//! Each module exposes a closed enum so callers pattern-match on variants
//! instead of inspecting message text.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ResourceKind;

/// All errors that can arise while computing resource differences.
#[derive(Debug, Error)]
pub enum DiffError {
    /// An existing record lacks the unique key used for indexing.
    #[error("missing required key '{key}' in existing resources: {record}")]
    MissingKey { key: String, record: String },

    /// A requested record does not expose the unique key.
    #[error("missing required attribute '{key}' in requested resources: {record}")]
    MissingAttribute { key: String, record: String },

    /// Anything else that fails while comparing — in practice, requested
    /// records that cannot be serialized to a mapping.
    #[error("error calculating resource differences for key '{key}': {source}")]
    Comparison {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// All errors that can arise from loading, extracting, or persisting state.
#[derive(Debug, Error)]
pub enum StateError {
    /// I/O failure, with the offending path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The state file is not valid JSON of the expected shape.
    #[error("failed to parse state file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A recognized resource block's instance lacks a required attribute.
    #[error("missing required key '{key}' in {resource_type} state attributes")]
    MissingKey { key: String, resource_type: String },

    /// A recognized resource block whose `instances` value is not a list of
    /// attribute objects.
    #[error("malformed instances in {resource_type} block '{name}': {source}")]
    Instances {
        resource_type: String,
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization failure while persisting extracted state.
    #[error("state serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// All errors that can arise from configuration load/save.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load — includes the file path.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// All errors that can arise while ingesting desired-state input.
#[derive(Debug, Error)]
pub enum DesiredError {
    /// One of the desired-state JSON documents failed to parse or validate.
    #[error("invalid {kind} desired state: {source}")]
    Parse {
        kind: ResourceKind,
        #[source]
        source: serde_json::Error,
    },
}
