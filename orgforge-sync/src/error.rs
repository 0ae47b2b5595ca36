//! Error types for orgforge-sync.

use std::path::PathBuf;

use thiserror::Error;

use orgforge_core::error::{DiffError, StateError};
use orgforge_core::types::ResourceKind;
use orgforge_renderer::RenderError;

/// All errors that can arise from the reconcile pipeline.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Template engine construction failed.
    #[error("template engine error: {0}")]
    Template(#[from] RenderError),

    /// Rendering a single change record failed.
    #[error("error generating artifact for {kind} '{key}': {source}")]
    Render {
        kind: ResourceKind,
        key: String,
        #[source]
        source: RenderError,
    },

    /// An error loading, extracting or persisting state.
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// An error from the diff engine.
    #[error("diff error: {0}")]
    Diff(#[from] DiffError),

    /// A change record without its kind's unique key.
    #[error("missing unique key '{key}' in {kind} change record")]
    MissingKey { kind: ResourceKind, key: String },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
