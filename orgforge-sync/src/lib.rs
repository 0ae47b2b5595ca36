//! # orgforge-sync
//!
//! Artifact emission pipeline: renders aggregated change sets into
//! per-resource Terraform fragments with atomic, content-gated writes, and
//! previews pending changes as unified diffs.

pub mod error;
pub mod pipeline;
pub mod plan;
pub mod processor;
pub mod writer;

pub use error::SyncError;
pub use pipeline::{compute_changes, diff_desired, run, PipelineOutcome};
pub use plan::{plan_changes, ArtifactDiff, PlanReport};
pub use processor::{ProcessReport, RemovalFailure, ResourceProcessor};
pub use writer::{RemoveResult, WriteResult};
