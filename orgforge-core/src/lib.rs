//! Orgforge core library — domain types, diff engine, state extraction.
//!
//! Public API surface:
//! - [`types`] — resource kinds and typed desired-state records
//! - [`error`] — [`DiffError`], [`StateError`], [`ConfigError`], [`DesiredError`]
//! - [`diff`] — keyed add / update / delete classification
//! - [`changes`] — the aggregated change set across all four kinds
//! - [`state`] — tfstate loading and resource extraction
//! - [`config`] — YAML configuration with per-kind defaults
//! - [`desired`] — desired-state ingestion and default resolution

pub mod changes;
pub mod config;
pub mod desired;
pub mod diff;
pub mod error;
pub mod state;
pub mod types;

pub use changes::ResourceChanges;
pub use config::Config;
pub use desired::{DesiredSource, DesiredState};
pub use diff::{diff_resources, key_string, ResourceDiff};
pub use error::{ConfigError, DesiredError, DiffError, StateError};
pub use state::{extract_resources, load_tfstate, ExtractedState, TfState};
pub use types::{
    CollaboratorPermission, Membership, OrgRole, RecordMap, Repository, RepositoryCollaborator,
    ResourceKind, Team, TeamMember, TeamPrivacy, TeamRole, Visibility,
};
