//! Resource processor — turns an aggregated change set into artifacts.
//!
//! Adds and updates render a record through the template engine and write
//! `<key>_<kind>.tf` into the output directory; deletes remove that file.
//! Within each kind the order is add, update, delete, so a record queued for
//! both update and deletion ends up removed.

use std::path::PathBuf;

use orgforge_core::config::Config;
use orgforge_core::diff::key_string;
use orgforge_core::types::{RecordMap, ResourceKind};
use orgforge_core::ResourceChanges;
use orgforge_renderer::TemplateEngine;

use crate::error::SyncError;
use crate::writer::{self, RemoveResult, WriteResult};

// ---------------------------------------------------------------------------
// Process report
// ---------------------------------------------------------------------------

/// A deletion that could not be carried out.
///
/// Deletion failures do not abort the run; they are collected here so the
/// caller can surface them.
#[derive(Debug)]
pub struct RemovalFailure {
    pub kind: ResourceKind,
    pub key: String,
    pub error: SyncError,
}

/// Summary of one processor run over a change set.
#[derive(Debug, Default)]
pub struct ProcessReport {
    pub writes: Vec<WriteResult>,
    pub removals: Vec<RemoveResult>,
    pub failed_removals: Vec<RemovalFailure>,
}

impl ProcessReport {
    pub fn written(&self) -> usize {
        self.count_writes(|w| matches!(w, WriteResult::Written { .. }))
    }

    pub fn unchanged(&self) -> usize {
        self.count_writes(|w| matches!(w, WriteResult::Unchanged { .. }))
    }

    pub fn would_write(&self) -> usize {
        self.count_writes(|w| matches!(w, WriteResult::WouldWrite { .. }))
    }

    pub fn removed(&self) -> usize {
        self.count_removals(|r| matches!(r, RemoveResult::Removed { .. }))
    }

    pub fn would_remove(&self) -> usize {
        self.count_removals(|r| matches!(r, RemoveResult::WouldRemove { .. }))
    }

    pub fn missing(&self) -> usize {
        self.count_removals(|r| matches!(r, RemoveResult::Missing { .. }))
    }

    fn count_writes(&self, pred: impl Fn(&WriteResult) -> bool) -> usize {
        self.writes.iter().filter(|w| pred(w)).count()
    }

    fn count_removals(&self, pred: impl Fn(&RemoveResult) -> bool) -> usize {
        self.removals.iter().filter(|r| pred(r)).count()
    }
}

// ---------------------------------------------------------------------------
// ResourceProcessor
// ---------------------------------------------------------------------------

/// Renders change records into per-resource Terraform fragments and removes
/// the fragments of deleted resources.
pub struct ResourceProcessor {
    engine: TemplateEngine,
    output_dir: PathBuf,
    dry_run: bool,
}

impl ResourceProcessor {
    /// Build a processor from configuration. Template overrides come from
    /// `config.template_dir`; artifacts land in `config.output_dir`.
    pub fn new(config: &Config, dry_run: bool) -> Result<Self, SyncError> {
        let engine = TemplateEngine::new(config.template_dir.as_deref())?;
        Ok(ResourceProcessor {
            engine,
            output_dir: config.output_dir.clone(),
            dry_run,
        })
    }

    /// Render and write the artifact for one repository record.
    pub fn generate_repository(&self, record: &RecordMap) -> Result<WriteResult, SyncError> {
        self.generate(ResourceKind::Repository, record)
    }

    /// Render and write the artifact for one team record.
    pub fn generate_team(&self, record: &RecordMap) -> Result<WriteResult, SyncError> {
        self.generate(ResourceKind::Team, record)
    }

    /// Render and write the artifact for one membership record.
    pub fn generate_membership(&self, record: &RecordMap) -> Result<WriteResult, SyncError> {
        self.generate(ResourceKind::Membership, record)
    }

    /// Render and write the artifact for one repository collaborator record.
    pub fn generate_repository_collaborator(
        &self,
        record: &RecordMap,
    ) -> Result<WriteResult, SyncError> {
        self.generate(ResourceKind::RepositoryCollaborator, record)
    }

    /// Remove the artifact for `key`. Absent artifacts are a logged no-op.
    pub fn remove_artifact(&self, kind: ResourceKind, key: &str) -> Result<RemoveResult, SyncError> {
        writer::remove_artifact_file(&self.artifact_path(kind, key), self.dry_run)
    }

    /// Full path of the artifact for `key`.
    pub fn artifact_path(&self, kind: ResourceKind, key: &str) -> PathBuf {
        self.output_dir.join(kind.artifact_name(key))
    }

    /// Apply a whole change set, kind by kind.
    ///
    /// Generation failures abort the run. Deletion failures are logged and
    /// collected in the report, and processing continues.
    pub fn process(&self, changes: &ResourceChanges) -> Result<ProcessReport, SyncError> {
        let mut report = ProcessReport::default();
        for kind in ResourceKind::all() {
            let [to_add, to_update, to_delete] = changes.for_kind(*kind);
            for record in to_add.iter().chain(to_update) {
                report.writes.push(self.generate(*kind, record)?);
            }
            for record in to_delete {
                let key = record_key(*kind, record)?;
                match self.remove_artifact(*kind, &key) {
                    Ok(result) => report.removals.push(result),
                    Err(error) => {
                        tracing::warn!("failed to remove {kind} artifact '{key}': {error}");
                        report.failed_removals.push(RemovalFailure {
                            kind: *kind,
                            key,
                            error,
                        });
                    }
                }
            }
        }
        Ok(report)
    }

    fn generate(&self, kind: ResourceKind, record: &RecordMap) -> Result<WriteResult, SyncError> {
        let key = record_key(kind, record)?;
        let content = self
            .engine
            .render(kind, record)
            .map_err(|source| SyncError::Render {
                kind,
                key: key.clone(),
                source,
            })?;
        writer::atomic_write(&self.artifact_path(kind, &key), &content, self.dry_run)
    }
}

pub(crate) fn record_key(kind: ResourceKind, record: &RecordMap) -> Result<String, SyncError> {
    record
        .get(kind.unique_key())
        .map(key_string)
        .ok_or_else(|| SyncError::MissingKey {
            kind,
            key: kind.unique_key().to_owned(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
