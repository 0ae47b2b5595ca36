//! Unified-diff preview for `orgforge plan`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use similar::TextDiff;

use orgforge_core::config::Config;
use orgforge_core::types::ResourceKind;
use orgforge_core::ResourceChanges;
use orgforge_renderer::TemplateEngine;

use crate::error::{io_err, SyncError};
use crate::processor::record_key;

/// A single artifact diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// What an apply run would change on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanReport {
    /// Artifacts whose rendered content differs from what is on disk.
    pub diffs: Vec<ArtifactDiff>,
    /// Artifacts that would be removed.
    pub pending_removals: Vec<PathBuf>,
    /// Deletion targets that are already absent.
    pub missing_removals: Vec<PathBuf>,
}

impl PlanReport {
    /// True when an apply run would leave the output directory untouched.
    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty() && self.pending_removals.is_empty()
    }
}

/// Render what `apply` would generate and compare it to current on-disk
/// content.
///
/// No files are written.
pub fn plan_changes(config: &Config, changes: &ResourceChanges) -> Result<PlanReport, SyncError> {
    let engine = TemplateEngine::new(config.template_dir.as_deref())?;
    let mut report = PlanReport::default();

    for kind in ResourceKind::all() {
        let [to_add, to_update, to_delete] = changes.for_kind(*kind);
        for record in to_add.iter().chain(to_update) {
            let key = record_key(*kind, record)?;
            let rendered = engine
                .render(*kind, record)
                .map_err(|source| SyncError::Render {
                    kind: *kind,
                    key: key.clone(),
                    source,
                })?;
            let rendered = normalize_line_endings(&rendered);
            let path = config.output_dir.join(kind.artifact_name(&key));
            let existing = read_existing_or_empty(&path)?;
            if existing == rendered {
                continue;
            }

            let relative = path.strip_prefix(&config.output_dir).unwrap_or(path.as_path());
            let old_header = format!("a/{}", relative.display());
            let new_header = format!("b/{}", relative.display());
            let unified = TextDiff::from_lines(&existing, &rendered)
                .unified_diff()
                .header(&old_header, &new_header)
                .context_radius(3)
                .to_string();

            report.diffs.push(ArtifactDiff {
                path,
                unified_diff: unified,
            });
        }

        for record in to_delete {
            let key = record_key(*kind, record)?;
            let path = config.output_dir.join(kind.artifact_name(&key));
            if path.exists() {
                report.pending_removals.push(path);
            } else {
                report.missing_removals.push(path);
            }
        }
    }

    Ok(report)
}

fn read_existing_or_empty(path: &Path) -> Result<String, SyncError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(normalize_line_endings(&content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(io_err(path, err)),
    }
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}
