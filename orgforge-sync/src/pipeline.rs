//! End-to-end reconcile pipeline shared by the CLI commands.
//!
//! `plan` and `apply` both start the same way: load the tfstate snapshot,
//! extract the four resource collections, and diff them against the desired
//! state. `apply` then feeds the change set through the processor and
//! persists the extracted snapshot; `plan` hands it to [`crate::plan`].

use orgforge_core::config::Config;
use orgforge_core::desired::DesiredState;
use orgforge_core::diff::diff_resources;
use orgforge_core::state::{self, ExtractedState};
use orgforge_core::types::ResourceKind;
use orgforge_core::ResourceChanges;

use crate::error::SyncError;
use crate::processor::{ProcessReport, ResourceProcessor};

/// Everything a full pipeline run produced.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub extracted: ExtractedState,
    pub changes: ResourceChanges,
    pub report: ProcessReport,
}

/// Diff the desired state against an extracted snapshot, kind by kind.
pub fn diff_desired(
    extracted: &ExtractedState,
    desired: &DesiredState,
) -> Result<ResourceChanges, SyncError> {
    let repositories = diff_resources(
        &extracted.repositories,
        &desired.repositories,
        ResourceKind::Repository.unique_key(),
    )?;
    let teams = diff_resources(&extracted.teams, &desired.teams, ResourceKind::Team.unique_key())?;
    let memberships = diff_resources(
        &extracted.memberships,
        &desired.memberships,
        ResourceKind::Membership.unique_key(),
    )?;
    let repository_collaborators = diff_resources(
        &extracted.repository_collaborators,
        &desired.repository_collaborators,
        ResourceKind::RepositoryCollaborator.unique_key(),
    )?;
    Ok(ResourceChanges::from_diffs(
        repositories,
        teams,
        memberships,
        repository_collaborators,
    ))
}

/// Load the tfstate snapshot, extract resources and compute the change set.
pub fn compute_changes(
    config: &Config,
    desired: &DesiredState,
) -> Result<(ExtractedState, ResourceChanges), SyncError> {
    let tfstate = state::load_tfstate(&config.tfstate_path())?;
    let extracted = state::extract_resources(&tfstate)?;
    let changes = diff_desired(&extracted, desired)?;
    tracing::debug!(
        "change set: {} to add, {} to update, {} to delete",
        changes.added(),
        changes.updated(),
        changes.deleted()
    );
    Ok((extracted, changes))
}

/// Run the full reconcile pipeline: extract, diff, process, persist.
///
/// In dry-run mode nothing is written, including the persisted snapshot.
pub fn run(
    config: &Config,
    desired: &DesiredState,
    dry_run: bool,
) -> Result<PipelineOutcome, SyncError> {
    let (extracted, changes) = compute_changes(config, desired)?;
    if changes.is_empty() {
        tracing::info!("no resource changes detected");
    }

    let processor = ResourceProcessor::new(config, dry_run)?;
    let report = processor.process(&changes)?;

    if !dry_run {
        state::save_existing_state(&extracted, &config.state_path())?;
    }

    Ok(PipelineOutcome {
        extracted,
        changes,
        report,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use orgforge_core::error::StateError;
    use orgforge_core::types::{Repository, Visibility};
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn test_config(root: &Path) -> Config {
        let mut config = Config::default();
        config.output_dir = root.join("terraform");
        config
    }

    fn write_tfstate(config: &Config, resources: serde_json::Value) {
        let state = json!({
            "version": 4,
            "terraform_version": "1.4.5",
            "resources": resources,
        });
        let path = config.tfstate_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_string_pretty(&state).unwrap()).unwrap();
    }

    fn desired_repository(name: &str, visibility: Visibility, allow_delete: bool) -> DesiredState {
        DesiredState {
            repositories: vec![Repository {
                repository_name: name.to_owned(),
                description: String::new(),
                visibility,
                gitignore_template: None,
                allow_delete,
            }],
            ..DesiredState::default()
        }
    }

    fn repo1_state_block(visibility: &str) -> serde_json::Value {
        json!([{
            "type": "github_repository",
            "name": "repo1",
            "instances": [{"attributes": {
                "name": "repo1",
                "description": "",
                "visibility": visibility,
                "gitignore_template": null,
            }}],
        }])
    }

    #[test]
    fn run_generates_artifacts_and_persists_state() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        write_tfstate(&config, json!([]));
        let desired = desired_repository("repo1", Visibility::Public, false);

        let outcome = run(&config, &desired, false).unwrap();

        assert_eq!(outcome.changes.added(), 1);
        assert_eq!(outcome.report.written(), 1);
        assert!(config.output_dir.join("repo1_repository.tf").exists());

        let persisted = state::load_existing_state(&config.state_path()).unwrap();
        assert_eq!(persisted, outcome.extracted);
        assert!(persisted.repositories.is_empty());
    }

    #[test]
    fn dry_run_writes_no_artifacts_and_no_snapshot() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        write_tfstate(&config, json!([]));
        let desired = desired_repository("repo1", Visibility::Public, false);

        let outcome = run(&config, &desired, true).unwrap();

        assert_eq!(outcome.report.would_write(), 1);
        assert!(!config.output_dir.join("repo1_repository.tf").exists());
        assert!(!config.state_path().exists());
    }

    #[test]
    fn identical_resource_produces_empty_change_set() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        write_tfstate(&config, repo1_state_block("public"));
        let desired = desired_repository("repo1", Visibility::Public, false);

        let outcome = run(&config, &desired, false).unwrap();

        assert!(outcome.changes.is_empty());
        assert!(outcome.report.writes.is_empty());
        assert!(!config.output_dir.join("repo1_repository.tf").exists());
    }

    #[test]
    fn drifted_resource_is_queued_for_update() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        write_tfstate(&config, repo1_state_block("private"));
        let desired = desired_repository("repo1", Visibility::Public, false);

        let outcome = run(&config, &desired, false).unwrap();

        assert_eq!(outcome.changes.updated(), 1);
        let artifact = config.output_dir.join("repo1_repository.tf");
        let content = fs::read_to_string(artifact).unwrap();
        assert!(content.contains("visibility  = \"public\""));
    }

    #[test]
    fn allow_delete_removes_the_existing_artifact() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        write_tfstate(&config, repo1_state_block("public"));
        fs::write(config.output_dir.join("repo1_repository.tf"), "resource {}").unwrap();
        let desired = desired_repository("repo1", Visibility::Public, true);

        let outcome = run(&config, &desired, false).unwrap();

        assert_eq!(outcome.changes.deleted(), 1);
        assert_eq!(outcome.report.removed(), 1);
        assert!(!config.output_dir.join("repo1_repository.tf").exists());
    }

    #[test]
    fn missing_tfstate_fails_with_io_context() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());

        let err = run(&config, &DesiredState::default(), false).unwrap_err();
        assert!(matches!(err, SyncError::State(StateError::Io { .. })));
    }

    #[test]
    fn extracted_snapshot_round_trips_through_run() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        write_tfstate(
            &config,
            json!([
                {
                    "type": "github_membership",
                    "name": "user1",
                    "instances": [{"attributes": {"username": "user1", "role": "member"}}],
                },
                {
                    "type": "aws_s3_bucket",
                    "name": "ignored",
                    "instances": [{"attributes": {"bucket": "b"}}],
                },
            ]),
        );

        let outcome = run(&config, &DesiredState::default(), false).unwrap();

        assert_eq!(outcome.extracted.memberships.len(), 1);
        let persisted = state::load_existing_state(&config.state_path()).unwrap();
        assert_eq!(persisted, outcome.extracted);
    }
}
