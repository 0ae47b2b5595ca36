//! Terraform state snapshots: loading, extraction, and persistence.
//!
//! A snapshot is a heterogeneous tree of resource blocks. The extractor
//! normalizes the four recognized block types into canonical record
//! collections and skips everything else; the result is persisted between
//! runs as the next pass's "existing" input.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::diff::key_string;
use crate::error::StateError;
use crate::types::{RecordMap, ResourceKind};

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

/// Root of a Terraform state document. Only the parts orgforge reads are
/// typed; unknown top-level fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfState {
    pub version: u64,
    #[serde(default)]
    pub terraform_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<u64>,
    #[serde(default)]
    pub resources: Vec<ResourceBlock>,
}

impl TfState {
    /// An empty version-4 snapshot, used when scaffolding a working
    /// directory.
    pub fn empty() -> Self {
        TfState {
            version: 4,
            terraform_version: "1.4.5".to_owned(),
            serial: None,
            resources: vec![],
        }
    }
}

/// One entry of a state file's `resources` list.
///
/// `instances` stays untyped until the block's `type` is recognized, so
/// unknown resource kinds never constrain its shape. An absent `instances`
/// key reads as an empty list; an explicit `null` does not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceBlock {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "empty_instances")]
    pub instances: Value,
}

fn empty_instances() -> Value {
    Value::Array(vec![])
}

#[derive(Debug, Deserialize)]
struct ResourceInstance {
    #[serde(default)]
    attributes: RecordMap,
}

/// The four canonical collections extracted from a snapshot.
///
/// This shape is persisted verbatim between runs and must round-trip
/// losslessly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExtractedState {
    #[serde(default)]
    pub repositories: Vec<RecordMap>,
    #[serde(default)]
    pub teams: Vec<RecordMap>,
    #[serde(default)]
    pub memberships: Vec<RecordMap>,
    #[serde(default)]
    pub repository_collaborators: Vec<RecordMap>,
}

impl ExtractedState {
    /// The collection holding `kind`'s records.
    pub fn collection(&self, kind: ResourceKind) -> &[RecordMap] {
        match kind {
            ResourceKind::Repository => &self.repositories,
            ResourceKind::Team => &self.teams,
            ResourceKind::Membership => &self.memberships,
            ResourceKind::RepositoryCollaborator => &self.repository_collaborators,
        }
    }

    /// Total number of extracted records across all kinds.
    pub fn total(&self) -> usize {
        ResourceKind::all().iter().map(|kind| self.collection(*kind).len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

fn io_err(path: &Path, source: std::io::Error) -> StateError {
    StateError::Io { path: path.to_path_buf(), source }
}

/// Read and parse a Terraform state file.
pub fn load_tfstate(path: &Path) -> Result<TfState, StateError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_json::from_str(&contents)
        .map_err(|e| StateError::Parse { path: path.to_path_buf(), source: e })
}

/// Atomically persist extracted state as pretty-printed JSON.
///
/// The file becomes the next run's "existing" input; the write goes through
/// a `.tmp` sibling and a rename so a crash never leaves a torn file.
pub fn save_existing_state(state: &ExtractedState, path: &Path) -> Result<(), StateError> {
    write_json_atomic(path, serde_json::to_string_pretty(state)?)?;
    info!("saved existing state: {}", path.display());
    Ok(())
}

/// Read a previously persisted extracted state.
pub fn load_existing_state(path: &Path) -> Result<ExtractedState, StateError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_json::from_str(&contents)
        .map_err(|e| StateError::Parse { path: path.to_path_buf(), source: e })
}

/// Atomically write a state snapshot, creating parent directories.
///
/// Used to scaffold an empty state for a fresh working directory.
pub fn save_tfstate(state: &TfState, path: &Path) -> Result<(), StateError> {
    write_json_atomic(path, serde_json::to_string_pretty(state)?)?;
    info!("saved terraform state: {}", path.display());
    Ok(())
}

fn write_json_atomic(path: &Path, json: String) -> Result<(), StateError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let tmp = PathBuf::from(format!("{}.tmp", path.display()));
    std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Normalize a state snapshot into the four canonical record collections.
///
/// Unrecognized resource types are skipped; block order and, within a
/// block, instance order are preserved. A missing required attribute aborts
/// the whole pass with no partial result.
pub fn extract_resources(state: &TfState) -> Result<ExtractedState, StateError> {
    let mut extracted = ExtractedState::default();

    for block in &state.resources {
        let Some(kind) = ResourceKind::from_state_type(&block.resource_type) else {
            debug!("skipping unrecognized resource type '{}'", block.resource_type);
            continue;
        };
        for instance in block_instances(block)? {
            let record = project_attributes(kind, &instance.attributes)?;
            match kind {
                ResourceKind::Repository => extracted.repositories.push(record),
                ResourceKind::Team => extracted.teams.push(record),
                ResourceKind::Membership => extracted.memberships.push(record),
                ResourceKind::RepositoryCollaborator => {
                    extracted.repository_collaborators.push(record)
                }
            }
        }
    }

    debug!(
        "extracted {} repositories, {} teams, {} memberships, {} collaborators",
        extracted.repositories.len(),
        extracted.teams.len(),
        extracted.memberships.len(),
        extracted.repository_collaborators.len(),
    );
    Ok(extracted)
}

fn block_instances(block: &ResourceBlock) -> Result<Vec<ResourceInstance>, StateError> {
    serde_json::from_value(block.instances.clone()).map_err(|e| StateError::Instances {
        resource_type: block.resource_type.clone(),
        name: block.name.clone(),
        source: e,
    })
}

/// Project one instance's attributes into a canonical record for `kind`.
fn project_attributes(kind: ResourceKind, attributes: &RecordMap) -> Result<RecordMap, StateError> {
    let mut record = RecordMap::new();
    match kind {
        ResourceKind::Repository => {
            record.insert("repository_name".to_owned(), required(kind, attributes, "name")?);
            record.insert("description".to_owned(), string_or_empty(attributes, "description"));
            record.insert("visibility".to_owned(), required(kind, attributes, "visibility")?);
            record.insert(
                "gitignore_template".to_owned(),
                attributes.get("gitignore_template").cloned().unwrap_or(Value::Null),
            );
        }
        ResourceKind::Team => {
            record.insert("team_name".to_owned(), required(kind, attributes, "name")?);
            record.insert("description".to_owned(), string_or_empty(attributes, "description"));
            record.insert("privacy".to_owned(), required(kind, attributes, "privacy")?);
            // Team membership is not reconstructed from state.
            record.insert("members".to_owned(), Value::Array(vec![]));
        }
        ResourceKind::Membership => {
            record.insert("username".to_owned(), required(kind, attributes, "username")?);
            record.insert("role".to_owned(), required(kind, attributes, "role")?);
        }
        ResourceKind::RepositoryCollaborator => {
            let repository = required(kind, attributes, "repository")?;
            let username = required(kind, attributes, "username")?;
            let collaborator_id =
                format!("{}_{}", key_string(&repository), key_string(&username));
            record.insert("collaborator_id".to_owned(), Value::String(collaborator_id));
            record.insert("repository_name".to_owned(), repository);
            record.insert("username".to_owned(), username);
            record.insert("permission".to_owned(), required(kind, attributes, "permission")?);
        }
    }
    Ok(record)
}

fn required(kind: ResourceKind, attributes: &RecordMap, key: &str) -> Result<Value, StateError> {
    attributes.get(key).cloned().ok_or_else(|| StateError::MissingKey {
        key: key.to_owned(),
        resource_type: kind.state_type().to_owned(),
    })
}

/// Attribute value, defaulting to `""` when the key is absent. A key that is
/// present — even as `null` — is copied verbatim.
fn string_or_empty(attributes: &RecordMap, key: &str) -> Value {
    attributes.get(key).cloned().unwrap_or_else(|| Value::String(String::new()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn make_state(resources: Value) -> TfState {
        serde_json::from_value(json!({
            "version": 4,
            "terraform_version": "1.4.5",
            "resources": resources,
        }))
        .expect("valid state")
    }

    #[test]
    fn extracts_repository_and_membership_blocks() {
        let state = make_state(json!([
            {
                "type": "github_repository",
                "name": "repo1",
                "instances": [
                    {"attributes": {"name": "repo1", "visibility": "public"}}
                ]
            },
            {
                "type": "github_membership",
                "name": "user1",
                "instances": [
                    {"attributes": {"username": "user1", "role": "member"}}
                ]
            }
        ]));

        let extracted = extract_resources(&state).unwrap();

        assert_eq!(
            serde_json::to_value(&extracted).unwrap(),
            json!({
                "repositories": [{
                    "repository_name": "repo1",
                    "description": "",
                    "visibility": "public",
                    "gitignore_template": null,
                }],
                "teams": [],
                "memberships": [{"username": "user1", "role": "member"}],
                "repository_collaborators": [],
            })
        );
    }

    #[test]
    fn block_without_instances_extracts_nothing() {
        let state = make_state(json!([
            {"type": "github_repository", "name": "orphan"},
            {
                "type": "github_membership",
                "name": "user1",
                "instances": [{"attributes": {"username": "user1", "role": "member"}}]
            }
        ]));

        let extracted = extract_resources(&state).unwrap();

        assert!(extracted.repositories.is_empty());
        assert_eq!(extracted.memberships.len(), 1);
    }

    #[test]
    fn explicit_null_instances_fails() {
        let state = make_state(json!([{
            "type": "github_repository",
            "name": "repo1",
            "instances": null
        }]));

        let err = extract_resources(&state).unwrap_err();

        assert!(matches!(err, StateError::Instances { .. }));
    }

    #[test]
    fn unrecognized_types_are_skipped() {
        let state = make_state(json!([
            {"type": "github_branch_protection", "name": "main", "instances": "not even a list"},
            {
                "type": "github_team",
                "name": "devs",
                "instances": [{"attributes": {"name": "devs", "privacy": "closed"}}]
            }
        ]));

        let extracted = extract_resources(&state).unwrap();

        assert_eq!(extracted.teams.len(), 1);
        assert_eq!(extracted.total(), 1);
    }

    #[test]
    fn team_members_are_always_empty() {
        let state = make_state(json!([{
            "type": "github_team",
            "name": "devs",
            "instances": [{"attributes": {
                "name": "devs",
                "description": "The devs",
                "privacy": "secret",
                "members": ["left", "over"],
            }}]
        }]));

        let extracted = extract_resources(&state).unwrap();

        assert_eq!(extracted.teams[0]["members"], json!([]));
        assert_eq!(extracted.teams[0]["privacy"], json!("secret"));
    }

    #[test]
    fn collaborator_id_is_derived_from_repository_and_username() {
        let state = make_state(json!([{
            "type": "github_repository_collaborator",
            "name": "collab",
            "instances": [{"attributes": {
                "repository": "repo1",
                "username": "user1",
                "permission": "push",
            }}]
        }]));

        let extracted = extract_resources(&state).unwrap();

        let record = &extracted.repository_collaborators[0];
        assert_eq!(record["collaborator_id"], json!("repo1_user1"));
        assert_eq!(record["repository_name"], json!("repo1"));
    }

    #[test]
    fn missing_required_attribute_fails_extraction() {
        let state = make_state(json!([{
            "type": "github_repository",
            "name": "repo1",
            "instances": [{"attributes": {"name": "repo1"}}]
        }]));

        let err = extract_resources(&state).unwrap_err();

        assert!(matches!(err, StateError::MissingKey { .. }));
        assert!(err.to_string().contains("visibility"));
        assert!(err.to_string().contains("github_repository"));
    }

    #[test]
    fn malformed_instances_on_recognized_type_fails() {
        let state = make_state(json!([{
            "type": "github_repository",
            "name": "repo1",
            "instances": 42
        }]));

        let err = extract_resources(&state).unwrap_err();

        assert!(matches!(err, StateError::Instances { .. }));
        assert!(err.to_string().contains("github_repository"));
    }

    #[test]
    fn block_and_instance_order_is_preserved() {
        let state = make_state(json!([
            {
                "type": "github_repository",
                "name": "a",
                "instances": [
                    {"attributes": {"name": "r1", "visibility": "public"}},
                    {"attributes": {"name": "r2", "visibility": "public"}}
                ]
            },
            {
                "type": "github_repository",
                "name": "b",
                "instances": [{"attributes": {"name": "r3", "visibility": "private"}}]
            }
        ]));

        let extracted = extract_resources(&state).unwrap();

        let names: Vec<&Value> =
            extracted.repositories.iter().map(|r| &r["repository_name"]).collect();
        assert_eq!(names, vec![&json!("r1"), &json!("r2"), &json!("r3")]);
    }

    #[test]
    fn explicit_null_description_is_copied_verbatim() {
        let state = make_state(json!([{
            "type": "github_repository",
            "name": "repo1",
            "instances": [{"attributes": {
                "name": "repo1",
                "description": null,
                "visibility": "public",
            }}]
        }]));

        let extracted = extract_resources(&state).unwrap();

        assert_eq!(extracted.repositories[0]["description"], Value::Null);
    }

    #[test]
    fn empty_snapshot_extracts_nothing() {
        let extracted = extract_resources(&TfState::empty()).unwrap();
        assert_eq!(extracted, ExtractedState::default());
    }

    #[test]
    fn empty_snapshot_serializes_without_serial() {
        let json = serde_json::to_string(&TfState::empty()).unwrap();
        assert!(json.contains("\"version\":4"));
        assert!(!json.contains("serial"));
    }

    #[test]
    fn save_and_load_existing_state_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("terraform").join("existing_resources.json");

        let state = make_state(json!([{
            "type": "github_membership",
            "name": "user1",
            "instances": [{"attributes": {"username": "user1", "role": "admin"}}]
        }]));
        let extracted = extract_resources(&state).unwrap();

        save_existing_state(&extracted, &path).expect("save");
        let loaded = load_existing_state(&path).expect("load");

        assert_eq!(loaded, extracted);
        let tmp = PathBuf::from(format!("{}.tmp", path.display()));
        assert!(!tmp.exists(), ".tmp must be gone after a successful save");
    }

    #[test]
    fn save_tfstate_scaffolds_a_loadable_empty_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("terraform").join("terraform.tfstate");

        save_tfstate(&TfState::empty(), &path).expect("save");
        let loaded = load_tfstate(&path).expect("load");

        assert_eq!(loaded.version, 4);
        assert_eq!(loaded.terraform_version, "1.4.5");
        assert!(loaded.resources.is_empty());
    }

    #[test]
    fn load_tfstate_reports_missing_file_with_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.tfstate");
        let err = load_tfstate(&path).unwrap_err();
        assert!(matches!(err, StateError::Io { .. }));
        assert!(err.to_string().contains("nope.tfstate"));
    }

    #[test]
    fn load_tfstate_reports_parse_errors_with_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.tfstate");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_tfstate(&path).unwrap_err();
        assert!(matches!(err, StateError::Parse { .. }));
        assert!(err.to_string().contains("broken.tfstate"));
    }
}
