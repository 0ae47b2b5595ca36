//! YAML configuration for an orgforge working directory.
//!
//! The config names the working paths and holds the kind-level defaults
//! merged into desired-state records at ingestion. Every field has a
//! default, so an empty file — or no file, via [`Config::default`] — is a
//! valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{CollaboratorPermission, OrgRole, TeamPrivacy, TeamRole, Visibility};

// ---------------------------------------------------------------------------
// Kind-level defaults
// ---------------------------------------------------------------------------

/// Defaults for repository records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RepositoryDefaults {
    pub visibility: Visibility,
}

/// Defaults for team records and their member entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TeamDefaults {
    pub privacy: TeamPrivacy,
    /// Role given to team members that do not specify one.
    pub role: TeamRole,
}

/// Defaults for organization membership records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MembershipDefaults {
    pub role: OrgRole,
}

/// Defaults for repository collaborator records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CollaboratorDefaults {
    pub permission: CollaboratorPermission,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Root configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory of user template overrides; `None` uses only the embedded
    /// templates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<PathBuf>,
    /// Directory holding rendered artifacts and state files.
    pub output_dir: PathBuf,
    /// Terraform state file, relative to `output_dir`.
    pub tfstate_file: PathBuf,
    /// Persisted extracted-state file, relative to `output_dir`.
    pub state_file: PathBuf,
    pub default_repository: RepositoryDefaults,
    pub default_team: TeamDefaults,
    pub default_membership: MembershipDefaults,
    pub default_repository_collaborator: CollaboratorDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            template_dir: None,
            output_dir: PathBuf::from("terraform"),
            tfstate_file: PathBuf::from("terraform.tfstate"),
            state_file: PathBuf::from("existing_resources.json"),
            default_repository: RepositoryDefaults::default(),
            default_team: TeamDefaults::default(),
            default_membership: MembershipDefaults::default(),
            default_repository_collaborator: CollaboratorDefaults::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ConfigError::Parse { path: path.to_path_buf(), source: e })
    }

    /// Atomically save configuration as YAML, creating parent directories.
    ///
    /// Write flow: serialize → `.tmp` sibling → `rename`.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let tmp = PathBuf::from(format!("{}.tmp", path.display()));
        std::fs::write(&tmp, yaml)?;
        if let Err(e) = std::fs::rename(&tmp, path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(ConfigError::Io(e));
        }
        Ok(())
    }

    /// Apply a command-line output directory override, if one was given.
    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = output_dir {
            self.output_dir = dir;
        }
        self
    }

    /// Full path of the Terraform state file.
    pub fn tfstate_path(&self) -> PathBuf {
        self.output_dir.join(&self.tfstate_file)
    }

    /// Full path of the persisted extracted-state file.
    pub fn state_path(&self) -> PathBuf {
        self.output_dir.join(&self.state_file)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
