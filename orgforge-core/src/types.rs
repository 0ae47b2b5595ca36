//! Domain types for orgforge resources.
//!
//! Desired-state records are typed and validated here, at construction.
//! Everything downstream of ingestion — extraction output, diff output,
//! render input — is a plain [`RecordMap`], so the diff engine treats all
//! fields opaquely.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Plain mapping representation of one resource instance — the shared
/// vocabulary between extraction, diffing, and rendering.
pub type RecordMap = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Value enums
// ---------------------------------------------------------------------------

/// Repository visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Internal,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
            Visibility::Internal => write!(f, "internal"),
        }
    }
}

/// Team privacy level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TeamPrivacy {
    #[default]
    Closed,
    Secret,
    Open,
}

impl fmt::Display for TeamPrivacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamPrivacy::Closed => write!(f, "closed"),
            TeamPrivacy::Secret => write!(f, "secret"),
            TeamPrivacy::Open => write!(f, "open"),
        }
    }
}

/// Role of a user within a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    #[default]
    Member,
    Maintainer,
}

impl fmt::Display for TeamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamRole::Member => write!(f, "member"),
            TeamRole::Maintainer => write!(f, "maintainer"),
        }
    }
}

/// Role of a user within the organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrgRole {
    #[default]
    Member,
    Admin,
}

impl fmt::Display for OrgRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrgRole::Member => write!(f, "member"),
            OrgRole::Admin => write!(f, "admin"),
        }
    }
}

/// Permission granted to a repository collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CollaboratorPermission {
    #[default]
    Pull,
    Push,
    Admin,
}

impl fmt::Display for CollaboratorPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollaboratorPermission::Pull => write!(f, "pull"),
            CollaboratorPermission::Push => write!(f, "push"),
            CollaboratorPermission::Admin => write!(f, "admin"),
        }
    }
}

// ---------------------------------------------------------------------------
// Resource records
// ---------------------------------------------------------------------------

/// A GitHub repository as declared in the desired state.
///
/// `gitignore_template` serializes as `null` when unset so requested and
/// extracted records present the same key set to the diff engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    pub repository_name: String,
    pub description: String,
    pub visibility: Visibility,
    pub gitignore_template: Option<String>,
    pub allow_delete: bool,
}

/// A GitHub team and its declared members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    pub team_name: String,
    pub description: String,
    pub privacy: TeamPrivacy,
    pub members: Vec<TeamMember>,
    pub allow_delete: bool,
}

/// One member entry inside a [`Team`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamMember {
    pub username: String,
    pub role: TeamRole,
}

/// An organization membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Membership {
    pub username: String,
    pub role: OrgRole,
    pub allow_delete: bool,
}

/// An outside collaborator on a single repository.
///
/// `collaborator_id` is the composite unique key
/// `<repository_name>_<username>`, computed once at construction and carried
/// on the record so both sides of a diff expose it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryCollaborator {
    pub collaborator_id: String,
    pub repository_name: String,
    pub username: String,
    pub permission: CollaboratorPermission,
    pub allow_delete: bool,
}

impl RepositoryCollaborator {
    /// Build a collaborator record, deriving `collaborator_id`.
    pub fn new(
        repository_name: impl Into<String>,
        username: impl Into<String>,
        permission: CollaboratorPermission,
        allow_delete: bool,
    ) -> Self {
        let repository_name = repository_name.into();
        let username = username.into();
        let collaborator_id = format!("{repository_name}_{username}");
        RepositoryCollaborator {
            collaborator_id,
            repository_name,
            username,
            permission,
            allow_delete,
        }
    }
}

// ---------------------------------------------------------------------------
// ResourceKind
// ---------------------------------------------------------------------------

/// The four resource kinds orgforge reconciles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Repository,
    Team,
    Membership,
    RepositoryCollaborator,
}

impl ResourceKind {
    /// All kinds, in processing order.
    pub fn all() -> &'static [ResourceKind] {
        &[
            ResourceKind::Repository,
            ResourceKind::Team,
            ResourceKind::Membership,
            ResourceKind::RepositoryCollaborator,
        ]
    }

    /// The `type` discriminator this kind carries in a Terraform state file.
    pub fn state_type(&self) -> &'static str {
        match self {
            ResourceKind::Repository => "github_repository",
            ResourceKind::Team => "github_team",
            ResourceKind::Membership => "github_membership",
            ResourceKind::RepositoryCollaborator => "github_repository_collaborator",
        }
    }

    /// Map a state-file `type` discriminator back to a kind.
    ///
    /// Returns `None` for unrecognized types — the extractor skips those.
    pub fn from_state_type(s: &str) -> Option<ResourceKind> {
        ResourceKind::all()
            .iter()
            .copied()
            .find(|kind| kind.state_type() == s)
    }

    /// The field that distinguishes records within this kind's collection.
    pub fn unique_key(&self) -> &'static str {
        match self {
            ResourceKind::Repository => "repository_name",
            ResourceKind::Team => "team_name",
            ResourceKind::Membership => "username",
            ResourceKind::RepositoryCollaborator => "collaborator_id",
        }
    }

    /// File name of the rendered artifact for the record whose unique key is
    /// `key`.
    pub fn artifact_name(&self, key: &str) -> String {
        match self {
            ResourceKind::Repository => format!("{key}_repository.tf"),
            ResourceKind::Team => format!("{key}_team.tf"),
            ResourceKind::Membership => format!("{key}_membership.tf"),
            ResourceKind::RepositoryCollaborator => format!("{key}_collaborator.tf"),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Repository => write!(f, "repository"),
            ResourceKind::Team => write!(f, "team"),
            ResourceKind::Membership => write!(f, "membership"),
            ResourceKind::RepositoryCollaborator => write!(f, "repository_collaborator"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
