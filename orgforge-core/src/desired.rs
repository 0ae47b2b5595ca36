//! Desired-state ingestion.
//!
//! Input arrives as four JSON arrays (one per resource kind), usually via
//! environment variables. Raw input shapes leave fields covered by a
//! configured default optional; [`DesiredState::parse`] resolves them
//! against [`Config`] once, at ingestion, so the diff engine only ever sees
//! fully-resolved records.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::Config;
use crate::error::DesiredError;
use crate::types::{
    CollaboratorPermission, Membership, OrgRole, Repository, RepositoryCollaborator, ResourceKind,
    Team, TeamMember, TeamPrivacy, TeamRole, Visibility,
};

/// Environment variables read by [`DesiredSource::from_env`].
pub const REPOSITORIES_VAR: &str = "REPOSITORIES";
pub const TEAMS_VAR: &str = "TEAMS";
pub const MEMBERSHIPS_VAR: &str = "MEMBERSHIPS";
pub const REPOSITORY_COLLABORATORS_VAR: &str = "REPOSITORY_COLLABORATORS";

const EMPTY_LIST: &str = "[]";

// ---------------------------------------------------------------------------
// Input source
// ---------------------------------------------------------------------------

/// The four raw JSON documents describing the desired state.
#[derive(Debug, Clone)]
pub struct DesiredSource {
    pub repositories: String,
    pub teams: String,
    pub memberships: String,
    pub repository_collaborators: String,
}

impl Default for DesiredSource {
    fn default() -> Self {
        DesiredSource {
            repositories: EMPTY_LIST.to_owned(),
            teams: EMPTY_LIST.to_owned(),
            memberships: EMPTY_LIST.to_owned(),
            repository_collaborators: EMPTY_LIST.to_owned(),
        }
    }
}

impl DesiredSource {
    /// Read the four input documents from the environment. Absent variables
    /// fall back to empty arrays.
    pub fn from_env() -> Self {
        DesiredSource {
            repositories: env_or_empty(REPOSITORIES_VAR),
            teams: env_or_empty(TEAMS_VAR),
            memberships: env_or_empty(MEMBERSHIPS_VAR),
            repository_collaborators: env_or_empty(REPOSITORY_COLLABORATORS_VAR),
        }
    }
}

fn env_or_empty(var: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| EMPTY_LIST.to_owned())
}

// ---------------------------------------------------------------------------
// Raw input shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RepositorySpec {
    repository_name: String,
    #[serde(default)]
    description: String,
    visibility: Option<Visibility>,
    gitignore_template: Option<String>,
    #[serde(default)]
    allow_delete: bool,
}

impl RepositorySpec {
    fn resolve(self, config: &Config) -> Repository {
        Repository {
            repository_name: self.repository_name,
            description: self.description,
            visibility: self.visibility.unwrap_or(config.default_repository.visibility),
            // The literal string "None" is a legacy sentinel for "omit".
            gitignore_template: self.gitignore_template.filter(|t| t != "None"),
            allow_delete: self.allow_delete,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TeamMemberSpec {
    username: String,
    role: Option<TeamRole>,
}

#[derive(Debug, Deserialize)]
struct TeamSpec {
    team_name: String,
    #[serde(default)]
    description: String,
    privacy: Option<TeamPrivacy>,
    #[serde(default)]
    members: Vec<TeamMemberSpec>,
    #[serde(default)]
    allow_delete: bool,
}

impl TeamSpec {
    fn resolve(self, config: &Config) -> Team {
        Team {
            team_name: self.team_name,
            description: self.description,
            privacy: self.privacy.unwrap_or(config.default_team.privacy),
            members: self
                .members
                .into_iter()
                .map(|member| TeamMember {
                    username: member.username,
                    role: member.role.unwrap_or(config.default_team.role),
                })
                .collect(),
            allow_delete: self.allow_delete,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MembershipSpec {
    username: String,
    role: Option<OrgRole>,
    #[serde(default)]
    allow_delete: bool,
}

impl MembershipSpec {
    fn resolve(self, config: &Config) -> Membership {
        Membership {
            username: self.username,
            role: self.role.unwrap_or(config.default_membership.role),
            allow_delete: self.allow_delete,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RepositoryCollaboratorSpec {
    repository_name: String,
    username: String,
    permission: Option<CollaboratorPermission>,
    #[serde(default)]
    allow_delete: bool,
}

impl RepositoryCollaboratorSpec {
    fn resolve(self, config: &Config) -> RepositoryCollaborator {
        RepositoryCollaborator::new(
            self.repository_name,
            self.username,
            self.permission
                .unwrap_or(config.default_repository_collaborator.permission),
            self.allow_delete,
        )
    }
}

// ---------------------------------------------------------------------------
// DesiredState
// ---------------------------------------------------------------------------

/// Fully-resolved desired state: every record validated and defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DesiredState {
    pub repositories: Vec<Repository>,
    pub teams: Vec<Team>,
    pub memberships: Vec<Membership>,
    pub repository_collaborators: Vec<RepositoryCollaborator>,
}

impl DesiredState {
    /// Parse the four JSON documents and merge config defaults into typed
    /// records. Enum values are validated here; the diff engine downstream
    /// treats every field opaquely.
    pub fn parse(source: &DesiredSource, config: &Config) -> Result<Self, DesiredError> {
        let repositories: Vec<RepositorySpec> =
            parse_kind(ResourceKind::Repository, &source.repositories)?;
        let teams: Vec<TeamSpec> = parse_kind(ResourceKind::Team, &source.teams)?;
        let memberships: Vec<MembershipSpec> =
            parse_kind(ResourceKind::Membership, &source.memberships)?;
        let collaborators: Vec<RepositoryCollaboratorSpec> = parse_kind(
            ResourceKind::RepositoryCollaborator,
            &source.repository_collaborators,
        )?;

        Ok(DesiredState {
            repositories: repositories.into_iter().map(|s| s.resolve(config)).collect(),
            teams: teams.into_iter().map(|s| s.resolve(config)).collect(),
            memberships: memberships.into_iter().map(|s| s.resolve(config)).collect(),
            repository_collaborators: collaborators
                .into_iter()
                .map(|s| s.resolve(config))
                .collect(),
        })
    }

    /// Total number of declared records across all kinds.
    pub fn total(&self) -> usize {
        self.repositories.len()
            + self.teams.len()
            + self.memberships.len()
            + self.repository_collaborators.len()
    }

    /// True when no records are declared at all.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

fn parse_kind<T: DeserializeOwned>(kind: ResourceKind, input: &str) -> Result<Vec<T>, DesiredError> {
    serde_json::from_str(input).map_err(|source| DesiredError::Parse { kind, source })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn source(repositories: &str, teams: &str, memberships: &str, collaborators: &str) -> DesiredSource {
        DesiredSource {
            repositories: repositories.to_owned(),
            teams: teams.to_owned(),
            memberships: memberships.to_owned(),
            repository_collaborators: collaborators.to_owned(),
        }
    }

    #[test]
    fn defaults_merge_into_unspecified_fields() {
        let mut config = Config::default();
        config.default_repository.visibility = Visibility::Private;
        config.default_team.role = TeamRole::Maintainer;

        let input = source(
            r#"[{"repository_name": "repo1"}]"#,
            r#"[{"team_name": "devs", "members": [{"username": "a"}, {"username": "b", "role": "member"}]}]"#,
            r#"[{"username": "user1"}]"#,
            r#"[{"repository_name": "repo1", "username": "user1"}]"#,
        );

        let desired = DesiredState::parse(&input, &config).unwrap();

        assert_eq!(desired.repositories[0].visibility, Visibility::Private);
        assert_eq!(desired.repositories[0].description, "");
        assert!(!desired.repositories[0].allow_delete);
        assert_eq!(desired.teams[0].privacy, TeamPrivacy::Closed);
        assert_eq!(desired.teams[0].members[0].role, TeamRole::Maintainer);
        assert_eq!(desired.teams[0].members[1].role, TeamRole::Member);
        assert_eq!(desired.memberships[0].role, OrgRole::Member);
        assert_eq!(
            desired.repository_collaborators[0].permission,
            CollaboratorPermission::Pull
        );
        assert_eq!(desired.repository_collaborators[0].collaborator_id, "repo1_user1");
    }

    #[test]
    fn explicit_fields_override_defaults() {
        let input = source(
            r#"[{"repository_name": "repo1", "visibility": "internal", "allow_delete": true}]"#,
            "[]",
            r#"[{"username": "root", "role": "admin"}]"#,
            "[]",
        );

        let desired = DesiredState::parse(&input, &Config::default()).unwrap();

        assert_eq!(desired.repositories[0].visibility, Visibility::Internal);
        assert!(desired.repositories[0].allow_delete);
        assert_eq!(desired.memberships[0].role, OrgRole::Admin);
    }

    #[test]
    fn gitignore_none_sentinel_is_dropped() {
        let input = source(
            r#"[
                {"repository_name": "a", "gitignore_template": "None"},
                {"repository_name": "b", "gitignore_template": "Python"},
                {"repository_name": "c"}
            ]"#,
            "[]",
            "[]",
            "[]",
        );

        let desired = DesiredState::parse(&input, &Config::default()).unwrap();

        assert_eq!(desired.repositories[0].gitignore_template, None);
        assert_eq!(desired.repositories[1].gitignore_template, Some("Python".to_owned()));
        assert_eq!(desired.repositories[2].gitignore_template, None);
    }

    #[test]
    fn invalid_enum_value_is_rejected_naming_the_kind() {
        let input = source(r#"[{"repository_name": "a", "visibility": "publik"}]"#, "[]", "[]", "[]");

        let err = DesiredState::parse(&input, &Config::default()).unwrap_err();

        let DesiredError::Parse { kind, .. } = err;
        assert_eq!(kind, ResourceKind::Repository);
    }

    #[test]
    fn malformed_json_is_rejected_naming_the_kind() {
        let input = source("[]", "[]", "not json", "[]");

        let err = DesiredState::parse(&input, &Config::default()).unwrap_err();

        assert!(err.to_string().contains("membership"));
        let DesiredError::Parse { kind, .. } = err;
        assert_eq!(kind, ResourceKind::Membership);
    }

    #[test]
    fn default_source_parses_to_empty_state() {
        let desired = DesiredState::parse(&DesiredSource::default(), &Config::default()).unwrap();
        assert!(desired.is_empty());
        assert_eq!(desired.total(), 0);
    }
}
