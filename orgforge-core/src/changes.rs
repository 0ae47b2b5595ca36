//! The change set: per-kind diff outputs bundled for one reconciliation pass.

use crate::diff::ResourceDiff;
use crate::types::{RecordMap, ResourceKind};

/// Aggregate of every add/update/delete sequence across the four resource
/// kinds for a single reconciliation pass.
///
/// Twelve sequences, all required at construction — the aggregate never
/// fills in defaults. It has no lifecycle beyond being handed to the
/// resource processor once.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceChanges {
    pub repositories_to_add: Vec<RecordMap>,
    pub repositories_to_update: Vec<RecordMap>,
    pub repositories_to_delete: Vec<RecordMap>,
    pub teams_to_add: Vec<RecordMap>,
    pub teams_to_update: Vec<RecordMap>,
    pub teams_to_delete: Vec<RecordMap>,
    pub memberships_to_add: Vec<RecordMap>,
    pub memberships_to_update: Vec<RecordMap>,
    pub memberships_to_delete: Vec<RecordMap>,
    pub repository_collaborators_to_add: Vec<RecordMap>,
    pub repository_collaborators_to_update: Vec<RecordMap>,
    pub repository_collaborators_to_delete: Vec<RecordMap>,
}

impl ResourceChanges {
    /// Bundle the four per-kind diffs into one change set.
    pub fn from_diffs(
        repositories: ResourceDiff,
        teams: ResourceDiff,
        memberships: ResourceDiff,
        repository_collaborators: ResourceDiff,
    ) -> Self {
        ResourceChanges {
            repositories_to_add: repositories.to_add,
            repositories_to_update: repositories.to_update,
            repositories_to_delete: repositories.to_delete,
            teams_to_add: teams.to_add,
            teams_to_update: teams.to_update,
            teams_to_delete: teams.to_delete,
            memberships_to_add: memberships.to_add,
            memberships_to_update: memberships.to_update,
            memberships_to_delete: memberships.to_delete,
            repository_collaborators_to_add: repository_collaborators.to_add,
            repository_collaborators_to_update: repository_collaborators.to_update,
            repository_collaborators_to_delete: repository_collaborators.to_delete,
        }
    }

    /// The (add, update, delete) sequences for `kind`, in operation order.
    pub fn for_kind(&self, kind: ResourceKind) -> [&[RecordMap]; 3] {
        match kind {
            ResourceKind::Repository => [
                &self.repositories_to_add,
                &self.repositories_to_update,
                &self.repositories_to_delete,
            ],
            ResourceKind::Team => {
                [&self.teams_to_add, &self.teams_to_update, &self.teams_to_delete]
            }
            ResourceKind::Membership => [
                &self.memberships_to_add,
                &self.memberships_to_update,
                &self.memberships_to_delete,
            ],
            ResourceKind::RepositoryCollaborator => [
                &self.repository_collaborators_to_add,
                &self.repository_collaborators_to_update,
                &self.repository_collaborators_to_delete,
            ],
        }
    }

    /// Number of records queued for addition, across kinds.
    pub fn added(&self) -> usize {
        ResourceKind::all().iter().map(|k| self.for_kind(*k)[0].len()).sum()
    }

    /// Number of records queued for update, across kinds.
    pub fn updated(&self) -> usize {
        ResourceKind::all().iter().map(|k| self.for_kind(*k)[1].len()).sum()
    }

    /// Number of records queued for deletion, across kinds.
    pub fn deleted(&self) -> usize {
        ResourceKind::all().iter().map(|k| self.for_kind(*k)[2].len()).sum()
    }

    /// Total number of records across all twelve sequences.
    pub fn total(&self) -> usize {
        self.added() + self.updated() + self.deleted()
    }

    /// True when every sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
