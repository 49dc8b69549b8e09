// Normalized view of one spec diff. Produced once per run by the diff
// reducer; every downstream component reads this instead of the raw differ
// output.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::types::{HttpMethod, OperationKey};

/// Property-level delta accumulated for one modified operation.
///
/// All property collections are sets of field names; duplicates collapse and
/// order is not significant. Response deltas are keyed by status code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDelta {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub request_added: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub request_removed: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub response_added: BTreeMap<String, BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub response_removed: BTreeMap<String, BTreeSet<String>>,
}

impl OperationDelta {
    pub fn is_empty(&self) -> bool {
        self.request_added.is_empty()
            && self.request_removed.is_empty()
            && self.response_added.is_empty()
            && self.response_removed.is_empty()
    }
}

/// Property delta for one named component schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDelta {
    pub schema: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub added: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub removed: BTreeSet<String>,
}

/// One modified operation together with its accumulated delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationChange {
    pub path: String,
    pub method: HttpMethod,
    pub delta: OperationDelta,
}

/// The normalized change set for one old/new spec pair.
///
/// Invariant: a path template appears in at most one of `added_paths` /
/// `removed_paths`, and `modified_operations` reference paths absent from
/// both. The reducer rejects diffs violating either half.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub added_paths: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub removed_paths: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modified_operations: Vec<OperationChange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schema_property_changes: Vec<SchemaDelta>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added_paths.is_empty()
            && self.removed_paths.is_empty()
            && self.modified_operations.is_empty()
            && self.schema_property_changes.is_empty()
    }

    /// Delta for an exact (path, method) pair, if one was recorded.
    pub fn operation_delta(&self, path: &str, method: HttpMethod) -> Option<&OperationDelta> {
        self.modified_operations
            .iter()
            .find(|change| change.method == method && change.path == path)
            .map(|change| &change.delta)
    }

    /// Compact view carried at the top of the impact report.
    pub fn summary(&self) -> ChangeSetSummary {
        ChangeSetSummary {
            added_paths: self.added_paths.iter().cloned().collect(),
            removed_paths: self.removed_paths.iter().cloned().collect(),
            modified_operations: self
                .modified_operations
                .iter()
                .map(|change| OperationKey {
                    path: change.path.clone(),
                    method: change.method,
                })
                .collect(),
            changed_schemas: self
                .schema_property_changes
                .iter()
                .map(|delta| delta.schema.clone())
                .collect(),
        }
    }
}

/// What changed, without the per-property detail. This is the changeset
/// section of the report consumed by CI annotations and the narrative
/// generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSetSummary {
    pub added_paths: Vec<String>,
    pub removed_paths: Vec<String>,
    pub modified_operations: Vec<OperationKey>,
    pub changed_schemas: Vec<String>,
}
