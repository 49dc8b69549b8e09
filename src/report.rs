// The impact report: the engine's sole output contract with CI gating and
// the narrative generator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::changeset::ChangeSetSummary;
use crate::dependency::{ExternalCall, OriginatingEndpoint};
use crate::types::{ImpactDetail, Severity};

/// One dependency with at least one classified finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactRecord {
    pub service_name: String,
    pub external_call: ExternalCall,
    /// Carried through verbatim from the dependency record for
    /// traceability.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub originating_endpoints: Vec<OriginatingEndpoint>,
    /// Findings in discovery order: removal, then modification, then
    /// corroborating schema deltas.
    pub details: Vec<ImpactDetail>,
}

impl ImpactRecord {
    pub fn has_breaking_changes(&self) -> bool {
        self.details.iter().any(|d| d.impact_type.is_breaking())
    }

    pub fn highest_severity(&self) -> Option<Severity> {
        self.details.iter().map(|d| d.severity).max()
    }
}

/// Full output of one engine run. Records preserve the order dependencies
/// were supplied in; dependencies without findings are absent, not reported
/// as "no impact" entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactReport {
    pub generated_at: DateTime<Utc>,
    pub analysis_duration_ms: u64,
    pub changes: ChangeSetSummary,
    pub records: Vec<ImpactRecord>,
}

impl ImpactReport {
    pub fn new(
        changes: ChangeSetSummary,
        records: Vec<ImpactRecord>,
        elapsed: Duration,
    ) -> Self {
        ImpactReport {
            generated_at: Utc::now(),
            analysis_duration_ms: elapsed.as_millis() as u64,
            changes,
            records,
        }
    }

    /// True when any finding anywhere in the report is breaking. CI gating
    /// policy (e.g. failing the build on this) is the caller's decision.
    pub fn has_breaking_changes(&self) -> bool {
        self.records.iter().any(ImpactRecord::has_breaking_changes)
    }

    pub fn highest_severity(&self) -> Option<Severity> {
        self.records
            .iter()
            .filter_map(ImpactRecord::highest_severity)
            .max()
    }

    pub fn total_findings(&self) -> usize {
        self.records.iter().map(|r| r.details.len()).sum()
    }

    /// One-line human summary of the run.
    pub fn summary(&self) -> String {
        if self.records.is_empty() {
            return "No dependent services are impacted by this change".to_string();
        }
        let severity = match self.highest_severity() {
            Some(s) => s.to_string(),
            None => "none".to_string(),
        };
        format!(
            "{} impacted service(s), {} finding(s), highest severity: {}",
            self.records.len(),
            self.total_findings(),
            severity
        )
    }
}
