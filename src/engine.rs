// The engine's single entry point: one diff document and one dependency
// document in, one impact report (plus skipped-record diagnostics) out.

use log::debug;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::changeset::ChangeSet;
use crate::dependency::{self, Dependency};
use crate::diff_reducer;
use crate::errors::{EngineError, SkippedDependency};
use crate::matcher;
use crate::replacement;
use crate::report::{ImpactRecord, ImpactReport};

/// Outcome of one engine invocation: the report plus any dependency records
/// skipped as malformed, so the caller can log or display them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAnalysis {
    pub report: ImpactReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_dependencies: Vec<SkippedDependency>,
}

/// Runs the full correlation pipeline: reduce the differ output, parse the
/// dependency graph, detect path replacements, match every dependency and
/// assemble the report.
///
/// Synchronous and free of I/O; every invocation constructs its state
/// fresh, so independent runs are safe to execute in parallel from a
/// caller's pipeline. A malformed diff document or a non-array dependency
/// document aborts the run; individual bad dependency records are skipped.
pub fn analyze(diff: &Value, dependencies: &Value) -> Result<ImpactAnalysis, EngineError> {
    let started = Instant::now();

    let changeset = diff_reducer::reduce(diff)?;
    let (parsed, skipped) = dependency::parse_dependencies(dependencies)?;
    let replacements = replacement::detect_replacements(&changeset);

    let records = correlate(&changeset, &replacements, &parsed);
    debug!(
        "correlated {} dependencies into {} impact records ({} skipped)",
        parsed.len(),
        records.len(),
        skipped.len()
    );

    let report = ImpactReport::new(changeset.summary(), records, started.elapsed());
    Ok(ImpactAnalysis {
        report,
        skipped_dependencies: skipped,
    })
}

/// Matches each dependency in input order; dependencies without findings
/// are dropped rather than reported as empty records.
fn correlate(
    changeset: &ChangeSet,
    replacements: &BTreeMap<String, String>,
    dependencies: &[Dependency],
) -> Vec<ImpactRecord> {
    let mut records = Vec::new();
    for dep in dependencies {
        let details = matcher::match_dependency(changeset, replacements, dep);
        if details.is_empty() {
            continue;
        }
        records.push(ImpactRecord {
            service_name: dep.service_name.clone(),
            external_call: dep.external_call.clone(),
            originating_endpoints: dep.originating_endpoints.clone(),
            details,
        });
    }
    records
}
