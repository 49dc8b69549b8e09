// The dependency graph input: which service calls which external endpoint,
// and through which of its own routes. Loaded once per run, read-only.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{DependencyRecordError, EngineError, SkippedDependency};
use crate::types::HttpMethod;

/// One outbound call made by some service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    /// Identifier of the calling service.
    pub service_name: String,
    pub external_call: ExternalCall,
    /// Internal routes/functions that lead to this external call, most
    /// specific last. Carried through to the report verbatim for
    /// traceability.
    #[serde(default)]
    pub originating_endpoints: Vec<OriginatingEndpoint>,
}

/// The external endpoint a dependency targets, as known to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalCall {
    /// The service being called.
    #[serde(default)]
    pub service: String,
    pub path: String,
    pub method: HttpMethod,
}

/// An internal route/handler of the calling service that triggers the
/// external call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginatingEndpoint {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub api: String,
    /// Code-path labels from entry point to the call site.
    #[serde(default)]
    pub internal_trace: Vec<String>,
}

/// Parses the dependency document (a JSON array of records).
///
/// A record missing its required fields (`serviceName`, `externalCall.path`,
/// a parseable `externalCall.method`) is skipped with a warning and reported
/// in the returned skip list; one bad record never blocks analysis of the
/// rest of the graph. A document that is not an array is fatal.
pub fn parse_dependencies(
    document: &Value,
) -> Result<(Vec<Dependency>, Vec<SkippedDependency>), EngineError> {
    let records = document.as_array().ok_or_else(|| {
        EngineError::MalformedDependencyInput("dependency document is not a JSON array".to_string())
    })?;

    let mut dependencies = Vec::with_capacity(records.len());
    let mut skipped = Vec::new();

    for (index, record) in records.iter().enumerate() {
        match parse_record(record) {
            Ok(dependency) => dependencies.push(dependency),
            Err(reason) => {
                warn!("skipping dependency record {index}: {reason}");
                skipped.push(SkippedDependency {
                    index,
                    reason: reason.to_string(),
                });
            }
        }
    }

    Ok((dependencies, skipped))
}

fn parse_record(record: &Value) -> Result<Dependency, DependencyRecordError> {
    let dependency: Dependency = serde_json::from_value(record.clone())
        .map_err(|e| DependencyRecordError::Schema(e.to_string()))?;

    if dependency.service_name.trim().is_empty() {
        return Err(DependencyRecordError::MissingField("serviceName"));
    }
    if dependency.external_call.path.trim().is_empty() {
        return Err(DependencyRecordError::MissingField("externalCall.path"));
    }
    Ok(dependency)
}
