// Engine-side half of the narrative generator contract. The engine never
// calls the generator during analysis; a pipeline invokes it strictly after
// the report is built.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::errors::NarrativeError;
use crate::report::ImpactReport;

/// System prompt handed to a language-model-backed generator.
pub const SYSTEM_PROMPT: &str = "You are a software architecture assistant helping developers \
     understand the impact of API changes.";

/// Two-message prompt payload for a narrative generator: a fixed system
/// instruction plus a compact JSON view of the impact report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeContext {
    pub system: String,
    pub user: String,
}

/// Adapter seam for the downstream narrative generator (a language model
/// client in the reference deployment, a canned fixture in tests).
pub trait NarrativeGenerator {
    fn narrate(&self, context: &NarrativeContext) -> Result<String, NarrativeError>;
}

/// Builds the narrative context from a finished report. Pure; the payload
/// carries only what a reviewer-facing narrative needs: the changed paths
/// and the impacted services with their findings and originating endpoints.
pub fn build_narrative_context(report: &ImpactReport) -> NarrativeContext {
    let impacted_services: Vec<_> = report
        .records
        .iter()
        .map(|record| {
            json!({
                "service_name": record.service_name,
                "affected_by": {
                    "external_service": record.external_call.service,
                    "path": record.external_call.path,
                    "method": record.external_call.method,
                },
                "findings": record.details.iter().map(|detail| json!({
                    "change_type": detail.change_type,
                    "impact_type": detail.impact_type,
                    "severity": detail.severity,
                    "description": detail.description,
                })).collect::<Vec<_>>(),
                "impacted_endpoints": record.originating_endpoints.iter().map(|origin| json!({
                    "path": origin.path,
                    "api": origin.api,
                    "internal_trace": origin.internal_trace,
                })).collect::<Vec<_>>(),
            })
        })
        .collect();

    let payload = json!({
        "summary": report.summary(),
        "changed_api_paths": {
            "added": report.changes.added_paths,
            "removed": report.changes.removed_paths,
            "modified": report.changes.modified_operations,
        },
        "impacted_services": impacted_services,
    });

    NarrativeContext {
        system: SYSTEM_PROMPT.to_string(),
        user: serde_json::to_string_pretty(&payload).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changeset::ChangeSetSummary;
    use crate::dependency::{ExternalCall, OriginatingEndpoint};
    use crate::report::ImpactRecord;
    use crate::severity::classify;
    use crate::types::{ChangeType, HttpMethod, ImpactDetail};
    use std::time::Duration;

    fn sample_report() -> ImpactReport {
        let (impact_type, severity) = classify(ChangeType::PathVersioned);
        ImpactReport::new(
            ChangeSetSummary {
                removed_paths: vec!["/v1/users/{id}".to_string()],
                added_paths: vec!["/v2/users/{id}".to_string()],
                ..Default::default()
            },
            vec![ImpactRecord {
                service_name: "checkout".to_string(),
                external_call: ExternalCall {
                    service: "userdata-api".to_string(),
                    path: "/v1/users/{id}".to_string(),
                    method: HttpMethod::Get,
                },
                originating_endpoints: vec![OriginatingEndpoint {
                    path: "/checkout/start".to_string(),
                    api: "startCheckout".to_string(),
                    internal_trace: vec![
                        "CheckoutController".to_string(),
                        "UserClient.fetch".to_string(),
                    ],
                }],
                details: vec![ImpactDetail {
                    change_type: ChangeType::PathVersioned,
                    impact_type,
                    severity,
                    description: "endpoint moved".to_string(),
                    fields: Vec::new(),
                    status_code: None,
                    schema: None,
                    before: Some("/v1/users/{id}".to_string()),
                    after: Some("/v2/users/{id}".to_string()),
                }],
            }],
            Duration::from_millis(2),
        )
    }

    #[test]
    fn test_context_carries_services_and_paths() {
        let context = build_narrative_context(&sample_report());
        assert_eq!(context.system, SYSTEM_PROMPT);

        let payload: serde_json::Value = serde_json::from_str(&context.user).unwrap();
        assert_eq!(payload["impacted_services"][0]["service_name"], "checkout");
        assert_eq!(
            payload["impacted_services"][0]["findings"][0]["change_type"],
            "path_versioned"
        );
        assert_eq!(
            payload["impacted_services"][0]["impacted_endpoints"][0]["internal_trace"][1],
            "UserClient.fetch"
        );
        assert_eq!(payload["changed_api_paths"]["removed"][0], "/v1/users/{id}");
    }

    #[test]
    fn test_generator_seam_is_callable() {
        struct Fixture;
        impl NarrativeGenerator for Fixture {
            fn narrate(&self, context: &NarrativeContext) -> Result<String, NarrativeError> {
                Ok(format!("analyzed: {}", context.user.len()))
            }
        }
        let context = build_narrative_context(&sample_report());
        let narrative = Fixture.narrate(&context).unwrap();
        assert!(narrative.starts_with("analyzed:"));
    }
}
