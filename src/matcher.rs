// Dependency matching: correlates one dependency's external call with the
// changeset and emits classified findings.

use std::collections::{BTreeMap, BTreeSet};

use crate::changeset::{ChangeSet, OperationDelta, SchemaDelta};
use crate::dependency::{Dependency, ExternalCall};
use crate::path_normalizer::normalize;
use crate::severity::classify;
use crate::types::{ChangeType, HttpMethod, ImpactDetail};

/// Finds every classified impact of the changeset on one dependency.
/// Returns an empty vec when the dependency is unaffected; such
/// dependencies are dropped from the report entirely.
///
/// Three independent checks run in order, and a dependency may accumulate
/// findings from more than one:
/// 1. removal of the called path (versioned replacement or plain removal),
/// 2. modification of the called operation (exact method, then the `ANY`
///    wildcard probe for coarse-grained diffs),
/// 3. schema property deltas, reported only as corroborating detail once a
///    call is already known to be affected. Coincidental schema edits on an
///    untouched call stay out of the report.
pub fn match_dependency(
    changeset: &ChangeSet,
    replacements: &BTreeMap<String, String>,
    dependency: &Dependency,
) -> Vec<ImpactDetail> {
    let call = &dependency.external_call;
    let mut details = Vec::new();

    if let Some(removed) = removed_path_for(changeset, &call.path) {
        match replacements.get(removed) {
            Some(replacement) => details.push(path_versioned(call, removed, replacement)),
            None => details.push(path_removed(call, removed)),
        }
    }

    if let Some(delta) = modified_operation_for(changeset, call) {
        operation_findings(call, delta, &mut details);
    }

    if !details.is_empty() {
        for delta in &changeset.schema_property_changes {
            schema_findings(delta, &mut details);
        }
    }

    details
}

/// Correlation is by normalized path: the template as the caller knows it
/// may differ from the provider's spelling in version segment or parameter
/// names. An exact raw match is preferred when present.
fn removed_path_for<'a>(changeset: &'a ChangeSet, call_path: &str) -> Option<&'a String> {
    if let Some(exact) = changeset.removed_paths.get(call_path) {
        return Some(exact);
    }
    // A caller already on one of the added paths has migrated; the
    // normalized fallback must not flag it against the path it moved from.
    if changeset.added_paths.contains(call_path) {
        return None;
    }
    let target = normalize(call_path);
    changeset
        .removed_paths
        .iter()
        .find(|removed| normalize(removed) == target)
}

fn modified_operation_for<'a>(
    changeset: &'a ChangeSet,
    call: &ExternalCall,
) -> Option<&'a OperationDelta> {
    let target = normalize(&call.path);
    // exact method first, then the wildcard probe
    find_delta(changeset, &target, |method| method == call.method).or_else(|| {
        find_delta(changeset, &target, |method| {
            method == HttpMethod::Any || call.method == HttpMethod::Any
        })
    })
}

fn find_delta<'a, F>(
    changeset: &'a ChangeSet,
    target: &str,
    method_matches: F,
) -> Option<&'a OperationDelta>
where
    F: Fn(HttpMethod) -> bool,
{
    changeset
        .modified_operations
        .iter()
        .find(|change| method_matches(change.method) && normalize(&change.path) == target)
        .map(|change| &change.delta)
}

fn operation_findings(call: &ExternalCall, delta: &OperationDelta, details: &mut Vec<ImpactDetail>) {
    if !delta.request_added.is_empty() {
        details.push(request_detail(
            call,
            ChangeType::RequestPropertiesAdded,
            &delta.request_added,
        ));
    }
    if !delta.request_removed.is_empty() {
        details.push(request_detail(
            call,
            ChangeType::RequestPropertiesRemoved,
            &delta.request_removed,
        ));
    }
    for (status, fields) in &delta.response_added {
        details.push(response_detail(
            call,
            ChangeType::ResponsePropertiesAdded,
            status,
            fields,
        ));
    }
    for (status, fields) in &delta.response_removed {
        details.push(response_detail(
            call,
            ChangeType::ResponsePropertiesRemoved,
            status,
            fields,
        ));
    }
}

fn schema_findings(delta: &SchemaDelta, details: &mut Vec<ImpactDetail>) {
    if !delta.added.is_empty() {
        details.push(schema_detail(ChangeType::SchemaPropertiesAdded, delta, &delta.added));
    }
    if !delta.removed.is_empty() {
        details.push(schema_detail(ChangeType::SchemaPropertiesRemoved, delta, &delta.removed));
    }
}

fn base_detail(change_type: ChangeType, description: String) -> ImpactDetail {
    let (impact_type, severity) = classify(change_type);
    ImpactDetail {
        change_type,
        impact_type,
        severity,
        description,
        fields: Vec::new(),
        status_code: None,
        schema: None,
        before: None,
        after: None,
    }
}

fn path_removed(call: &ExternalCall, removed: &str) -> ImpactDetail {
    let mut detail = base_detail(
        ChangeType::PathRemoved,
        format!(
            "Called endpoint '{}' was removed with no structurally equivalent replacement",
            removed
        ),
    );
    detail.before = Some(call.path.clone());
    detail
}

fn path_versioned(call: &ExternalCall, removed: &str, replacement: &str) -> ImpactDetail {
    let mut detail = base_detail(
        ChangeType::PathVersioned,
        format!(
            "Called endpoint '{}' was removed; '{}' appears to be its versioned replacement \
             (structural equivalence heuristic, not verified)",
            removed, replacement
        ),
    );
    detail.before = Some(call.path.clone());
    detail.after = Some(replacement.to_string());
    detail
}

fn request_detail(
    call: &ExternalCall,
    change_type: ChangeType,
    fields: &BTreeSet<String>,
) -> ImpactDetail {
    let verb = match change_type {
        ChangeType::RequestPropertiesRemoved => "removed from",
        _ => "added to",
    };
    let mut detail = base_detail(
        change_type,
        format!(
            "Request properties {} {} {}: {}",
            verb,
            call.method,
            call.path,
            join(fields)
        ),
    );
    detail.fields = fields.iter().cloned().collect();
    detail
}

fn response_detail(
    call: &ExternalCall,
    change_type: ChangeType,
    status: &str,
    fields: &BTreeSet<String>,
) -> ImpactDetail {
    let verb = match change_type {
        ChangeType::ResponsePropertiesRemoved => "removed from",
        _ => "added to",
    };
    let mut detail = base_detail(
        change_type,
        format!(
            "Response properties {} status {} of {} {}: {}",
            verb,
            status,
            call.method,
            call.path,
            join(fields)
        ),
    );
    detail.fields = fields.iter().cloned().collect();
    detail.status_code = Some(status.to_string());
    detail
}

fn schema_detail(
    change_type: ChangeType,
    delta: &SchemaDelta,
    fields: &BTreeSet<String>,
) -> ImpactDetail {
    let verb = match change_type {
        ChangeType::SchemaPropertiesRemoved => "removed from",
        _ => "added to",
    };
    let mut detail = base_detail(
        change_type,
        format!(
            "Schema properties {} '{}': {} (reported because this call is already affected; \
             the schema may or may not be referenced by it)",
            verb,
            delta.schema,
            join(fields)
        ),
    );
    detail.fields = fields.iter().cloned().collect();
    detail.schema = Some(delta.schema.clone());
    detail
}

fn join(fields: &BTreeSet<String>) -> String {
    fields.iter().cloned().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changeset::OperationChange;
    use crate::replacement::detect_replacements;
    use crate::types::{ImpactType, Severity};

    fn dependency(path: &str, method: HttpMethod) -> Dependency {
        Dependency {
            service_name: "checkout".to_string(),
            external_call: ExternalCall {
                service: "userdata-api".to_string(),
                path: path.to_string(),
                method,
            },
            originating_endpoints: Vec::new(),
        }
    }

    fn no_replacements() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    #[test]
    fn test_removed_path_without_replacement_is_critical() {
        let changeset = ChangeSet {
            removed_paths: ["/orders".to_string()].into(),
            ..Default::default()
        };
        let details = match_dependency(
            &changeset,
            &no_replacements(),
            &dependency("/orders", HttpMethod::Get),
        );
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].change_type, ChangeType::PathRemoved);
        assert_eq!(details[0].impact_type, ImpactType::Breaking);
        assert_eq!(details[0].severity, Severity::Critical);
    }

    #[test]
    fn test_removed_path_with_replacement_is_versioned() {
        let changeset = ChangeSet {
            removed_paths: ["/v1/users/{id}".to_string()].into(),
            added_paths: ["/v2/users/{id}".to_string()].into(),
            ..Default::default()
        };
        let replacements = detect_replacements(&changeset);
        let details = match_dependency(
            &changeset,
            &replacements,
            &dependency("/v1/users/{id}", HttpMethod::Get),
        );
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].change_type, ChangeType::PathVersioned);
        assert_eq!(details[0].severity, Severity::High);
        assert_eq!(details[0].after.as_deref(), Some("/v2/users/{id}"));
    }

    #[test]
    fn test_caller_path_correlates_by_normalized_form() {
        // the caller knows the parameter under a different name
        let changeset = ChangeSet {
            removed_paths: ["/v1/users/{id}".to_string()].into(),
            ..Default::default()
        };
        let details = match_dependency(
            &changeset,
            &no_replacements(),
            &dependency("/v1/users/{userId}", HttpMethod::Get),
        );
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].change_type, ChangeType::PathRemoved);
    }

    #[test]
    fn test_migrated_caller_is_not_flagged() {
        // a caller already on the replacement path normalizes equal to the
        // removed path; it must not get a versioned finding against the
        // path it moved away from
        let changeset = ChangeSet {
            removed_paths: ["/v1/users/{id}".to_string()].into(),
            added_paths: ["/v2/users/{id}".to_string()].into(),
            ..Default::default()
        };
        let replacements = detect_replacements(&changeset);
        let details = match_dependency(
            &changeset,
            &replacements,
            &dependency("/v2/users/{id}", HttpMethod::Get),
        );
        assert!(details.is_empty(), "migrated caller was reported impacted: {details:?}");

        // the caller still on the old path keeps its finding
        let details = match_dependency(
            &changeset,
            &replacements,
            &dependency("/v1/users/{id}", HttpMethod::Get),
        );
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].change_type, ChangeType::PathVersioned);
    }

    #[test]
    fn test_modification_findings_in_discovery_order() {
        let mut delta = OperationDelta::default();
        delta.request_added.insert("coupon".to_string());
        delta.request_removed.insert("giftWrap".to_string());
        delta
            .response_removed
            .insert("200".to_string(), ["discountCode".to_string()].into());
        let changeset = ChangeSet {
            modified_operations: vec![OperationChange {
                path: "/cart".to_string(),
                method: HttpMethod::Post,
                delta,
            }],
            ..Default::default()
        };
        let details = match_dependency(
            &changeset,
            &no_replacements(),
            &dependency("/cart", HttpMethod::Post),
        );
        let kinds: Vec<_> = details.iter().map(|d| d.change_type).collect();
        assert_eq!(
            kinds,
            vec![
                ChangeType::RequestPropertiesAdded,
                ChangeType::RequestPropertiesRemoved,
                ChangeType::ResponsePropertiesRemoved,
            ]
        );
        assert_eq!(details[2].fields, vec!["discountCode"]);
        assert_eq!(details[2].status_code.as_deref(), Some("200"));
    }

    #[test]
    fn test_wildcard_probe_catches_coarse_diffs() {
        let mut delta = OperationDelta::default();
        delta.request_added.insert("note".to_string());
        let changeset = ChangeSet {
            modified_operations: vec![OperationChange {
                path: "/orders".to_string(),
                method: HttpMethod::Any,
                delta,
            }],
            ..Default::default()
        };
        let details = match_dependency(
            &changeset,
            &no_replacements(),
            &dependency("/orders", HttpMethod::Put),
        );
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].change_type, ChangeType::RequestPropertiesAdded);
    }

    #[test]
    fn test_schema_deltas_only_corroborate() {
        let schema_only = ChangeSet {
            schema_property_changes: vec![SchemaDelta {
                schema: "User".to_string(),
                added: BTreeSet::new(),
                removed: ["ssn".to_string()].into(),
            }],
            ..Default::default()
        };
        // schema change alone: dependency is untouched, nothing is reported
        let details = match_dependency(
            &schema_only,
            &no_replacements(),
            &dependency("/users/{id}", HttpMethod::Get),
        );
        assert!(details.is_empty());

        // same schema change alongside a removal: both get reported
        let mut with_removal = schema_only.clone();
        with_removal.removed_paths.insert("/users/{id}".to_string());
        let details = match_dependency(
            &with_removal,
            &no_replacements(),
            &dependency("/users/{id}", HttpMethod::Get),
        );
        let kinds: Vec<_> = details.iter().map(|d| d.change_type).collect();
        assert_eq!(
            kinds,
            vec![ChangeType::PathRemoved, ChangeType::SchemaPropertiesRemoved]
        );
        assert_eq!(details[1].schema.as_deref(), Some("User"));
    }

    #[test]
    fn test_unaffected_dependency_yields_nothing() {
        let changeset = ChangeSet {
            removed_paths: ["/orders".to_string()].into(),
            ..Default::default()
        };
        let details = match_dependency(
            &changeset,
            &no_replacements(),
            &dependency("/payments", HttpMethod::Post),
        );
        assert!(details.is_empty());
    }
}
