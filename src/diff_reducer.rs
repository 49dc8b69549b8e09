// Boundary adapter between the external spec differ and the engine.
//
// Upstream differ tools disagree on the shape of `added`/`removed`
// collections (sometimes a list of paths, sometimes a map keyed by path) and
// emit sparse documents where a key is present only when that kind of change
// occurred. All of that variance is absorbed here, once; everything
// downstream sees only the `ChangeSet` contract.

use log::debug;
use serde_json::Value;
use std::collections::BTreeSet;

use crate::changeset::{ChangeSet, OperationChange, OperationDelta, SchemaDelta};
use crate::errors::EngineError;
use crate::types::HttpMethod;

/// Reduces raw differ output into a [`ChangeSet`].
///
/// Missing intermediate keys mean "no changes of that kind". Only the
/// minimal shape contract is enforced: the root must be an object, and
/// `paths` / `components`, when present, must be objects. Violations abort
/// with [`EngineError::MalformedDiffInput`] rather than producing a partial,
/// silently wrong changeset.
pub fn reduce(diff: &Value) -> Result<ChangeSet, EngineError> {
    let root = diff.as_object().ok_or_else(|| {
        EngineError::MalformedDiffInput("diff document is not a JSON object".to_string())
    })?;

    let mut changeset = ChangeSet::default();

    if let Some(paths) = root.get("paths") {
        let paths = paths.as_object().ok_or_else(|| {
            EngineError::MalformedDiffInput("'paths' is present but not an object".to_string())
        })?;

        if let Some(added) = paths.get("added") {
            collect_paths(added, &mut changeset.added_paths);
        }
        if let Some(removed) = paths.get("removed") {
            collect_paths(removed, &mut changeset.removed_paths);
        }
        if let Some(overlap) = changeset
            .added_paths
            .intersection(&changeset.removed_paths)
            .next()
        {
            return Err(EngineError::MalformedDiffInput(format!(
                "path '{overlap}' is listed as both added and removed"
            )));
        }

        if let Some(modified) = paths.get("modified").and_then(Value::as_object) {
            for (path, detail) in modified {
                reduce_modified_path(path, detail, &mut changeset.modified_operations);
            }
        }
        // modified operations must reference paths absent from both sets,
        // otherwise one dependency would collect duplicate findings
        if let Some(conflict) = changeset.modified_operations.iter().find(|change| {
            changeset.added_paths.contains(&change.path)
                || changeset.removed_paths.contains(&change.path)
        }) {
            return Err(EngineError::MalformedDiffInput(format!(
                "path '{}' is listed as modified and also as added or removed",
                conflict.path
            )));
        }
    }

    if let Some(components) = root.get("components") {
        let components = components.as_object().ok_or_else(|| {
            EngineError::MalformedDiffInput(
                "'components' is present but not an object".to_string(),
            )
        })?;
        if let Some(schemas) = components
            .get("schemas")
            .and_then(Value::as_object)
            .and_then(|schemas| schemas.get("modified"))
            .and_then(Value::as_object)
        {
            for (name, detail) in schemas {
                let added = collect_names(detail.pointer("/properties/added"));
                let removed = collect_names(detail.pointer("/properties/removed"));
                if added.is_empty() && removed.is_empty() {
                    continue;
                }
                changeset.schema_property_changes.push(SchemaDelta {
                    schema: name.clone(),
                    added,
                    removed,
                });
            }
        }
    }

    debug!(
        "reduced diff: {} added, {} removed, {} modified operations, {} schema deltas",
        changeset.added_paths.len(),
        changeset.removed_paths.len(),
        changeset.modified_operations.len(),
        changeset.schema_property_changes.len()
    );
    Ok(changeset)
}

/// Walks one entry of `paths.modified`. The usual shape carries per-method
/// detail under `operations.modified`; some differs emit the operation
/// detail directly on the path, in which case the delta is recorded under
/// the `ANY` wildcard.
fn reduce_modified_path(path: &str, detail: &Value, out: &mut Vec<OperationChange>) {
    if let Some(operations) = detail
        .pointer("/operations/modified")
        .and_then(Value::as_object)
    {
        for (method_str, operation) in operations {
            let Some(method) = HttpMethod::parse(method_str) else {
                debug!("skipping unrecognized method key '{method_str}' under '{path}'");
                continue;
            };
            push_operation(path, method, operation, out);
        }
    } else {
        push_operation(path, HttpMethod::Any, detail, out);
    }
}

fn push_operation(path: &str, method: HttpMethod, operation: &Value, out: &mut Vec<OperationChange>) {
    let delta = reduce_operation(operation);
    if !delta.is_empty() {
        out.push(OperationChange {
            path: path.to_string(),
            method,
            delta,
        });
    }
}

fn reduce_operation(operation: &Value) -> OperationDelta {
    let mut delta = OperationDelta::default();

    if let Some(request_body) = operation.get("requestBody") {
        for schema in media_type_schemas(request_body) {
            delta
                .request_added
                .extend(collect_names(schema.pointer("/properties/added")));
            delta
                .request_removed
                .extend(collect_names(schema.pointer("/properties/removed")));
        }
    }

    if let Some(responses) = operation
        .pointer("/responses/modified")
        .and_then(Value::as_object)
    {
        for (status, response) in responses {
            let mut added = BTreeSet::new();
            let mut removed = BTreeSet::new();
            for schema in media_type_schemas(response) {
                added.extend(collect_names(schema.pointer("/properties/added")));
                removed.extend(collect_names(schema.pointer("/properties/removed")));
            }
            if !added.is_empty() {
                delta.response_added.insert(status.clone(), added);
            }
            if !removed.is_empty() {
                delta.response_removed.insert(status.clone(), removed);
            }
        }
    }

    delta
}

/// Walks `content.*.mediaTypeModified.*.schema` and yields each schema node.
fn media_type_schemas(node: &Value) -> Vec<&Value> {
    let mut schemas = Vec::new();
    if let Some(content) = node.get("content").and_then(Value::as_object) {
        for media_type in content.values() {
            if let Some(modified) = media_type.get("mediaTypeModified").and_then(Value::as_object)
            {
                for entry in modified.values() {
                    if let Some(schema) = entry.get("schema") {
                        schemas.push(schema);
                    }
                }
            }
        }
    }
    schemas
}

/// Accepts both collection shapes the upstream differ uses: a list of names
/// or a map keyed by name. Anything else yields the empty set.
fn collect_names(value: Option<&Value>) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    match value {
        Some(Value::Array(items)) => {
            for item in items {
                if let Some(s) = item.as_str() {
                    names.insert(s.to_string());
                }
            }
        }
        Some(Value::Object(map)) => {
            for key in map.keys() {
                names.insert(key.clone());
            }
        }
        _ => {}
    }
    names
}

fn collect_paths(value: &Value, out: &mut BTreeSet<String>) {
    out.extend(collect_names(Some(value)));
}
