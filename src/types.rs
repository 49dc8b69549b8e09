// Core types shared across the engine: operation identity, change
// classification and the per-finding impact record.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP method of an API operation.
///
/// `Any` is a wildcard used only when the upstream diff lacks per-method
/// detail (e.g. a coarse path-level modification); it matches every method
/// during correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
    Any,
}

impl HttpMethod {
    /// Parses a method string case-insensitively. `*` and `ANY` map to the
    /// wildcard. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "patch" => Some(HttpMethod::Patch),
            "delete" => Some(HttpMethod::Delete),
            "head" => Some(HttpMethod::Head),
            "options" => Some(HttpMethod::Options),
            "trace" => Some(HttpMethod::Trace),
            "any" | "*" => Some(HttpMethod::Any),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Any => "ANY",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HttpMethod {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HttpMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        HttpMethod::parse(&s)
            .ok_or_else(|| de::Error::custom(format!("unknown HTTP method '{s}'")))
    }
}

/// A (path template, method) pair identifying one operation within an API
/// description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperationKey {
    pub path: String,
    pub method: HttpMethod,
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// The kind of contract change a finding describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// The called endpoint disappeared with no equivalent replacement.
    PathRemoved,
    /// The called endpoint disappeared but a structurally equivalent path
    /// appeared elsewhere (version-bump heuristic).
    PathVersioned,
    RequestPropertiesAdded,
    RequestPropertiesRemoved,
    ResponsePropertiesAdded,
    ResponsePropertiesRemoved,
    SchemaPropertiesAdded,
    SchemaPropertiesRemoved,
}

impl ChangeType {
    /// All variants, in the order findings are discovered and reported.
    pub const ALL: [ChangeType; 8] = [
        ChangeType::PathRemoved,
        ChangeType::PathVersioned,
        ChangeType::RequestPropertiesAdded,
        ChangeType::RequestPropertiesRemoved,
        ChangeType::ResponsePropertiesAdded,
        ChangeType::ResponsePropertiesRemoved,
        ChangeType::SchemaPropertiesAdded,
        ChangeType::SchemaPropertiesRemoved,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            ChangeType::PathRemoved => "endpoint removed",
            ChangeType::PathVersioned => "endpoint moved to a new version",
            ChangeType::RequestPropertiesAdded => "request properties added",
            ChangeType::RequestPropertiesRemoved => "request properties removed",
            ChangeType::ResponsePropertiesAdded => "response properties added",
            ChangeType::ResponsePropertiesRemoved => "response properties removed",
            ChangeType::SchemaPropertiesAdded => "schema properties added",
            ChangeType::SchemaPropertiesRemoved => "schema properties removed",
        }
    }
}

/// Whether a dependent caller can safely ignore the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImpactType {
    Breaking,
    NonBreaking,
}

impl ImpactType {
    pub fn is_breaking(&self) -> bool {
        matches!(self, ImpactType::Breaking)
    }
}

/// Four-level remediation priority, independent of the breaking /
/// non-breaking classification. Ordered ascending so `max()` yields the
/// most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn description(&self) -> &'static str {
        match self {
            Severity::Critical => "critical - the call target is gone, callers break immediately",
            Severity::High => "high - backward compatibility is broken for affected callers",
            Severity::Medium => "medium - needs attention but does not break callers outright",
            Severity::Low => "low - additive change, safe under an open-schema assumption",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        };
        f.write_str(s)
    }
}

/// One classified finding against a dependency's external call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactDetail {
    pub change_type: ChangeType,
    pub impact_type: ImpactType,
    pub severity: Severity,
    pub description: String,
    /// Affected property names, for property-level changes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    /// Response status code, for response property changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<String>,
    /// Schema name, for schema-level changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Path before the change, for path removal and versioning findings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    /// Path after the change, for path versioning findings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse_case_insensitive() {
        assert_eq!(HttpMethod::parse("get"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("POST"), Some(HttpMethod::Post));
        assert_eq!(HttpMethod::parse("Delete"), Some(HttpMethod::Delete));
        assert_eq!(HttpMethod::parse("*"), Some(HttpMethod::Any));
        assert_eq!(HttpMethod::parse("ANY"), Some(HttpMethod::Any));
        assert_eq!(HttpMethod::parse("fetch"), None);
    }

    #[test]
    fn test_method_serde_round_trip() {
        let json = serde_json::to_string(&HttpMethod::Patch).unwrap();
        assert_eq!(json, "\"PATCH\"");
        let back: HttpMethod = serde_json::from_str("\"patch\"").unwrap();
        assert_eq!(back, HttpMethod::Patch);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_change_type_wire_format() {
        let json = serde_json::to_string(&ChangeType::ResponsePropertiesRemoved).unwrap();
        assert_eq!(json, "\"response_properties_removed\"");
        let json = serde_json::to_string(&ImpactType::NonBreaking).unwrap();
        assert_eq!(json, "\"non-breaking\"");
    }
}
