// The severity classification table. This is the single place in the engine
// where a finding is assigned its impact type and severity; no other
// component may assign either.

use crate::types::{ChangeType, ImpactType, Severity};

/// Maps a change type to its impact classification.
///
/// Removal of anything a caller may read or send is breaking by default:
/// the caller cannot know whether it depended on the removed surface.
/// Additions are non-breaking under an open/extensible-schema assumption.
pub fn classify(change_type: ChangeType) -> (ImpactType, Severity) {
    match change_type {
        ChangeType::PathRemoved => (ImpactType::Breaking, Severity::Critical),
        ChangeType::PathVersioned => (ImpactType::Breaking, Severity::High),
        ChangeType::RequestPropertiesRemoved => (ImpactType::Breaking, Severity::High),
        ChangeType::ResponsePropertiesRemoved => (ImpactType::Breaking, Severity::High),
        ChangeType::SchemaPropertiesRemoved => (ImpactType::Breaking, Severity::High),
        ChangeType::RequestPropertiesAdded => (ImpactType::NonBreaking, Severity::Low),
        ChangeType::ResponsePropertiesAdded => (ImpactType::NonBreaking, Severity::Low),
        ChangeType::SchemaPropertiesAdded => (ImpactType::NonBreaking, Severity::Low),
    }
}
