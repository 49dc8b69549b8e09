//! Impact correlation engine for API contract changes.
//!
//! Given the structural diff of an API description (produced by an external
//! differ) and a graph of cross-service call dependencies, the engine
//! determines which dependent call sites are affected, whether the effect is
//! breaking, and how severe it is. The output is a structured report for CI
//! gating and optional narrative generation; the engine itself performs no
//! I/O.

pub mod changeset;
pub mod dependency;
pub mod diff_reducer;
pub mod engine;
pub mod errors;
pub mod matcher;
pub mod narrative;
pub mod path_normalizer;
pub mod replacement;
pub mod report;
pub mod severity;
pub mod types;


// Re-export commonly used items for convenience
pub use changeset::{ChangeSet, ChangeSetSummary, OperationDelta, SchemaDelta};
pub use dependency::{Dependency, ExternalCall, OriginatingEndpoint};
pub use engine::{analyze, ImpactAnalysis};
pub use errors::{DependencyRecordError, EngineError, NarrativeError, SkippedDependency};
pub use narrative::{build_narrative_context, NarrativeContext, NarrativeGenerator};
pub use report::{ImpactRecord, ImpactReport};
pub use types::{ChangeType, HttpMethod, ImpactDetail, ImpactType, OperationKey, Severity};
