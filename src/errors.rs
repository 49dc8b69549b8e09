use serde::Serialize;
use thiserror::Error;

/// Fatal engine errors. Any of these aborts the run; no partial report is
/// produced.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The diff document violates the minimal shape contract (root is not an
    /// object, `paths`/`components` are present but not objects, or a path
    /// shows up in more than one of the added/removed/modified sections).
    #[error("malformed diff input: {0}")]
    MalformedDiffInput(String),

    /// The dependency document as a whole is unusable (not a JSON array).
    /// Individual bad records inside a valid array are skipped instead, see
    /// [`DependencyRecordError`].
    #[error("malformed dependency input: {0}")]
    MalformedDependencyInput(String),
}

/// Why a single dependency record was dropped during parsing. Recoverable:
/// the run continues without the record.
#[derive(Debug, Error)]
pub enum DependencyRecordError {
    #[error("required field '{0}' is missing or empty")]
    MissingField(&'static str),

    #[error("record does not match the dependency schema: {0}")]
    Schema(String),
}

/// One dependency record that was skipped, surfaced alongside the report so
/// the caller can log or display it.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedDependency {
    /// Position of the record in the input array.
    pub index: usize,
    pub reason: String,
}

/// Errors from a narrative generator adapter.
#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("narrative generation failed: {0}")]
    Generation(String),
}
