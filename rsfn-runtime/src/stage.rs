//! Stage results

/// Failure of a pipeline stage or task
pub type StageError = anyhow::Error;

/// Outcome of a pipeline stage or task
pub type StageResult<T> = Result<T, StageError>;
