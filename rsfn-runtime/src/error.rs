//! Runtime errors

use std::fmt;
use std::sync::Arc;

/// Failures raised by the runtime itself rather than by user code
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("operation cancelled")]
    Cancelled,
    #[error("timed out waiting for completion")]
    TimedOut,
    #[error("no candidates to choose from")]
    NoCandidates,
    #[error("computation panicked: {0}")]
    Panicked(String),
}

/// A stage error shared between every waiter of one future.
///
/// Waiters each get their own `StageError` wrapping the same failure;
/// `downcast_ref::<SharedError>()` recovers it.
#[derive(Clone)]
pub struct SharedError(Arc<anyhow::Error>);

impl SharedError {
    pub fn new(error: anyhow::Error) -> Self {
        Self(Arc::new(error))
    }

    /// The original failure
    pub fn inner(&self) -> &anyhow::Error {
        &self.0
    }

    /// True when the original failure is a `E`
    pub fn is<E>(&self) -> bool
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.0.is::<E>()
    }
}

impl fmt::Display for SharedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl fmt::Debug for SharedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl std::error::Error for SharedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}
