//! Pipeline support
//!
//! Failure handlers consumed by generated `*_composer_with_handler`
//! functions, and [`Pipeline`], a chaining wrapper over [`StageResult`].

use crate::stage::{StageError, StageResult};

/// Handler that recovers from every failure with a clone of `value`
pub fn fallback_to<T: Clone>(value: T) -> impl Fn(usize, StageError) -> StageResult<T> {
    move |stage, error| {
        log::debug!("stage {} failed ({}), falling back", stage, error);
        Ok(value.clone())
    }
}

/// Handler that logs the failing stage at `warn` and propagates the error
pub fn log_and_propagate<T>() -> impl Fn(usize, StageError) -> StageResult<T> {
    |stage, error| {
        log::warn!("pipeline stage {} failed: {:#}", stage, error);
        Err(error)
    }
}

/// Chaining wrapper over a stage result
#[derive(Debug)]
pub struct Pipeline<T> {
    result: StageResult<T>,
}

impl<T> Pipeline<T> {
    pub fn new(result: StageResult<T>) -> Self {
        Self { result }
    }

    pub fn ok(value: T) -> Self {
        Self::new(Ok(value))
    }

    pub fn err(error: impl Into<StageError>) -> Self {
        Self::new(Err(error.into()))
    }

    /// Transform the value on success
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Pipeline<U> {
        Pipeline::new(self.result.map(f))
    }

    /// Run a fallible stage on success
    pub fn and_then<U>(self, f: impl FnOnce(T) -> StageResult<U>) -> Pipeline<U> {
        Pipeline::new(self.result.and_then(f))
    }

    /// Run a fallible side effect, keeping the value when it succeeds
    pub fn then(self, f: impl FnOnce(&T) -> StageResult<()>) -> Pipeline<T> {
        match self.result {
            Ok(value) => match f(&value) {
                Ok(()) => Pipeline::ok(value),
                Err(error) => Pipeline::new(Err(error)),
            },
            Err(error) => Pipeline::new(Err(error)),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn into_result(self) -> StageResult<T> {
        self.result
    }
}

impl<T> From<StageResult<T>> for Pipeline<T> {
    fn from(result: StageResult<T>) -> Self {
        Self::new(result)
    }
}
