//! Deferred computations
//!
//! A [`Task`] describes work without running it. Running it under a
//! [`CancelToken`] yields a value directly (`run_with`) or through a
//! background [`Future`] (`spawn`). Tasks are cheap to clone and may run any
//! number of times.

use std::sync::Arc;

use crate::error::RuntimeError;
use crate::future::{CancelToken, Future};
use crate::stage::{StageError, StageResult};

type Work<T> = dyn Fn(&CancelToken) -> StageResult<T> + Send + Sync;

pub struct Task<T> {
    work: Arc<Work<T>>,
}

impl<T> Clone for Task<T> {
    fn clone(&self) -> Self {
        Self { work: Arc::clone(&self.work) }
    }
}

impl<T: Clone + Send + 'static> Task<T> {
    pub fn new<F>(work: F) -> Self
    where
        F: Fn(&CancelToken) -> StageResult<T> + Send + Sync + 'static,
    {
        Self { work: Arc::new(work) }
    }

    /// Task that always yields `value`
    pub fn from_value(value: T) -> Self
    where
        T: Sync,
    {
        Self::new(move |_| Ok(value.clone()))
    }

    /// Task that always fails with `message`
    pub fn from_error(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(move |_| Err(StageError::msg(message.clone())))
    }

    /// Run on the current thread
    pub fn run_with(&self, token: &CancelToken) -> StageResult<T> {
        (self.work)(token)
    }

    /// Run on a background thread
    pub fn spawn(&self, token: &CancelToken) -> Future<T> {
        let task = self.clone();
        let token = token.clone();
        Future::spawn(move || task.run_with(&token))
    }

    pub fn map<U, F>(&self, f: F) -> Task<U>
    where
        U: Clone + Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let task = self.clone();
        Task::new(move |token| task.run_with(token).map(&f))
    }

    pub fn and_then<U, F>(&self, f: F) -> Task<U>
    where
        U: Clone + Send + 'static,
        F: Fn(T) -> Task<U> + Send + Sync + 'static,
    {
        let task = self.clone();
        Task::new(move |token| {
            let value = task.run_with(token)?;
            f(value).run_with(token)
        })
    }

    /// Run one after another, checking for cancellation before each
    pub fn sequence(tasks: Vec<Task<T>>) -> Task<Vec<T>> {
        Task::new(move |token| {
            let mut values = Vec::with_capacity(tasks.len());
            for task in &tasks {
                token.check()?;
                values.push(task.run_with(token)?);
            }
            Ok(values)
        })
    }

    /// Run all at once; values in input order, first failure in input order
    pub fn parallel(tasks: Vec<Task<T>>) -> Task<Vec<T>> {
        Task::new(move |token| {
            let futures: Vec<Future<T>> = tasks.iter().map(|task| task.spawn(token)).collect();
            futures.iter().map(|future| future.wait_cancellable(token)).collect()
        })
    }

    /// Run all at once; the first success wins
    pub fn race(tasks: Vec<Task<T>>) -> Task<T> {
        Task::new(move |token| {
            if tasks.is_empty() {
                return Err(RuntimeError::NoCandidates.into());
            }
            let futures = tasks.iter().map(|task| task.spawn(token)).collect();
            Future::race(futures).wait_cancellable(token)
        })
    }
}

impl<T> std::fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}
