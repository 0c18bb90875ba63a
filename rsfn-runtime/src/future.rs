//! One-shot futures and cancellation
//!
//! A [`Future`] is a completion cell shared between a producer and any number
//! of blocking waiters. It completes at most once: the first `complete` or
//! `fail` wins and later calls are ignored. State sits behind one mutex with a
//! condition variable for wakeups; combinators run on their own threads.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{RuntimeError, SharedError};
use crate::stage::{StageError, StageResult};

type Outcome<T> = Result<T, SharedError>;

struct Inner<T> {
    outcome: Mutex<Option<Outcome<T>>>,
    ready: Condvar,
}

impl<T> Inner<T> {
    fn lock(&self) -> MutexGuard<'_, Option<Outcome<T>>> {
        self.outcome.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wake every waiter; taking the lock orders this after any pending check
    fn wake(&self) {
        let _guard = self.lock();
        self.ready.notify_all();
    }
}

/// Thread-safe one-shot completion cell
pub struct Future<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Future<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T> std::fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Future").field("done", &self.inner.lock().is_some()).finish()
    }
}

impl<T: Clone + Send + 'static> Default for Future<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> Future<T> {
    /// A pending future
    pub fn new() -> Self {
        Self { inner: Arc::new(Inner { outcome: Mutex::new(None), ready: Condvar::new() }) }
    }

    pub fn completed(value: T) -> Self {
        let future = Self::new();
        future.complete(value);
        future
    }

    pub fn failed(error: impl Into<StageError>) -> Self {
        let future = Self::new();
        future.fail(error);
        future
    }

    /// Run `f` on a new thread; a panic fails the future with `Panicked`
    pub fn spawn<F>(f: F) -> Self
    where
        F: FnOnce() -> StageResult<T> + Send + 'static,
    {
        let future = Self::new();
        let producer = future.clone();
        thread::spawn(move || {
            let result = match panic::catch_unwind(AssertUnwindSafe(f)) {
                Ok(result) => result,
                Err(payload) => Err(RuntimeError::Panicked(panic_message(payload.as_ref())).into()),
            };
            producer.settle(result);
        });
        future
    }

    /// Complete with a value. Returns false when already completed.
    pub fn complete(&self, value: T) -> bool {
        self.settle_outcome(Ok(value))
    }

    /// Complete with a failure. Returns false when already completed.
    pub fn fail(&self, error: impl Into<StageError>) -> bool {
        self.settle_outcome(Err(SharedError::new(error.into())))
    }

    /// Complete with either outcome
    pub fn settle(&self, result: StageResult<T>) -> bool {
        match result {
            Ok(value) => self.complete(value),
            Err(error) => self.fail(error),
        }
    }

    fn settle_outcome(&self, outcome: Outcome<T>) -> bool {
        let mut slot = self.inner.lock();
        if slot.is_some() {
            return false;
        }
        *slot = Some(outcome);
        self.inner.ready.notify_all();
        true
    }

    pub fn is_done(&self) -> bool {
        self.inner.lock().is_some()
    }

    /// The outcome if already completed, without blocking
    pub fn poll(&self) -> Option<StageResult<T>> {
        self.inner.lock().as_ref().map(expose)
    }

    /// Block until completed
    pub fn wait(&self) -> StageResult<T> {
        let mut slot = self.inner.lock();
        loop {
            if let Some(outcome) = slot.as_ref() {
                return expose(outcome);
            }
            slot = self.inner.ready.wait(slot).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Block until completed or `timeout` elapses (`RuntimeError::TimedOut`)
    pub fn wait_timeout(&self, timeout: Duration) -> StageResult<T> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.inner.lock();
        loop {
            if let Some(outcome) = slot.as_ref() {
                return expose(outcome);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(RuntimeError::TimedOut.into());
            }
            slot = self
                .inner
                .ready
                .wait_timeout(slot, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Block until completed or `token` is cancelled (`RuntimeError::Cancelled`)
    pub fn wait_cancellable(&self, token: &CancelToken) -> StageResult<T> {
        let inner = Arc::clone(&self.inner);
        let registration = token.on_cancel(move || inner.wake());

        let result = {
            let mut slot = self.inner.lock();
            loop {
                if let Some(outcome) = slot.as_ref() {
                    break expose(outcome);
                }
                if token.is_cancelled() {
                    break Err(RuntimeError::Cancelled.into());
                }
                slot = self.inner.ready.wait(slot).unwrap_or_else(PoisonError::into_inner);
            }
        };

        token.remove(registration);
        result
    }

    /// Future of `f` applied to the value; failures pass through
    pub fn map<U, F>(&self, f: F) -> Future<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let source = self.clone();
        Future::spawn(move || source.wait().map(f))
    }

    /// Future of the future returned by `f`; failures pass through
    pub fn and_then<U, F>(&self, f: F) -> Future<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Future<U> + Send + 'static,
    {
        let source = self.clone();
        Future::spawn(move || {
            let value = source.wait()?;
            f(value).wait()
        })
    }

    /// All values in input order, or the first failure in input order
    pub fn sequence(futures: Vec<Future<T>>) -> Future<Vec<T>> {
        Future::spawn(move || futures.iter().map(Future::wait).collect())
    }

    /// First success. Fails with the last failure when every input fails, or
    /// with `NoCandidates` when there are no inputs.
    pub fn race(futures: Vec<Future<T>>) -> Future<T> {
        let winner = Future::new();
        if futures.is_empty() {
            winner.fail(RuntimeError::NoCandidates);
            return winner;
        }

        let remaining = Arc::new(Mutex::new(futures.len()));
        for future in futures {
            let winner = winner.clone();
            let remaining = Arc::clone(&remaining);
            thread::spawn(move || {
                let result = future.wait();
                let mut left = remaining.lock().unwrap_or_else(PoisonError::into_inner);
                *left -= 1;
                match result {
                    Ok(value) => {
                        winner.complete(value);
                    }
                    Err(error) if *left == 0 => {
                        winner.fail(error);
                    }
                    Err(_) => {}
                }
            });
        }
        winner
    }

    /// First input to complete, success or failure
    pub fn first_completed(futures: Vec<Future<T>>) -> Future<T> {
        let first = Future::new();
        if futures.is_empty() {
            first.fail(RuntimeError::NoCandidates);
            return first;
        }

        for future in futures {
            let first = first.clone();
            thread::spawn(move || {
                first.settle(future.wait());
            });
        }
        first
    }
}

fn expose<T: Clone>(outcome: &Outcome<T>) -> StageResult<T> {
    match outcome {
        Ok(value) => Ok(value.clone()),
        Err(shared) => Err(StageError::new(shared.clone())),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text.to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}

type CancelHook = Box<dyn Fn() + Send + Sync>;

struct CancelInner {
    cancelled: AtomicBool,
    next_id: AtomicU64,
    hooks: Mutex<BTreeMap<u64, CancelHook>>,
}

/// Cloneable cancellation signal shared by waiters and tasks
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken").field("cancelled", &self.is_cancelled()).finish()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CancelInner {
                cancelled: AtomicBool::new(false),
                next_id: AtomicU64::new(0),
                hooks: Mutex::new(BTreeMap::new()),
            }),
        }
    }

    /// Signal cancellation and wake every registered waiter. Idempotent.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        let hooks = std::mem::take(&mut *self.hooks());
        for hook in hooks.values() {
            hook();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// `RuntimeError::Cancelled` once cancelled
    pub fn check(&self) -> Result<(), RuntimeError> {
        if self.is_cancelled() {
            Err(RuntimeError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn hooks(&self) -> MutexGuard<'_, BTreeMap<u64, CancelHook>> {
        self.inner.hooks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn on_cancel(&self, hook: impl Fn() + Send + Sync + 'static) -> u64 {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        self.hooks().insert(id, Box::new(hook));
        id
    }

    fn remove(&self, id: u64) {
        self.hooks().remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn first_completion_wins() {
        let future = Future::new();
        assert!(!future.is_done());
        assert!(future.poll().is_none());
        assert!(future.complete(1));
        assert!(!future.complete(2));
        assert!(!future.fail(anyhow!("late")));
        assert_eq!(future.wait().unwrap(), 1);
        assert_eq!(future.poll().unwrap().unwrap(), 1);
    }

    #[test]
    fn every_waiter_sees_the_failure() {
        let future: Future<u8> = Future::failed(anyhow!("broken"));
        assert_eq!(future.wait().unwrap_err().to_string(), "broken");
        assert_eq!(future.clone().wait().unwrap_err().to_string(), "broken");
    }

    #[test]
    fn waiters_on_other_threads_are_woken() {
        let future = Future::new();
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let future = future.clone();
                thread::spawn(move || future.wait().unwrap())
            })
            .collect();
        thread::sleep(Duration::from_millis(20));
        future.complete("done".to_string());
        for waiter in waiters {
            assert_eq!(waiter.join().unwrap(), "done");
        }
    }

    #[test]
    fn spawn_runs_in_background_and_catches_panics() {
        assert_eq!(Future::spawn(|| Ok(6 * 7)).wait().unwrap(), 42);

        let panicked: Future<()> = Future::spawn(|| panic!("kaboom"));
        let err = panicked.wait().unwrap_err();
        let shared = err.downcast_ref::<SharedError>().unwrap();
        assert!(shared.is::<RuntimeError>());
        assert!(err.to_string().contains("kaboom"));
    }

    #[test]
    fn wait_timeout_expires() {
        let future: Future<u8> = Future::new();
        let err = future.wait_timeout(Duration::from_millis(10)).unwrap_err();
        assert_eq!(err.downcast_ref::<RuntimeError>(), Some(&RuntimeError::TimedOut));

        future.complete(9);
        assert_eq!(future.wait_timeout(Duration::from_millis(10)).unwrap(), 9);
    }

    #[test]
    fn cancellation_wakes_waiter() {
        let future: Future<u8> = Future::new();
        let token = CancelToken::new();
        let waiter = {
            let future = future.clone();
            let token = token.clone();
            thread::spawn(move || future.wait_cancellable(&token))
        };
        thread::sleep(Duration::from_millis(20));
        token.cancel();
        let err = waiter.join().unwrap().unwrap_err();
        assert_eq!(err.downcast_ref::<RuntimeError>(), Some(&RuntimeError::Cancelled));
        assert!(token.check().is_err());
    }

    #[test]
    fn completed_future_ignores_cancelled_token() {
        let token = CancelToken::new();
        token.cancel();
        assert_eq!(Future::completed(3).wait_cancellable(&token).unwrap(), 3);
    }

    #[test]
    fn map_and_and_then_chain() {
        let chained = Future::completed(2).map(|v| v * 10).and_then(|v| Future::spawn(move || Ok(v + 1)));
        assert_eq!(chained.wait().unwrap(), 21);

        let failed: Future<i32> = Future::failed(anyhow!("no input"));
        assert_eq!(failed.map(|v| v + 1).wait().unwrap_err().to_string(), "no input");
    }

    #[test]
    fn sequence_collects_in_order_or_fails() {
        let all = Future::sequence(vec![Future::completed(1), Future::spawn(|| Ok(2)), Future::completed(3)]);
        assert_eq!(all.wait().unwrap(), vec![1, 2, 3]);

        let broken = Future::sequence(vec![Future::completed(1), Future::failed(anyhow!("second"))]);
        assert_eq!(broken.wait().unwrap_err().to_string(), "second");
    }

    #[test]
    fn race_prefers_success() {
        let slow_ok = Future::spawn(|| {
            thread::sleep(Duration::from_millis(30));
            Ok("slow")
        });
        let fast_err: Future<&str> = Future::failed(anyhow!("fast failure"));
        assert_eq!(Future::race(vec![fast_err, slow_ok]).wait().unwrap(), "slow");

        let all_fail: Future<u8> = Future::race(vec![Future::failed(anyhow!("a")), Future::failed(anyhow!("b"))]);
        assert!(all_fail.wait_timeout(Duration::from_secs(5)).is_err());

        let none: Future<u8> = Future::race(Vec::new());
        let err = none.wait().unwrap_err();
        assert!(err.downcast_ref::<SharedError>().unwrap().is::<RuntimeError>());
    }

    #[test]
    fn first_completed_takes_failures_too() {
        let pending: Future<u8> = Future::new();
        let failed = Future::failed(anyhow!("first"));
        let first = Future::first_completed(vec![pending, failed]);
        assert_eq!(first.wait().unwrap_err().to_string(), "first");
    }
}
