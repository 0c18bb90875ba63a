//! rsfn - Runtime
//!
//! Support library for code generated by `rsfn`, plus a few standalone
//! functional helpers.
//!
//! Generated code only touches the first group:
//!
//! - [`StageResult`] / [`StageError`] - outcome of one pipeline stage
//! - [`pipeline`] - canned pipeline failure handlers
//! - [`Pattern`] - per-field patterns for generated matchers
//!
//! The rest is opt-in:
//!
//! - [`Either`] - two-armed sum type with combinators
//! - [`Future`] - one-shot, thread-safe completion cell with blocking waits
//! - [`Task`] - deferred, cancellable computation
//! - [`Reactive`] - observable value with subscriber callbacks
//!
//! ```rust
//! use rsfn_runtime::{Future, Pattern};
//!
//! let answer = Future::spawn(|| Ok(40)).map(|v| v + 2);
//! assert_eq!(answer.wait().unwrap(), 42);
//!
//! assert!(Pattern::Exact(3).matches(&3));
//! assert!(Pattern::<i32>::Wildcard.matches(&7));
//! ```

pub mod either;
pub mod error;
pub mod future;
pub mod pattern;
pub mod pipeline;
pub mod reactive;
pub mod stage;
pub mod task;

pub use either::Either;
pub use error::{RuntimeError, SharedError};
pub use future::{CancelToken, Future};
pub use pattern::Pattern;
pub use reactive::{Reactive, SubscriptionId};
pub use stage::{StageError, StageResult};
pub use task::Task;
