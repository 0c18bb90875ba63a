//! Observable values
//!
//! A [`Reactive`] holds a value and a map of subscriber callbacks keyed by a
//! monotonically increasing [`SubscriptionId`]. Writers copy the callback
//! list out of the lock and notify after releasing it, in subscription order,
//! on the writing thread. Callbacks may therefore read or write reactives,
//! including the one that notified them.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Callback<T> = Arc<dyn Fn(&T, &T) + Send + Sync>;

/// Handle returned by [`Reactive::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

struct State<T> {
    value: T,
    subscribers: BTreeMap<SubscriptionId, Callback<T>>,
    next_id: u64,
}

/// Shared observable value; clones observe the same state
pub struct Reactive<T> {
    state: Arc<Mutex<State<T>>>,
}

impl<T> Clone for Reactive<T> {
    fn clone(&self) -> Self {
        Self { state: Arc::clone(&self.state) }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Reactive<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("Reactive")
            .field("value", &state.value)
            .field("subscribers", &state.subscribers.len())
            .finish()
    }
}

impl<T> Reactive<T> {
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone + Send + 'static> Reactive<T> {
    pub fn new(initial: T) -> Self {
        Self {
            state: Arc::new(Mutex::new(State { value: initial, subscribers: BTreeMap::new(), next_id: 0 })),
        }
    }

    pub fn get(&self) -> T {
        self.lock().value.clone()
    }

    /// Replace the value and notify subscribers with `(old, new)`
    pub fn set(&self, value: T) {
        self.update(|_| value);
    }

    /// Replace the value with `f(current)` and notify subscribers
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let (old, new, callbacks) = {
            let mut state = self.lock();
            let new = f(&state.value);
            let old = std::mem::replace(&mut state.value, new.clone());
            let callbacks: Vec<Callback<T>> = state.subscribers.values().cloned().collect();
            (old, new, callbacks)
        };
        for callback in callbacks {
            callback(&old, &new);
        }
    }

    pub fn subscribe(&self, callback: impl Fn(&T, &T) + Send + Sync + 'static) -> SubscriptionId {
        let mut state = self.lock();
        state.next_id += 1;
        let id = SubscriptionId(state.next_id);
        state.subscribers.insert(id, Arc::new(callback));
        id
    }

    /// Returns false when `id` was not subscribed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().subscribers.remove(&id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Derived value tracking `transform(self)`
    pub fn map<U, F>(&self, transform: F) -> Reactive<U>
    where
        U: Clone + Send + 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        let derived = Reactive::new(transform(&self.get()));
        let target = derived.clone();
        self.subscribe(move |_, new| target.set(transform(new)));
        derived
    }

    /// Derived value that follows `self` only while `predicate` holds
    pub fn filter<F>(&self, predicate: F) -> Reactive<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let derived = Reactive::new(self.get());
        let target = derived.clone();
        self.subscribe(move |_, new| {
            if predicate(new) {
                target.set(new.clone());
            }
        });
        derived
    }

    /// Derived value recomputed from both sources whenever either changes
    pub fn combine<U, V, F>(a: &Reactive<T>, b: &Reactive<U>, combiner: F) -> Reactive<V>
    where
        U: Clone + Send + 'static,
        V: Clone + Send + 'static,
        F: Fn(&T, &U) -> V + Send + Sync + 'static,
    {
        let combiner = Arc::new(combiner);
        let derived = Reactive::new(combiner(&a.get(), &b.get()));

        {
            let target = derived.clone();
            let other = b.clone();
            let combiner = Arc::clone(&combiner);
            a.subscribe(move |_, new_a| target.set(combiner(new_a, &other.get())));
        }
        {
            let target = derived.clone();
            let other = a.clone();
            b.subscribe(move |_, new_b| target.set(combiner(&other.get(), new_b)));
        }
        derived
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn subscribers_see_old_and_new() {
        let counter = Reactive::new(1);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        counter.subscribe(move |old, new| log.lock().unwrap().push((*old, *new)));

        counter.set(2);
        counter.update(|v| v * 10);
        assert_eq!(counter.get(), 20);
        assert_eq!(*seen.lock().unwrap(), vec![(1, 2), (2, 20)]);
    }

    #[test]
    fn ids_are_unique_and_unsubscribe_stops_delivery() {
        let value = Reactive::new(0);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let first = value.subscribe(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let second = value.subscribe(|_, _| {});
        assert_ne!(first, second);
        assert_eq!(value.subscriber_count(), 2);

        value.set(1);
        assert!(value.unsubscribe(first));
        assert!(!value.unsubscribe(first));
        value.set(2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callbacks_may_write_back() {
        let value = Reactive::new(0);
        let handle = value.clone();
        value.subscribe(move |_, new| {
            if *new < 3 {
                handle.set(new + 1);
            }
        });
        value.set(1);
        assert_eq!(value.get(), 3);
    }

    #[test]
    fn map_and_filter_derive_values() {
        let celsius = Reactive::new(0.0_f64);
        let fahrenheit = celsius.map(|c| c * 9.0 / 5.0 + 32.0);
        let positive = celsius.filter(|c| *c > 0.0);

        celsius.set(100.0);
        assert_eq!(fahrenheit.get(), 212.0);
        assert_eq!(positive.get(), 100.0);

        celsius.set(-5.0);
        assert_eq!(positive.get(), 100.0);
    }

    #[test]
    fn combine_tracks_both_sources() {
        let width = Reactive::new(2);
        let height = Reactive::new(3);
        let area = Reactive::combine(&width, &height, |w, h| w * h);
        assert_eq!(area.get(), 6);

        width.set(4);
        assert_eq!(area.get(), 12);
        height.set(5);
        assert_eq!(area.get(), 20);
    }
}
