//! # Dependency identity
//!
//! `DepsTracker` turns "did my inputs change since last render?" into a
//! monotonically increasing [`DepId`]. Gated hooks key their memo or effect
//! slot on the id instead of on the inputs themselves:
//!
//! ```rust
//! use hookset_core::*;
//!
//! let mut t = DepsTracker::new();
//! assert_eq!(t.track_list(&[1, 2]), DepId(0));
//! assert_eq!(t.track_list(&[1, 2]), DepId(0));
//! assert_eq!(t.track_list(&[1, 99]), DepId(1));
//! assert_eq!(t.track_list(&[1, 99, 3]), DepId(2));
//! ```
//!
//! The first call never reports a change, so every tracker starts at `DepId(0)`.

use std::fmt;

use crate::runtime::remember_state;

/// Identity produced by a [`DepsTracker`]. Advances by exactly one per detected change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DepId(pub u64);

impl fmt::Display for DepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The input shapes accepted by [`DepsTracker::track`].
pub enum DepsInput<'a, T> {
    /// Nothing to compare; the identity never changes.
    None,
    /// Shallow, position-wise comparison. A length change alone is a change.
    List(&'a [T]),
    /// `eq(previous, current)` returning `false` is a change.
    Compare {
        value: T,
        eq: &'a dyn Fn(&T, &T) -> bool,
    },
    /// Caller-managed change signal: `false` is a change.
    Predicate(&'a dyn Fn() -> bool),
}

enum Baseline<T> {
    Empty,
    List(Vec<T>),
    Value(T),
}

/// Per-instance change tracker.
pub struct DepsTracker<T> {
    dep_id: DepId,
    baseline: Baseline<T>,
    first: bool,
}

impl<T> Default for DepsTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DepsTracker<T> {
    pub fn new() -> Self {
        Self {
            dep_id: DepId(0),
            baseline: Baseline::Empty,
            first: true,
        }
    }

    pub fn id(&self) -> DepId {
        self.dep_id
    }

    /// Computes the current identity for any input shape.
    pub fn track(&mut self, input: DepsInput<'_, T>) -> DepId
    where
        T: PartialEq + Clone,
    {
        match input {
            DepsInput::None => self.track_none(),
            DepsInput::List(deps) => self.track_list(deps),
            DepsInput::Compare { value, eq } => self.track_compare(value, eq),
            DepsInput::Predicate(pred) => self.track_predicate(pred),
        }
    }

    pub fn track_none(&mut self) -> DepId {
        self.first = false;
        self.dep_id
    }

    pub fn track_list(&mut self, deps: &[T]) -> DepId
    where
        T: PartialEq + Clone,
    {
        if std::mem::take(&mut self.first) {
            self.baseline = Baseline::List(deps.to_vec());
            return self.dep_id;
        }

        // An empty baseline is adopted without counting as a change.
        let (store, changed) = match &self.baseline {
            Baseline::Empty => (true, false),
            Baseline::List(prev) => {
                let changed = !shallow_eq(prev, deps);
                (changed, changed)
            }
            Baseline::Value(_) => (true, true),
        };

        if store {
            self.baseline = Baseline::List(deps.to_vec());
        }
        if changed {
            self.advance();
        }
        self.dep_id
    }

    pub fn track_compare(&mut self, value: T, eq: impl FnOnce(&T, &T) -> bool) -> DepId {
        if std::mem::take(&mut self.first) {
            self.baseline = Baseline::Value(value);
            return self.dep_id;
        }

        let (store, changed) = match &self.baseline {
            Baseline::Empty => (true, false),
            Baseline::Value(prev) => {
                let changed = !eq(prev, &value);
                (changed, changed)
            }
            Baseline::List(_) => (true, true),
        };

        if store {
            self.baseline = Baseline::Value(value);
        }
        if changed {
            self.advance();
        }
        self.dep_id
    }

    /// The predicate runs on every call, including the first, whose result is ignored.
    pub fn track_predicate(&mut self, pred: impl FnOnce() -> bool) -> DepId {
        let unchanged = pred();
        if std::mem::take(&mut self.first) {
            return self.dep_id;
        }
        if !unchanged {
            self.advance();
        }
        self.dep_id
    }

    fn advance(&mut self) {
        self.dep_id.0 += 1;
        log::debug!("deps: identity advanced to {}", self.dep_id);
    }
}

fn shallow_eq<T: PartialEq>(prev: &[T], next: &[T]) -> bool {
    prev.len() == next.len() && prev.iter().zip(next).all(|(a, b)| a == b)
}

/// Identity of `input` across renders of the current instance.
pub fn use_deps<T>(input: DepsInput<'_, T>) -> DepId
where
    T: PartialEq + Clone + 'static,
{
    let tracker = remember_state(DepsTracker::<T>::new);
    let mut tracker = tracker.borrow_mut();
    tracker.track(input)
}

pub fn use_deps_list<T>(deps: &[T]) -> DepId
where
    T: PartialEq + Clone + 'static,
{
    let tracker = remember_state(DepsTracker::<T>::new);
    let mut tracker = tracker.borrow_mut();
    tracker.track_list(deps)
}

pub fn use_deps_compare<T: 'static>(value: T, eq: impl FnOnce(&T, &T) -> bool) -> DepId {
    let tracker = remember_state(DepsTracker::<T>::new);
    let mut tracker = tracker.borrow_mut();
    tracker.track_compare(value, eq)
}

pub fn use_deps_predicate(pred: impl FnOnce() -> bool) -> DepId {
    let tracker = remember_state(DepsTracker::<()>::new);
    let mut tracker = tracker.borrow_mut();
    tracker.track_predicate(pred)
}
