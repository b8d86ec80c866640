//! Specification cache
//!
//! Owns the class → spec mapping together with an insertion-ordered list
//! used for whole-graph traversal.
//!
//! # Design
//!
//! - One `Mutex` guards both the map and the order list, so they never
//!   disagree. Reads lock too.
//! - The order list is append-only between clears. Removal leaves a
//!   tombstone (`None`) so indices held by an in-flight traversal stay valid.
//! - `for_each_concurrent` re-locks per index and re-reads the length, so
//!   specs appended while the callback runs are still visited.
//! - `for_each` and `snapshot` work on a point-in-time copy.
//!
//! The factory passed to `compute_if_absent` runs under the cache lock; it
//! must only construct the spec, never call back into the cache.

use causeway_core::{Class, MetamodelResult};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::Arc;

struct Inner<S> {
    by_class: FxHashMap<Class, (usize, Arc<S>)>,
    v_list: Vec<Option<Arc<S>>>,
}

impl<S> Default for Inner<S> {
    fn default() -> Self {
        Self {
            by_class: FxHashMap::default(),
            v_list: Vec::new(),
        }
    }
}

/// Thread-safe class → spec cache
pub struct SpecificationCache<S> {
    inner: Mutex<Inner<S>>,
}

impl<S> Default for SpecificationCache<S> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }
}

impl<S> SpecificationCache<S> {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached spec for `class`
    pub fn lookup(&self, class: &Class) -> Option<Arc<S>> {
        self.inner
            .lock()
            .by_class
            .get(class)
            .map(|(_, spec)| Arc::clone(spec))
    }

    /// Cached spec for `class`, creating it with `factory` if absent.
    ///
    /// Returns the spec and whether it was created by this call. A failing
    /// factory leaves the cache unchanged.
    pub fn compute_if_absent<F>(&self, class: &Class, factory: F) -> MetamodelResult<(Arc<S>, bool)>
    where
        F: FnOnce(&Class) -> MetamodelResult<S>,
    {
        let mut inner = self.inner.lock();
        if let Some((_, spec)) = inner.by_class.get(class) {
            return Ok((Arc::clone(spec), false));
        }
        let spec = Arc::new(factory(class)?);
        let idx = inner.v_list.len();
        inner.v_list.push(Some(Arc::clone(&spec)));
        inner.by_class.insert(class.clone(), (idx, Arc::clone(&spec)));
        Ok((spec, true))
    }

    /// Remove the spec for `class`
    pub fn remove(&self, class: &Class) -> Option<Arc<S>> {
        let mut inner = self.inner.lock();
        let (idx, spec) = inner.by_class.remove(class)?;
        if let Some(slot) = inner.v_list.get_mut(idx) {
            *slot = None;
        }
        Some(spec)
    }

    /// Remove everything
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.by_class.clear();
        inner.v_list.clear();
    }

    /// Point-in-time copy of all specs, in insertion order
    pub fn snapshot(&self) -> Vec<Arc<S>> {
        self.inner.lock().v_list.iter().flatten().cloned().collect()
    }

    /// Visit a point-in-time copy of all specs
    pub fn for_each(&self, mut f: impl FnMut(&Arc<S>)) {
        for spec in self.snapshot() {
            f(&spec);
        }
    }

    /// Visit all specs, including any added by `f` while iterating.
    ///
    /// The cache is not locked while `f` runs, so `f` may load further specs.
    pub fn for_each_concurrent(&self, mut f: impl FnMut(&Arc<S>)) {
        let mut idx = 0;
        loop {
            let next = {
                let inner = self.inner.lock();
                if idx >= inner.v_list.len() {
                    break;
                }
                inner.v_list[idx].clone()
            };
            if let Some(spec) = next {
                f(&spec);
            }
            idx += 1;
        }
    }

    /// Number of cached specs
    pub fn len(&self) -> usize {
        self.inner.lock().by_class.len()
    }

    /// True if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
