//! Serializes validation passes
//!
//! At most one validation pass runs at a time. A request arriving while a
//! pass runs (typically because a validator discovered a new spec) is
//! queued; the running pass drains the queue and re-validates until it is
//! empty, and only then goes idle. Disposal waits on `idle` for that.

use causeway_core::{Class, MetamodelError, MetamodelResult};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

#[derive(Default)]
struct QueueState {
    in_progress: bool,
    owner: Option<ThreadId>,
    pending: VecDeque<Class>,
}

pub(crate) struct ValidationQueue {
    state: Mutex<QueueState>,
    idle: Condvar,
    capacity: usize,
}

/// Result of asking to validate
pub(crate) enum Admission<'a> {
    /// Caller owns the pass and must run it
    Run(ValidationRun<'a>),
    /// A pass is running and will pick the request up
    Queued,
}

impl ValidationQueue {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            idle: Condvar::new(),
            capacity,
        }
    }

    /// Start a pass for `class`, or queue it behind the running one.
    ///
    /// # Errors
    ///
    /// `IllegalState` if the queue is full.
    pub(crate) fn admit(&self, class: &Class) -> MetamodelResult<Admission<'_>> {
        let mut state = self.state.lock();
        if state.in_progress {
            if state.pending.len() >= self.capacity {
                return Err(MetamodelError::illegal_state(format!(
                    "validation queue full ({} pending) while queueing {}",
                    state.pending.len(),
                    class
                )));
            }
            state.pending.push_back(class.clone());
            return Ok(Admission::Queued);
        }
        state.in_progress = true;
        state.owner = Some(thread::current().id());
        Ok(Admission::Run(ValidationRun { queue: self }))
    }

    /// Start a pass unless one is running; never queues
    pub(crate) fn try_begin(&self) -> Option<ValidationRun<'_>> {
        let mut state = self.state.lock();
        if state.in_progress {
            return None;
        }
        state.in_progress = true;
        state.owner = Some(thread::current().id());
        Some(ValidationRun { queue: self })
    }

    /// True if the running pass belongs to the calling thread
    pub(crate) fn is_running_on_current_thread(&self) -> bool {
        let state = self.state.lock();
        state.in_progress && state.owner == Some(thread::current().id())
    }

    #[cfg(test)]
    fn is_idle(&self) -> bool {
        !self.state.lock().in_progress
    }

    /// Wait until no pass is running; false if `timeout` elapsed first
    pub(crate) fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while state.in_progress {
            if self.idle.wait_until(&mut state, deadline).timed_out() {
                return !state.in_progress;
            }
        }
        true
    }

    fn finish(&self, state: &mut QueueState) {
        state.in_progress = false;
        state.owner = None;
        state.pending.clear();
        self.idle.notify_all();
    }
}

/// Ownership of the running pass; dropping it ends the pass
pub(crate) struct ValidationRun<'a> {
    queue: &'a ValidationQueue,
}

impl ValidationRun<'_> {
    /// Take the queued requests. Returns the number taken; zero means the
    /// pass has ended and the queue is idle.
    pub(crate) fn drain_or_finish(&self) -> usize {
        let mut state = self.queue.state.lock();
        let taken = state.pending.len();
        if taken == 0 {
            self.queue.finish(&mut state);
        } else {
            state.pending.clear();
        }
        taken
    }
}

impl Drop for ValidationRun<'_> {
    fn drop(&mut self) {
        let mut state = self.queue.state.lock();
        if state.in_progress {
            self.queue.finish(&mut state);
        }
    }
}
