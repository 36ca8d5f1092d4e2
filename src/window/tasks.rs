//! Periodic task scheduling.
//!
//! [`TaskQueue`] runs every task exactly once, in submission order.
//! [`TaskSet`] keeps one task per key; adding under an existing key replaces
//! the pending task, and nothing is promised about order across keys.
//! Both hand their pending work out by value so the caller can run it
//! without holding a borrow of the container.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce()>;

// ---------------------------------------------------------------------------
// TaskQueue
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct TaskQueue {
    queue: VecDeque<Task>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: Task) {
        self.queue.push_back(task);
    }

    /// Take every task queued so far. Tasks queued while these run wait for
    /// the next drain.
    pub fn drain(&mut self) -> Vec<Task> {
        self.queue.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue").field("pending", &self.queue.len()).finish()
    }
}

// ---------------------------------------------------------------------------
// TaskSet
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct TaskSet {
    tasks: BTreeMap<String, Task>,
}

impl TaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pending task for `key`, replacing any earlier one.
    pub fn insert(&mut self, key: impl Into<String>, task: Task) {
        self.tasks.insert(key.into(), task);
    }

    /// Drop the pending task for `key`. Returns whether one was pending.
    pub fn remove(&mut self, key: &str) -> bool {
        self.tasks.remove(key).is_some()
    }

    /// Take every pending task, leaving the set empty.
    pub fn drain(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.tasks).into_values().collect()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn contains(&self, key: &str) -> bool {
        self.tasks.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl fmt::Debug for TaskSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSet")
            .field("keys", &self.tasks.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
