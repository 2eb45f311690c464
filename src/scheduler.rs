//! Deferred work queue
//!
//! Stands in for "the next turn of the event loop". Some operations must not
//! run while the native event that triggered them is still dispatching (the
//! drag image removal after a drag start, the dropped notification after a
//! drop). They are queued here and the host drains the queue once per loop
//! iteration with [`TaskQueue::run_pending`].
//!
//! There is no cancellation: a queued task always runs.

use std::cell::RefCell;
use std::collections::VecDeque;

struct Task {
    label: &'static str,
    run: Box<dyn FnOnce()>,
}

#[derive(Default)]
pub struct TaskQueue {
    tasks: RefCell<VecDeque<Task>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` for the next call to [`run_pending`](Self::run_pending)
    pub fn defer(&self, label: &'static str, task: impl FnOnce() + 'static) {
        tracing::trace!(label, "deferring task");
        self.tasks.borrow_mut().push_back(Task {
            label,
            run: Box::new(task),
        });
    }

    /// Run every task queued before this call
    ///
    /// Tasks queued while these run wait for the next turn. Returns the
    /// number of tasks executed.
    pub fn run_pending(&self) -> usize {
        let batch = std::mem::take(&mut *self.tasks.borrow_mut());
        let count = batch.len();
        for task in batch {
            tracing::trace!(label = task.label, "running deferred task");
            (task.run)();
        }
        count
    }

    /// Drain the queue, including tasks queued by tasks, until it is empty
    pub fn run_until_idle(&self) -> usize {
        let mut total = 0;
        loop {
            let ran = self.run_pending();
            if ran == 0 {
                return total;
            }
            total += ran;
        }
    }

    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let labels: Vec<&'static str> = self.tasks.borrow().iter().map(|t| t.label).collect();
        f.debug_struct("TaskQueue").field("pending", &labels).finish()
    }
}
