//! Injectable FIFO task queue

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// A unit of deferred work
pub type Task = Box<dyn FnOnce()>;

/// Shared FIFO queue for deferred notification
///
/// Cloning the handle shares the underlying queue. The queue never runs
/// tasks on its own; the host drains it explicitly between turns of its
/// event loop, and tests drain it the same way.
///
/// Single-threaded: tasks run on whichever call stack drains the queue,
/// strictly after the code that deferred them.
#[derive(Clone, Default)]
pub struct DispatchQueue {
    inner: Rc<QueueInner>,
}

#[derive(Default)]
struct QueueInner {
    tasks: RefCell<VecDeque<Task>>,
    deferred_total: Cell<u64>,
}

impl DispatchQueue {
    pub fn new() -> Self {
        DispatchQueue::default()
    }

    /// Queue a task to run strictly after the currently executing code
    pub fn defer(&self, task: impl FnOnce() + 'static) {
        self.inner.tasks.borrow_mut().push_back(Box::new(task));
        self.inner
            .deferred_total
            .set(self.inner.deferred_total.get() + 1);
        tracing::trace!(pending = self.pending(), "task deferred");
    }

    /// Number of tasks waiting to run
    pub fn pending(&self) -> usize {
        self.inner.tasks.borrow().len()
    }

    /// True when no tasks are waiting
    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// Total number of tasks deferred over the queue's lifetime
    pub fn deferred_total(&self) -> u64 {
        self.inner.deferred_total.get()
    }

    /// Run the oldest waiting task; returns false when the queue is idle
    ///
    /// The queue borrow is released before the task runs, so tasks may
    /// defer further tasks onto the same queue.
    pub fn run_next(&self) -> bool {
        let task = self.inner.tasks.borrow_mut().pop_front();
        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Drain the queue, including tasks deferred while draining
    ///
    /// Returns the number of tasks run.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        if ran > 0 {
            tracing::trace!(ran, "queue drained");
        }
        ran
    }
}

impl fmt::Debug for DispatchQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchQueue")
            .field("pending", &self.pending())
            .field("deferred_total", &self.deferred_total())
            .finish()
    }
}
