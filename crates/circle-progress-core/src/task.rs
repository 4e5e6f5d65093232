//! Microtask queue.
//!
//! Microtasks are deferred closures that run at the end of the current turn,
//! after all synchronous work has finished. The widget uses them to coalesce
//! several property writes into one flush.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// A unique identifier for a microtask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Get the raw u64 value of this task ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Global counter for generating unique task IDs.
static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

fn next_task_id() -> TaskId {
    TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
}

/// A boxed task closure.
type BoxedTask = Box<dyn FnOnce() + Send + 'static>;

/// Internal task data.
struct TaskData {
    id: TaskId,
    task: BoxedTask,
}

/// FIFO queue of pending microtasks.
pub(crate) struct TaskQueue {
    tasks: VecDeque<TaskData>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self {
            tasks: VecDeque::new(),
        }
    }

    /// Post a task; returns the ID that can be used to cancel it.
    pub fn post<F>(&mut self, task: F) -> TaskId
    where
        F: FnOnce() + Send + 'static,
    {
        let id = next_task_id();
        self.tasks.push_back(TaskData {
            id,
            task: Box::new(task),
        });
        id
    }

    /// Cancel a pending task.
    ///
    /// Returns `true` if the task was found and cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        if let Some(pos) = self.tasks.iter().position(|t| t.id == id) {
            self.tasks.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }

    /// Remove the oldest task without running it.
    fn pop(&mut self) -> Option<BoxedTask> {
        self.tasks.pop_front().map(|data| data.task)
    }
}

/// A thread-safe wrapper around `TaskQueue`.
///
/// Tasks are popped one at a time so that a running task may post or cancel
/// other tasks without deadlocking on the queue lock.
pub(crate) struct SharedTaskQueue {
    inner: Mutex<TaskQueue>,
}

impl SharedTaskQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TaskQueue::new()),
        }
    }

    pub fn post<F>(&self, task: F) -> TaskId
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.lock().post(task)
    }

    pub fn cancel(&self, id: TaskId) -> bool {
        self.inner.lock().cancel(id)
    }

    pub fn pending_count(&self) -> usize {
        self.inner.lock().pending_count()
    }

    /// Run tasks until the queue is empty, including tasks posted by tasks.
    ///
    /// Returns the number of tasks processed.
    pub fn run_all(&self) -> usize {
        let mut count = 0;
        loop {
            let next = self.inner.lock().pop();
            match next {
                Some(task) => {
                    task();
                    count += 1;
                }
                None => break,
            }
        }
        count
    }
}

impl Default for SharedTaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_tasks_run_in_fifo_order() {
        let queue = SharedTaskQueue::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let log = log.clone();
            queue.post(move || log.lock().push(i));
        }

        assert_eq!(queue.run_all(), 3);
        assert_eq!(*log.lock(), vec![0, 1, 2]);
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn test_cancelled_task_does_not_run() {
        let queue = SharedTaskQueue::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let c = counter.clone();
        let id = queue.post(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));

        assert_eq!(queue.run_all(), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_task_posted_by_task_runs_in_same_drain() {
        let queue = Arc::new(SharedTaskQueue::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let q = queue.clone();
        let c = counter.clone();
        queue.post(move || {
            let c = c.clone();
            q.post(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        });

        assert_eq!(queue.run_all(), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_task_ids_are_unique() {
        let mut queue = TaskQueue::new();
        let a = queue.post(|| {});
        let b = queue.post(|| {});
        assert_ne!(a, b);
        assert!(b.as_u64() > a.as_u64());
    }
}
