use log::{debug, error};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

type Task = Box<dyn FnOnce() + Send + 'static>;

struct Inner {
    tasks: VecDeque<Task>,
    /// Tasks dequeued by a worker and not yet completed. Queued-but-not-
    /// dequeued tasks are counted by `tasks.len()`, not here.
    pending: usize,
    shutdown: bool,
}

struct Shared {
    inner: Mutex<Inner>,
    work_available: Condvar,
    work_done: Condvar,
}

/// A fixed pool of worker threads draining a FIFO task list.
///
/// `finish` blocks until the queue is empty and every dequeued task has
/// completed, so a submitter can wait out a whole wavefront, including
/// tasks submitted by other tasks. Workers must never call `finish` on
/// their own queue.
pub struct WorkQueue {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkQueue {
    /// Spawns `workers` threads (at least one).
    pub fn new(workers: usize) -> Self {
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                tasks: VecDeque::new(),
                pending: 0,
                shutdown: false,
            }),
            work_available: Condvar::new(),
            work_done: Condvar::new(),
        });

        let workers = (0..workers.max(1))
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || Self::work(shared))
            })
            .collect();

        WorkQueue { shared, workers }
    }

    /// Appends a task and wakes one worker. Legal from inside a running
    /// task; such submissions extend the current `finish` wavefront.
    pub fn execute(&self, task: impl FnOnce() + Send + 'static) {
        let mut inner = self.shared.inner.lock();
        if inner.shutdown {
            debug!("task submitted after shutdown; discarded");
            return;
        }
        inner.tasks.push_back(Box::new(task));
        self.shared.work_available.notify_one();
    }

    /// Blocks until the task list is empty and no dequeued task is still
    /// running. Any number of threads may wait; each blocks independently.
    pub fn finish(&self) {
        let mut inner = self.shared.inner.lock();
        while !(inner.tasks.is_empty() && inner.pending == 0) {
            self.shared.work_done.wait(&mut inner);
        }
    }

    /// Discards queued tasks and tells workers to exit once their current
    /// task completes. Non-preemptive.
    pub fn shutdown(&self) {
        let mut inner = self.shared.inner.lock();
        inner.shutdown = true;
        let discarded = inner.tasks.len();
        inner.tasks.clear();
        if discarded > 0 {
            debug!("shutdown discarded {} queued task(s)", discarded);
        }
        self.shared.work_available.notify_all();
        self.shared.work_done.notify_all();
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    fn work(shared: Arc<Shared>) {
        loop {
            let task = {
                let mut inner = shared.inner.lock();
                loop {
                    if inner.shutdown {
                        return;
                    }
                    if let Some(task) = inner.tasks.pop_front() {
                        inner.pending += 1;
                        break task;
                    }
                    shared.work_available.wait(&mut inner);
                }
            };

            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_string());
                error!("worker task panicked: {}", message);
            }

            let mut inner = shared.inner.lock();
            inner.pending -= 1;
            if inner.pending == 0 {
                shared.work_done.notify_all();
            }
        }
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        self.shutdown();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("worker thread exited by panic");
            }
        }
    }
}
