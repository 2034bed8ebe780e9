//! Task entries and the handles returned to callers.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::task::AbortHandle;

use crate::scheduler::Shared;

/// Which registry an id was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    Normal,
    Shutdown,
}

/// Registry key. Ids are never reused within one scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId {
    pub kind: TaskKind,
    pub value: u32,
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TaskKind::Normal => write!(f, "task-{}", self.value),
            TaskKind::Shutdown => write!(f, "shutdown-{}", self.value),
        }
    }
}

pub(crate) type TaskBody = Arc<dyn Fn(TaskContext) -> BoxFuture<'static, ()> + Send + Sync>;

pub(crate) struct TaskEntry {
    pub(crate) id: TaskId,
    pub(crate) delay: Duration,
    /// Zero for one-shot tasks.
    pub(crate) repeat: Duration,
    pub(crate) body: TaskBody,
    cancelled: AtomicBool,
    finished: AtomicBool,
    running: Mutex<Option<AbortHandle>>,
}

impl TaskEntry {
    pub(crate) fn new(id: TaskId, delay: Duration, repeat: Duration, body: TaskBody) -> Self {
        Self {
            id,
            delay,
            repeat,
            body,
            cancelled: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            running: Mutex::new(None),
        }
    }

    pub(crate) fn is_repeating(&self) -> bool {
        !self.repeat.is_zero()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub(crate) fn mark_finished(&self) {
        self.finished.store(true, Ordering::Release);
    }

    /// Record the execution in flight. Returns false when the task was
    /// cancelled in the meantime, in which case the execution is aborted.
    pub(crate) fn set_running(&self, handle: AbortHandle) -> bool {
        let mut running = self.running.lock();
        if self.is_cancelled() {
            handle.abort();
            return false;
        }
        *running = Some(handle);
        true
    }

    /// An earlier execution has not completed yet.
    pub(crate) fn is_running(&self) -> bool {
        self.running
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Flag the entry and interrupt the execution in flight, if any.
    pub(crate) fn cancel(&self) {
        let mut running = self.running.lock();
        self.cancelled.store(true, Ordering::Release);
        if let Some(handle) = running.take() {
            handle.abort();
        }
    }
}

/// Passed to every execution of a task body.
#[derive(Clone)]
pub struct TaskContext {
    entry: Arc<TaskEntry>,
}

impl TaskContext {
    pub(crate) fn new(entry: Arc<TaskEntry>) -> Self {
        Self { entry }
    }

    pub fn id(&self) -> TaskId {
        self.entry.id
    }

    /// True once the task was cancelled; long bodies may poll this between steps.
    pub fn is_cancelled(&self) -> bool {
        self.entry.is_cancelled()
    }
}

/// Handle to a scheduled task.
#[derive(Clone)]
pub struct Task {
    entry: Arc<TaskEntry>,
    scheduler: Weak<Shared>,
}

impl Task {
    pub(crate) fn new(entry: Arc<TaskEntry>, scheduler: Weak<Shared>) -> Self {
        Self { entry, scheduler }
    }

    pub fn id(&self) -> TaskId {
        self.entry.id
    }

    pub fn delay(&self) -> Duration {
        self.entry.delay
    }

    pub fn repeat(&self) -> Duration {
        self.entry.repeat
    }

    pub fn is_repeating(&self) -> bool {
        self.entry.is_repeating()
    }

    pub fn is_cancelled(&self) -> bool {
        self.entry.is_cancelled()
    }

    /// A one-shot task whose body has completed.
    pub fn is_finished(&self) -> bool {
        self.entry.finished.load(Ordering::Acquire)
    }

    /// Best effort: a running body is aborted at its next await point.
    pub fn cancel(&self) {
        if let Some(shared) = self.scheduler.upgrade() {
            shared.unregister(self.entry.id);
        }
        self.entry.cancel();
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.entry.id)
            .field("delay", &self.entry.delay)
            .field("repeat", &self.entry.repeat)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
