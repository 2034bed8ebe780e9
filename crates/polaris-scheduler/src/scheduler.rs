use std::cmp::{Ordering as CmpOrdering, Reverse};
use std::collections::{BTreeMap, BinaryHeap, HashMap};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use futures::FutureExt;
use parking_lot::{Condvar, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::error::SchedulerError;
use crate::task::{Task, TaskBody, TaskContext, TaskEntry, TaskId, TaskKind};

type ShutdownFn = Box<dyn FnOnce() + Send + 'static>;

/// Timer-queue element, ordered by due time then by registration sequence.
struct Pending {
    due: Instant,
    seq: u64,
    entry: Arc<TaskEntry>,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

#[derive(Default)]
struct TimerState {
    queue: BinaryHeap<Reverse<Pending>>,
    seq: u64,
    stopped: bool,
}

impl TimerState {
    fn push(&mut self, due: Instant, entry: Arc<TaskEntry>) {
        self.seq += 1;
        self.queue.push(Reverse(Pending {
            due,
            seq: self.seq,
            entry,
        }));
    }
}

/// State shared between the public handle, the timer thread and running bodies.
pub(crate) struct Shared {
    timer: Mutex<TimerState>,
    wake: Condvar,
    tasks: Mutex<HashMap<TaskId, Arc<TaskEntry>>>,
    shutdown_tasks: Mutex<BTreeMap<u32, ShutdownFn>>,
    next_id: AtomicU32,
    next_shutdown_id: AtomicU32,
    shutting_down: AtomicBool,
    in_flight: AtomicUsize,
    idle: Notify,
    runtime: Handle,
}

impl Shared {
    fn next_task_id(&self, kind: TaskKind) -> TaskId {
        let counter = match kind {
            TaskKind::Normal => &self.next_id,
            TaskKind::Shutdown => &self.next_shutdown_id,
        };
        TaskId {
            kind,
            value: counter.fetch_add(1, Ordering::Relaxed) + 1,
        }
    }

    /// Drop `id` from its registry. Returns whether it was registered.
    pub(crate) fn unregister(&self, id: TaskId) -> bool {
        match id.kind {
            TaskKind::Normal => match self.tasks.lock().remove(&id) {
                Some(entry) => {
                    entry.cancel();
                    // Wake the timer so a cancelled head entry is discarded promptly.
                    self.wake.notify_one();
                    true
                }
                None => false,
            },
            TaskKind::Shutdown => self.shutdown_tasks.lock().remove(&id.value).is_some(),
        }
    }

    fn stop_timer(&self) {
        self.timer.lock().stopped = true;
        self.wake.notify_all();
    }

    /// Hand one execution of `entry` to the runtime.
    fn dispatch(self: &Arc<Self>, entry: Arc<TaskEntry>) {
        if entry.is_running() {
            debug!(task = %entry.id, "previous execution still running, skipping");
            return;
        }

        self.in_flight.fetch_add(1, Ordering::AcqRel);
        let guard = InFlight(Arc::clone(self));
        let body = (entry.body)(TaskContext::new(Arc::clone(&entry)));
        let one_shot = !entry.is_repeating();
        let finished = Arc::clone(&entry);
        let shared = Arc::downgrade(self);

        let join = self.runtime.spawn(async move {
            let _guard = guard;
            if AssertUnwindSafe(body).catch_unwind().await.is_err() {
                warn!(task = %finished.id, "task body panicked");
            }
            if one_shot {
                finished.mark_finished();
                if let Some(shared) = shared.upgrade() {
                    shared.tasks.lock().remove(&finished.id);
                }
            }
        });

        if !entry.set_running(join.abort_handle()) {
            debug!(task = %entry.id, "cancelled before it started");
        }
    }

    async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if self.in_flight.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Decrements the in-flight count when a body finishes, panics or is aborted.
struct InFlight(Arc<Shared>);

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.0.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

fn run_timer(shared: Arc<Shared>) {
    let mut state = shared.timer.lock();
    loop {
        if state.stopped {
            break;
        }

        let now = Instant::now();
        let due = match state.queue.peek() {
            None => {
                shared.wake.wait(&mut state);
                continue;
            }
            Some(Reverse(next)) => next.due,
        };
        if due > now {
            shared.wake.wait_until(&mut state, due);
            continue;
        }

        let Some(Reverse(pending)) = state.queue.pop() else {
            continue;
        };
        let entry = pending.entry;
        if entry.is_cancelled() {
            continue;
        }
        if entry.is_repeating() {
            state.push(pending.due + entry.repeat, Arc::clone(&entry));
        }

        MutexGuard::unlocked(&mut state, || shared.dispatch(entry));
    }
    debug!("timer thread stopped");
}

struct Inner {
    shared: Arc<Shared>,
    timer_thread: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.shared.stop_timer();
    }
}

/// Delay/repeat task scheduler.
///
/// Cloning yields another handle to the same scheduler.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Scheduler {
    /// Start the timer thread. Task bodies are spawned on `runtime`.
    pub fn new(runtime: Handle) -> Result<Self, SchedulerError> {
        let shared = Arc::new(Shared {
            timer: Mutex::new(TimerState::default()),
            wake: Condvar::new(),
            tasks: Mutex::new(HashMap::new()),
            shutdown_tasks: Mutex::new(BTreeMap::new()),
            next_id: AtomicU32::new(0),
            next_shutdown_id: AtomicU32::new(0),
            shutting_down: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            idle: Notify::new(),
            runtime,
        });

        let timer_shared = Arc::clone(&shared);
        let thread = std::thread::Builder::new()
            .name("polaris-timer".into())
            .spawn(move || run_timer(timer_shared))?;

        Ok(Self {
            inner: Arc::new(Inner {
                shared,
                timer_thread: Mutex::new(Some(thread)),
            }),
        })
    }

    /// Start building a task around `body`, which runs once per firing.
    pub fn task<F, Fut>(&self, body: F) -> TaskBuilder<'_>
    where
        F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        TaskBuilder {
            scheduler: self,
            body: Arc::new(move |ctx| body(ctx).boxed()),
            delay: Duration::ZERO,
            repeat: Duration::ZERO,
        }
    }

    /// Register `f` to run once during [`Scheduler::shutdown`].
    pub fn shutdown_task<F>(&self, f: F) -> ShutdownTaskBuilder<'_>
    where
        F: FnOnce() + Send + 'static,
    {
        ShutdownTaskBuilder {
            scheduler: self,
            body: Box::new(f),
        }
    }

    /// Cancel a task or shutdown task by id. Returns whether it was registered.
    pub fn cancel(&self, id: TaskId) -> bool {
        self.inner.shared.unregister(id)
    }

    pub fn is_registered(&self, id: TaskId) -> bool {
        let shared = &self.inner.shared;
        match id.kind {
            TaskKind::Normal => shared.tasks.lock().contains_key(&id),
            TaskKind::Shutdown => shared.shutdown_tasks.lock().contains_key(&id.value),
        }
    }

    /// Number of registered normal tasks.
    pub fn task_count(&self) -> usize {
        self.inner.shared.tasks.lock().len()
    }

    /// Number of task bodies currently executing.
    pub fn in_flight(&self) -> usize {
        self.inner.shared.in_flight.load(Ordering::Acquire)
    }

    /// Resolves once no task body is executing.
    pub async fn wait_idle(&self) {
        self.inner.shared.wait_idle().await;
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shared.shutting_down.load(Ordering::Acquire)
    }

    /// Run shutdown tasks in registration order, stop the timer, then wait
    /// for in-flight task bodies to finish.
    ///
    /// New registrations fail with [`SchedulerError::ShutDown`] from the
    /// moment this is called.
    pub async fn shutdown(&self) {
        let shared = &self.inner.shared;
        if !shared.shutting_down.swap(true, Ordering::AcqRel) {
            let hooks = std::mem::take(&mut *shared.shutdown_tasks.lock());
            for (id, hook) in hooks {
                if std::panic::catch_unwind(AssertUnwindSafe(hook)).is_err() {
                    warn!(task = id, "shutdown task panicked");
                }
            }

            shared.stop_timer();
            let thread = self.inner.timer_thread.lock().take();
            if let Some(thread) = thread {
                match tokio::task::spawn_blocking(move || thread.join()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(_)) => warn!("timer thread panicked"),
                    Err(e) => warn!(error = %e, "failed to join timer thread"),
                }
            }
            shared.tasks.lock().clear();
        }

        shared.wait_idle().await;
    }

    fn register(&self, body: TaskBody, delay: Duration, repeat: Duration) -> Result<Task, SchedulerError> {
        let shared = &self.inner.shared;
        if shared.shutting_down.load(Ordering::Acquire) {
            return Err(SchedulerError::ShutDown);
        }

        let id = shared.next_task_id(TaskKind::Normal);
        let entry = Arc::new(TaskEntry::new(id, delay, repeat, body));
        shared.tasks.lock().insert(id, Arc::clone(&entry));

        shared.timer.lock().push(Instant::now() + delay, Arc::clone(&entry));
        shared.wake.notify_one();

        debug!(task = %id, ?delay, ?repeat, "scheduled");
        Ok(Task::new(entry, Arc::downgrade(shared)))
    }
}

pub struct TaskBuilder<'a> {
    scheduler: &'a Scheduler,
    body: TaskBody,
    delay: Duration,
    repeat: Duration,
}

impl TaskBuilder<'_> {
    /// Time until the first execution. Defaults to zero.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Interval between executions. Zero (the default) means one-shot.
    pub fn repeat(mut self, repeat: Duration) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn schedule(self) -> Result<Task, SchedulerError> {
        self.scheduler.register(self.body, self.delay, self.repeat)
    }
}

pub struct ShutdownTaskBuilder<'a> {
    scheduler: &'a Scheduler,
    body: ShutdownFn,
}

impl ShutdownTaskBuilder<'_> {
    pub fn schedule(self) -> Result<TaskId, SchedulerError> {
        let shared = &self.scheduler.inner.shared;
        let mut hooks = shared.shutdown_tasks.lock();
        if shared.shutting_down.load(Ordering::Acquire) {
            return Err(SchedulerError::ShutDown);
        }
        let id = shared.next_task_id(TaskKind::Shutdown);
        hooks.insert(id.value, self.body);
        Ok(id)
    }
}
