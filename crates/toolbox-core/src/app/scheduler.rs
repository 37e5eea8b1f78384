//! Scheduler - タスクキュー本体
//!
//! # 設計
//! - 全状態（Task 集合、採番器、pending / running 集合）は 1 つの Mutex の中
//! - 各操作は 1 回のロック区間で完結する（ロックを跨いで await しない）
//! - 通知はロックを持ったまま publish する → 1 タスクの通知は遷移順に届く
//! - handler は supervisor タスクの中で実行し、成功・失敗・panic のどれでも
//!   必ず complete_task / fail_task に戻ってくる
//!
//! # Admission
//! running < max_concurrent の間、最も古い pending（id 最小）を running にする。
//! submit と complete/fail の直後に同じロック区間で呼ばれるので、
//! 「空きスロットがあるのに pending が残っている」状態は外から観測できない。

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};

use super::status::QueueCounts;
use crate::domain::{IdSequence, Task, TaskEvent, TaskId, TaskStatus, TaskType};
use crate::ports::{Clock, EventSink};
use crate::typed::{DynHandler, ProgressReporter, TaskParams, TypedRegistry};

/// Mutable queue state. Only ever touched with the lock held.
struct QueueState {
    /// All task records (single source of truth).
    tasks: HashMap<TaskId, Task>,

    ids: IdSequence,

    /// Pending ids. Ids are allocated in creation order, so the first entry is
    /// the oldest pending task.
    pending: BTreeSet<TaskId>,

    running: HashSet<TaskId>,
}

impl QueueState {
    fn new() -> Self {
        Self {
            tasks: HashMap::new(),
            ids: IdSequence::new(),
            pending: BTreeSet::new(),
            running: HashSet::new(),
        }
    }

    fn counts(&self) -> QueueCounts {
        QueueCounts::from_tasks(self.tasks.values())
    }

    /// Newest first; equal timestamps fall back to the higher id.
    fn snapshot(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.tasks.values().cloned().collect();
        tasks.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        tasks
    }
}

struct Shared {
    state: Mutex<QueueState>,
    registry: TypedRegistry,
    sink: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
    runtime: Handle,
    max_concurrent: usize,
    counts_tx: watch::Sender<QueueCounts>,
}

/// In-process task queue with a global concurrency bound.
///
/// Cheap to clone; all clones share the same queue.
#[derive(Clone)]
pub struct Scheduler {
    shared: Arc<Shared>,
}

impl Scheduler {
    pub(crate) fn new(
        registry: TypedRegistry,
        sink: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
        runtime: Handle,
        max_concurrent: usize,
    ) -> Self {
        let (counts_tx, _) = watch::channel(QueueCounts::default());
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(QueueState::new()),
                registry,
                sink,
                clock,
                runtime,
                max_concurrent,
                counts_tx,
            }),
        }
    }

    /// Submit a task and return its id without waiting for it to run.
    ///
    /// An unregistered `task_type` still gets an id: the task is recorded and
    /// immediately marked `failed`.
    pub fn submit(
        &self,
        task_type: TaskType,
        data: serde_json::Value,
        name: impl Into<String>,
    ) -> TaskId {
        let shared = &self.shared;
        let mut guard = shared.state.lock();
        let state = &mut *guard;

        let id = state.ids.allocate();
        let now = shared.clock.now();
        let mut task = Task::new(id, task_type, name, data, now);
        shared.publish(&task);

        if shared.registry.contains(task.task_type.as_str()) {
            info!(task_id = %id, task_type = %task.task_type, "task submitted");
            state.tasks.insert(id, task);
            state.pending.insert(id);
            shared.admit_pending(state);
        } else {
            let message = format!("unknown task type: {}", task.task_type);
            warn!(task_id = %id, task_type = %task.task_type, "rejecting task with unknown type");
            match task.fail(message, now) {
                Ok(()) => shared.publish(&task),
                Err(e) => error!(error = %e, "could not reject task"),
            }
            state.tasks.insert(id, task);
        }

        shared.refresh_counts(state);
        id
    }

    /// Serialize typed params and submit them under `P::TYPE`.
    pub fn submit_params<P: TaskParams>(
        &self,
        params: &P,
        name: impl Into<String>,
    ) -> Result<TaskId, serde_json::Error> {
        let data = serde_json::to_value(params)?;
        Ok(self.submit(TaskType::new(P::TYPE), data, name))
    }

    /// Cancel a task that has not started yet.
    ///
    /// Returns false, without touching anything, when the task is unknown or
    /// is not `pending`.
    pub fn cancel(&self, id: TaskId) -> bool {
        let shared = &self.shared;
        let mut guard = shared.state.lock();
        let state = &mut *guard;

        let Some(task) = state.tasks.get_mut(&id) else {
            return false;
        };
        if task.status != TaskStatus::Pending {
            debug!(task_id = %id, status = %task.status, "cancel ignored");
            return false;
        }
        if let Err(e) = task.cancel(shared.clock.now()) {
            error!(error = %e, "cancel of pending task refused");
            return false;
        }
        state.pending.remove(&id);
        info!(task_id = %id, "task cancelled");
        shared.publish(task);
        shared.refresh_counts(state);
        true
    }

    /// Drop every completed, failed and cancelled task.
    pub fn clear_completed(&self) {
        let shared = &self.shared;
        let mut guard = shared.state.lock();
        let state = &mut *guard;

        let before = state.tasks.len();
        state.tasks.retain(|_, task| !task.status.is_terminal());
        debug!(removed = before - state.tasks.len(), "cleared finished tasks");

        shared.sink.publish(TaskEvent::TaskListChanged(state.snapshot()));
        shared.refresh_counts(state);
    }

    /// All tasks, newest first.
    pub fn list_all(&self) -> Vec<Task> {
        self.shared.state.lock().snapshot()
    }

    pub fn get(&self, id: TaskId) -> Option<Task> {
        self.shared.state.lock().tasks.get(&id).cloned()
    }

    pub fn counts(&self) -> QueueCounts {
        self.shared.state.lock().counts()
    }

    pub fn max_concurrent(&self) -> usize {
        self.shared.max_concurrent
    }

    pub fn registered_types(&self) -> Vec<String> {
        self.shared.registry.registered_types()
    }

    /// Resolve once no task is pending or running.
    pub async fn wait_idle(&self) {
        let mut rx = self.shared.counts_tx.subscribe();
        // the sender lives in `shared`, which we hold, so this cannot close
        let _ = rx.wait_for(QueueCounts::is_idle).await;
    }
}

impl Shared {
    fn publish(&self, task: &Task) {
        self.sink.publish(TaskEvent::TaskChanged(task.clone()));
    }

    fn refresh_counts(&self, state: &QueueState) {
        self.counts_tx.send_replace(state.counts());
    }

    /// Fill free slots with the oldest pending tasks.
    fn admit_pending(self: &Arc<Self>, state: &mut QueueState) {
        while state.running.len() < self.max_concurrent {
            let Some(id) = state.pending.pop_first() else {
                break;
            };
            let Some(task) = state.tasks.get_mut(&id) else {
                error!(task_id = %id, "pending id without a record");
                continue;
            };

            let now = self.clock.now();
            if let Err(e) = task.start(now) {
                // already popped from pending: settle the record so it is not orphaned
                error!(error = %e, "admission refused");
                if task.fail(format!("could not start: {e}"), now).is_ok() {
                    self.publish(task);
                }
                continue;
            }
            state.running.insert(id);
            self.publish(task);

            let Some(handler) = self.registry.get(task.task_type.as_str()) else {
                // submit は未登録の type を pending にしないので、ここには来ない想定
                error!(task_id = %id, task_type = %task.task_type, "handler disappeared");
                state.running.remove(&id);
                if task.fail(format!("unknown task type: {}", task.task_type), now).is_ok() {
                    self.publish(task);
                }
                continue;
            };

            info!(task_id = %id, task_type = %task.task_type, "task started");
            self.dispatch(id, handler, task.data.clone());
        }
    }

    /// Run the handler on the runtime. Whatever happens to it, the outcome
    /// comes back through `complete_task` or `fail_task`.
    fn dispatch(self: &Arc<Self>, id: TaskId, handler: Arc<dyn DynHandler>, data: serde_json::Value) {
        let weak = Arc::downgrade(self);
        let progress = ProgressReporter::new(id, move |id, percent| {
            if let Some(shared) = weak.upgrade() {
                shared.report_progress(id, percent);
            }
        });

        let shared = Arc::clone(self);
        self.runtime.spawn(async move {
            let job = tokio::spawn(async move { handler.handle_dyn(data, progress).await });
            match job.await {
                Ok(Ok(result)) => shared.complete_task(id, result),
                Ok(Err(err)) => shared.fail_task(id, err.to_string()),
                Err(join_err) => shared.fail_task(id, describe_abnormal_exit(join_err)),
            }
        });
    }

    fn report_progress(&self, id: TaskId, percent: u8) {
        let mut state = self.state.lock();
        if let Some(task) = state.tasks.get_mut(&id)
            && task.set_progress(percent)
        {
            debug!(task_id = %id, progress = task.progress, "progress");
            self.publish(task);
        }
    }

    fn complete_task(self: &Arc<Self>, id: TaskId, result: serde_json::Value) {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if !state.running.remove(&id) {
            error!(task_id = %id, "completion for a task that is not running");
            return;
        }
        if let Some(task) = state.tasks.get_mut(&id) {
            match task.complete(result, self.clock.now()) {
                Ok(()) => {
                    info!(task_id = %id, "task completed");
                    self.publish(task);
                }
                Err(e) => error!(error = %e, "completion refused"),
            }
        }

        self.admit_pending(state);
        self.refresh_counts(state);
    }

    fn fail_task(self: &Arc<Self>, id: TaskId, message: String) {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if !state.running.remove(&id) {
            error!(task_id = %id, "failure for a task that is not running");
            return;
        }
        if let Some(task) = state.tasks.get_mut(&id) {
            warn!(task_id = %id, error = %message, "task failed");
            match task.fail(message, self.clock.now()) {
                Ok(()) => self.publish(task),
                Err(e) => error!(error = %e, "failure refused"),
            }
        }

        self.admit_pending(state);
        self.refresh_counts(state);
    }
}

fn describe_abnormal_exit(err: JoinError) -> String {
    if !err.is_panic() {
        return "handler was aborted".to_string();
    }
    let payload = err.into_panic();
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("handler panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("handler panicked: {msg}")
    } else {
        "handler panicked".to_string()
    }
}
