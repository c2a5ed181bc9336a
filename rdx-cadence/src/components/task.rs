//! Defines the unit of scheduled work and its execution outcome record.

use crate::common::TaskId;
use futures::future::BoxFuture;
use std::sync::Arc;

/// What an action produces: an optional result payload, or a failure.
///
/// The `Option<String>` mirrors the loose contract of periodic jobs — most
/// return nothing, some return a value worth handing to hooks. Any `Err` is
/// classified as a failed outcome, never surfaced as a process-level error.
pub type ActionResult = anyhow::Result<Option<String>>;

/// The boxed form of a task's action closure.
pub type BoxedAction = Box<dyn Fn(Outcome) -> BoxFuture<'static, ActionResult> + Send + Sync>;

/// A lifecycle hook: takes the execution outcome, performs side effects only.
/// Its return value is deliberately `()`.
pub type TaskHook = Box<dyn Fn(Outcome) -> BoxFuture<'static, ()> + Send + Sync>;

/// The scheduling state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Registered but not committed; never scheduled.
    Off,
    /// Eligible for countdown and triggering.
    Armed,
    /// An execution pipeline is in flight.
    Running,
    /// Reserved for a permanent-failure policy; no transition sets it today.
    Failed,
}

/// The classification of one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Execution has not settled yet. This is what the action itself sees.
    Pending,
    /// The action returned a value (including none).
    Success,
    /// The action returned an error or terminated abnormally.
    Failed,
}

/// The record handed to a task's action and to every hook.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// The task's human-readable name.
    pub name: String,
    /// The task's registry key.
    pub id: TaskId,
    /// The returned value on success, or the failure payload.
    pub result: Option<String>,
    /// `Pending` while the action runs, then `Success` or `Failed`.
    pub status: OutcomeStatus,
}

/// The unit of scheduled work, owned by the [`TaskRegistry`].
///
/// [`TaskRegistry`]: crate::components::registry::TaskRegistry
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub(crate) action: Arc<BoxedAction>,
    /// Seconds between successive executions. Zero until commit, >= 1 after.
    pub window: u64,
    /// Ticks remaining until the next trigger; decremented only while `Armed`.
    pub space: i64,
    /// Stall budget while running; -1 before the first run, may go negative.
    pub wait_time: i64,
    pub status: TaskStatus,
    pub(crate) on_success: Arc<Vec<TaskHook>>,
    pub(crate) on_fail: Arc<Vec<TaskHook>>,
    pub(crate) on_done: Arc<Vec<TaskHook>>,
}

impl Task {
    pub(crate) fn new(id: TaskId, name: String, action: BoxedAction) -> Self {
        Self {
            id,
            name,
            action: Arc::new(action),
            window: 0,
            space: 0,
            wait_time: -1,
            status: TaskStatus::Off,
            on_success: Arc::new(Vec::new()),
            on_fail: Arc::new(Vec::new()),
            on_done: Arc::new(Vec::new()),
        }
    }

    /// A copyable snapshot of the task's scheduling state.
    pub fn view(&self) -> TaskView {
        TaskView {
            id: self.id,
            name: self.name.clone(),
            status: self.status,
            window: self.window,
            space: self.space,
            wait_time: self.wait_time,
        }
    }
}

/// A read-only snapshot of one task's scheduling state.
#[derive(Debug, Clone)]
pub struct TaskView {
    pub id: TaskId,
    pub name: String,
    pub status: TaskStatus,
    pub window: u64,
    pub space: i64,
    pub wait_time: i64,
}
