//! The fluent configuration surface returned by task registration.
//!
//! A builder is bound to exactly one registered task. It accumulates the
//! task's window and hook sets locally and writes them into the registry in
//! one step when [`TaskBuilder::commit`] is called; until then the task stays
//! `Off` and the tick driver never looks at it.

use crate::common::TaskId;
use crate::components::task::{Outcome, TaskHook, TaskStatus};
use crate::engine::CadenceEngine;
use crate::events::TaskEvent;
use std::future::Future;
use std::sync::Arc;

/// The unit used to express a task's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
}

/// Configures one registered task; obtained from [`CadenceEngine::task`].
pub struct TaskBuilder {
    engine: CadenceEngine,
    id: TaskId,
    window: u64,
    on_success: Vec<TaskHook>,
    on_fail: Vec<TaskHook>,
    on_done: Vec<TaskHook>,
}

impl std::fmt::Debug for TaskBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskBuilder")
            .field("id", &self.id)
            .field("window", &self.window)
            .field("on_success", &self.on_success.len())
            .field("on_fail", &self.on_fail.len())
            .field("on_done", &self.on_done.len())
            .finish()
    }
}

impl TaskBuilder {
    pub(crate) fn new(engine: CadenceEngine, id: TaskId) -> Self {
        Self {
            engine,
            id,
            window: 0,
            on_success: Vec::new(),
            on_fail: Vec::new(),
            on_done: Vec::new(),
        }
    }

    /// The id assigned to the task at registration.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Appends a hook invoked when an execution succeeds.
    pub fn on_success<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Outcome) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let boxed: TaskHook = Box::new(move |o| Box::pin(hook(o)));
        self.on_success.push(boxed);
        self
    }

    /// Appends a hook invoked when an execution fails.
    pub fn on_fail<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Outcome) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let boxed: TaskHook = Box::new(move |o| Box::pin(hook(o)));
        self.on_fail.push(boxed);
        self
    }

    /// Appends a hook invoked after every execution, regardless of outcome.
    pub fn on_done<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Outcome) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let boxed: TaskHook = Box::new(move |o| Box::pin(hook(o)));
        self.on_done.push(boxed);
        self
    }

    /// Sets the window between successive executions.
    ///
    /// Repeated calls overwrite the previous value.
    pub fn each(mut self, unit: TimeUnit, value: u64) -> Self {
        self.window = match unit {
            TimeUnit::Seconds => value,
            TimeUnit::Minutes => value.saturating_mul(60),
            TimeUnit::Hours => value.saturating_mul(3600),
        };
        self
    }

    /// Finalizes the task and makes it schedulable.
    ///
    /// Coerces the window to at least one second, installs the hook sets,
    /// resets the countdown to the full window, and arms the task.
    pub async fn commit(self) {
        let window = self.window.max(1);
        {
            let mut registry = self.engine.registry.write().await;
            if let Some(task) = registry.get_mut(self.id) {
                task.window = window;
                task.space = window as i64;
                task.on_success = Arc::new(self.on_success);
                task.on_fail = Arc::new(self.on_fail);
                task.on_done = Arc::new(self.on_done);
                task.status = TaskStatus::Armed;
            }
        }
        self.engine
            .task_event_sender
            .send(TaskEvent::Armed {
                id: self.id,
                window,
            })
            .ok();
    }
}
