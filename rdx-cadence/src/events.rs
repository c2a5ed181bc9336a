//! Defines the public event types broadcast by the Cadence engine.
//!
//! This module is the observability surface of the engine. Applications and
//! tests subscribe to these strongly-typed streams to watch the scheduler
//! work without registering hooks on individual tasks.

use crate::common::TaskId;
use crate::components::task::OutcomeStatus;
use crate::time::TickEvent;
use std::sync::Arc;
use tokio::time::Instant;

/// Events related to the lifecycle and state of the engine itself.
#[derive(Debug, Clone)]
pub enum SystemEvent {
    /// Fired once when the engine's driver loop begins.
    EngineStarted { timestamp: Instant },
    /// Fired once when the engine is shutting down.
    EngineShutdown,
}

/// Events related to the lifecycle of scheduled tasks.
#[derive(Debug, Clone)]
pub enum TaskEvent {
    /// Fired when a new task is successfully registered.
    Registered { id: TaskId },
    /// Fired when a registered task is committed and becomes schedulable.
    Armed { id: TaskId, window: u64 },
    /// Fired when a task's countdown elapses and its pipeline is spawned.
    Triggered { id: TaskId, tick: Arc<TickEvent> },
    /// Fired when a running task has exhausted its stall budget.
    ///
    /// Observational only: the task keeps running and will re-arm normally
    /// when its pipeline completes.
    Stalled { id: TaskId, tick: Arc<TickEvent> },
    /// Fired when a task's execution pipeline has settled and the task has
    /// been re-armed.
    Completed { id: TaskId, status: OutcomeStatus },
}
