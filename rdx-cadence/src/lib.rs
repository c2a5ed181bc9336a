//! # Cadence
//!
//! A fixed-rate periodic task scheduler for Rust.
//!
//! Cadence runs named recurring jobs inside one process. Callers register a
//! task with a time window; once per second the engine counts every armed
//! task down, and when a task's window elapses its action runs as an
//! independent concurrent unit of work. The outcome — success or failure —
//! fans out to the task's registered hooks, and the task re-arms for its
//! next window. Tasks that overrun their window are flagged as stalled, but
//! never cancelled.
//!
//! ## Core Concepts
//!
//! - **SystemClock**: a one-tick-per-second master clock (configurable for
//!   demos and tests) that is the single source of time for an engine.
//! - **Sweep**: on every tick, the engine scans all tasks in registration
//!   order, advances their countdowns, and triggers due tasks without ever
//!   waiting on them — a slow action never delays the tick cadence.
//! - **Hooks**: `on_success`, `on_fail`, and `on_done` callbacks receive the
//!   execution outcome; each set is dispatched concurrently and the task only
//!   re-arms once every hook has settled.
//! - **Stall detection**: while a task runs it burns a budget of one full
//!   window; exhausting it produces a diagnostic notice, nothing more.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use cadence::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // 1. Create an engine. Instances are independent; no globals.
//!     let engine = CadenceEngine::new(SchedulerConfig::default());
//!
//!     // 2. Register a task and configure it through the builder.
//!     engine
//!         .task("heartbeat", |ctx| async move {
//!             println!("beat for '{}'", ctx.name);
//!             Ok(None)
//!         })
//!         .await?
//!         .each(TimeUnit::Seconds, 5)
//!         .on_done(|ctx| async move {
//!             println!("cycle finished: {:?}", ctx.status);
//!         })
//!         .commit()
//!         .await;
//!
//!     // 3. Run the engine. It will shut down on Ctrl+C.
//!     engine.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub const ENGINE_NAME: &str = "Cadence Engine";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Declare all the modules in the crate.
pub mod builder;
pub mod common;
pub mod components;
pub mod config;
pub mod engine;
pub mod events;
pub mod time;

/// A prelude module for easy importing of the most common Cadence types.
pub mod prelude {
    pub use crate::builder::{TaskBuilder, TimeUnit};
    pub use crate::common::{SchedulerError, TaskId};
    pub use crate::components::task::{
        ActionResult, Outcome, OutcomeStatus, TaskStatus, TaskView,
    };
    pub use crate::config::{ClockResolution, SchedulerConfig};
    pub use crate::engine::CadenceEngine;
    pub use crate::events::{SystemEvent, TaskEvent};
    pub use crate::time::TickEvent;
}
