//! The core engine that drives the Cadence scheduler.

use crate::builder::TaskBuilder;
use crate::common::{SchedulerError, TaskId};
use crate::components::registry::TaskRegistry;
use crate::components::task::{
    ActionResult, BoxedAction, Outcome, OutcomeStatus, TaskHook, TaskStatus, TaskView,
};
use crate::config::SchedulerConfig;
use crate::events::{SystemEvent, TaskEvent};
use crate::time::{SystemClock, TickEvent};
use futures::future::join_all;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, trace, warn};

/// The main Cadence engine.
///
/// This struct is the central point of control. It owns the task registry,
/// drives the tick loop, and runs the execution pipeline for every task whose
/// window elapses. The engine is designed to be cloned and shared across
/// tasks, providing a handle to the running instance; independent engines can
/// coexist in one process and are started and stopped individually.
#[derive(Clone)]
pub struct CadenceEngine {
    config: Arc<SchedulerConfig>,
    pub(crate) registry: Arc<RwLock<TaskRegistry>>,
    tick_sender: broadcast::Sender<Arc<TickEvent>>,
    system_event_sender: broadcast::Sender<SystemEvent>,
    pub(crate) task_event_sender: broadcast::Sender<TaskEvent>,
    shutdown_sender: broadcast::Sender<()>,
    started: Arc<AtomicBool>,
    debugging: Arc<AtomicBool>,
}

// Core implementation block for internal logic.
impl CadenceEngine {
    /// Creates a new `CadenceEngine` with the given configuration.
    pub fn new(config: SchedulerConfig) -> Self {
        const CHANNEL_CAPACITY: usize = 256;
        let (tick_sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (system_event_sender, _) = broadcast::channel(64);
        let (task_event_sender, _) = broadcast::channel(64);
        let (shutdown_sender, _) = broadcast::channel(1);
        let debugging = config.debug;

        Self {
            config: Arc::new(config),
            registry: Arc::new(RwLock::new(TaskRegistry::new())),
            tick_sender,
            system_event_sender,
            task_event_sender,
            shutdown_sender,
            started: Arc::new(AtomicBool::new(false)),
            debugging: Arc::new(AtomicBool::new(debugging)),
        }
    }

    #[doc(hidden)]
    async fn driver_loop(self, mut shutdown_rx: broadcast::Receiver<()>) {
        let mut tick_rx = self.tick_sender.subscribe();
        self.system_event_sender
            .send(SystemEvent::EngineStarted {
                timestamp: tokio::time::Instant::now(),
            })
            .ok();
        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                Ok(tick) = tick_rx.recv() => {
                    trace!("Tick #{} received.", tick.tick_count);
                    self.sweep(&tick).await;
                }
            }
        }
    }

    /// Advances every registered task by one tick, in registration order.
    ///
    /// Per task: a running task that has exhausted its stall budget gets a
    /// stall notice (observational only), a running task's budget is
    /// decremented, and an armed task's countdown is decremented. When the
    /// countdown reaches zero the task flips to `Running` and its execution
    /// pipeline is spawned fire-and-forget; the sweep never waits on it.
    ///
    /// Normally driven by the `SystemClock`. Public so tests and simulations
    /// can step the scheduler without wall-clock delay.
    pub async fn sweep(&self, tick: &Arc<TickEvent>) {
        let debugging = self.debugging.load(Ordering::Relaxed);
        let mut registry = self.registry.write().await;
        for (id, task) in registry.iter_mut() {
            if task.status == TaskStatus::Running && task.wait_time == 0 {
                warn!("Task '{}' is taking too long to complete.", task.name);
                self.task_event_sender
                    .send(TaskEvent::Stalled {
                        id,
                        tick: tick.clone(),
                    })
                    .ok();
            }
            if task.status == TaskStatus::Running {
                task.wait_time -= 1;
            }
            if task.status != TaskStatus::Armed {
                continue;
            }
            task.space -= 1;
            if task.space <= 0 {
                task.status = TaskStatus::Running;
                // The stall budget is one full window.
                task.wait_time = task.window as i64;
                let pipeline = self.clone();
                tokio::spawn(async move { pipeline.execute(id).await });
                self.task_event_sender
                    .send(TaskEvent::Triggered {
                        id,
                        tick: tick.clone(),
                    })
                    .ok();
            }
            if debugging {
                debug!("work {}: {}", task.name, task.space);
            }
        }
    }

    #[doc(hidden)]
    async fn execute(self, id: TaskId) {
        let (name, action, on_success, on_fail, on_done) = {
            let registry = self.registry.read().await;
            let Some(task) = registry.get(id) else {
                return;
            };
            (
                task.name.clone(),
                task.action.clone(),
                task.on_success.clone(),
                task.on_fail.clone(),
                task.on_done.clone(),
            )
        };

        let mut outcome = Outcome {
            name,
            id,
            result: None,
            status: OutcomeStatus::Pending,
        };

        // The action runs as its own task so a panic inside it is contained
        // and classified as a failed outcome, the same as a returned error.
        let settled = tokio::spawn((*action)(outcome.clone())).await;
        let (ok, payload) = match settled {
            Ok(Ok(value)) => (true, value),
            Ok(Err(err)) => (false, Some(err.to_string())),
            Err(err) => (false, Some(err.to_string())),
        };
        outcome.result = payload;
        outcome.status = if ok {
            OutcomeStatus::Success
        } else {
            OutcomeStatus::Failed
        };

        let hooks: &[TaskHook] = if ok { &on_success } else { &on_fail };
        self.dispatch_hooks(hooks, &outcome).await;
        self.dispatch_hooks(&on_done, &outcome).await;

        {
            let mut registry = self.registry.write().await;
            if let Some(task) = registry.get_mut(id) {
                task.space = task.window as i64;
                task.status = TaskStatus::Armed;
            }
        }
        self.task_event_sender
            .send(TaskEvent::Completed {
                id,
                status: outcome.status,
            })
            .ok();
    }

    /// Invokes one hook set concurrently and waits for all of it to settle.
    ///
    /// A hook fault never blocks its siblings or the task's re-arm.
    #[doc(hidden)]
    async fn dispatch_hooks(&self, hooks: &[TaskHook], outcome: &Outcome) {
        if hooks.is_empty() {
            return;
        }
        let handles: Vec<_> = hooks
            .iter()
            .map(|hook| tokio::spawn(hook(outcome.clone())))
            .collect();
        for settled in join_all(handles).await {
            if let Err(err) = settled {
                warn!("Hook for task '{}' failed: {}", outcome.name, err);
            }
        }
    }
}

// Public API implementation block.
impl CadenceEngine {
    /// Registers a new recurring task with an asynchronous action.
    ///
    /// The returned builder configures the task's window and hooks; the task
    /// is never scheduled until [`TaskBuilder::commit`] is called.
    ///
    /// # Errors
    /// Fails with [`SchedulerError::DuplicateName`] if a task with this name
    /// is already registered; the new task is not added.
    pub async fn task<F, Fut>(&self, name: &str, action: F) -> Result<TaskBuilder, SchedulerError>
    where
        F: Fn(Outcome) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        let boxed: BoxedAction = Box::new(move |outcome| Box::pin(action(outcome)));
        self.register(name, boxed).await
    }

    /// Registers a new recurring task with a synchronous action.
    ///
    /// Convenience wrapper for actions that never need to await.
    pub async fn task_sync<F>(&self, name: &str, action: F) -> Result<TaskBuilder, SchedulerError>
    where
        F: Fn(Outcome) -> ActionResult + Send + Sync + 'static,
    {
        let boxed: BoxedAction =
            Box::new(move |outcome| Box::pin(std::future::ready(action(outcome))));
        self.register(name, boxed).await
    }

    async fn register(
        &self,
        name: &str,
        action: BoxedAction,
    ) -> Result<TaskBuilder, SchedulerError> {
        let id = self.registry.write().await.insert(name, action)?;
        self.task_event_sender
            .send(TaskEvent::Registered { id })
            .ok();
        info!("Registered task '{}'.", name);
        Ok(TaskBuilder::new(self.clone(), id))
    }

    /// Looks up one task's scheduling state by id.
    pub async fn find(&self, id: TaskId) -> Option<TaskView> {
        self.registry.read().await.get(id).map(|task| task.view())
    }

    /// Looks up one task's scheduling state by name.
    pub async fn find_by_name(&self, name: &str) -> Option<TaskView> {
        let registry = self.registry.read().await;
        let id = registry.find_by_name(name)?;
        registry.get(id).map(|task| task.view())
    }

    /// Snapshots every registered task, in registration order.
    pub async fn tasks(&self) -> Vec<TaskView> {
        self.registry
            .read()
            .await
            .iter()
            .map(|(_, task)| task.view())
            .collect()
    }

    /// Starts the master clock and the driver loop.
    ///
    /// Idempotent: calling `start` on an already-running engine is a no-op,
    /// so at most one clock instance exists per engine.
    pub fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("{} starting up...", crate::ENGINE_NAME);

        let clock = SystemClock::new(self.config.resolution.clone(), self.tick_sender.clone());
        let clock_shutdown_rx = self.shutdown_sender.subscribe();
        tokio::spawn(async move { clock.run(clock_shutdown_rx).await });

        let driver = self.clone();
        let driver_shutdown_rx = self.shutdown_sender.subscribe();
        tokio::spawn(async move { driver.driver_loop(driver_shutdown_rx).await });
    }

    /// Stops the clock and the driver loop.
    ///
    /// In-flight execution pipelines are not cancelled; they settle on their
    /// own and re-arm their tasks, but no further ticks are processed.
    pub fn stop(&self) {
        if !self.started.swap(false, Ordering::SeqCst) {
            return;
        }
        self.shutdown_sender.send(()).ok();
        self.system_event_sender
            .send(SystemEvent::EngineShutdown)
            .ok();
        info!("{} has shut down.", crate::ENGINE_NAME);
    }

    /// Runs the engine until a Ctrl+C signal is received.
    pub async fn run(&self) -> anyhow::Result<()> {
        self.start();
        info!(
            "Engine running at {:?}. Press Ctrl+C to shut down.",
            self.config.resolution
        );
        tokio::signal::ctrl_c().await?;
        info!("Shutdown signal received.");
        self.stop();
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(())
    }

    /// Toggles verbose per-tick countdown logging.
    pub fn set_debug(&self, on: bool) {
        self.debugging.store(on, Ordering::Relaxed);
    }

    /// Subscribes to the raw tick stream.
    pub fn subscribe_ticks(&self) -> broadcast::Receiver<Arc<TickEvent>> {
        self.tick_sender.subscribe()
    }

    /// Subscribes to the `SystemEvent` stream.
    pub fn subscribe_system_events(&self) -> broadcast::Receiver<SystemEvent> {
        self.system_event_sender.subscribe()
    }

    /// Subscribes to the `TaskEvent` stream.
    pub fn subscribe_task_events(&self) -> broadcast::Receiver<TaskEvent> {
        self.task_event_sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TimeUnit;
    use crate::config::ClockResolution;
    use chrono::Utc;
    use std::sync::atomic::AtomicU32;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    fn engine() -> CadenceEngine {
        CadenceEngine::new(SchedulerConfig::default())
    }

    fn tick(n: u64) -> Arc<TickEvent> {
        Arc::new(TickEvent {
            tick_count: n,
            at: Utc::now(),
        })
    }

    async fn sweep_n(engine: &CadenceEngine, from: u64, count: u64) {
        for n in from..from + count {
            engine.sweep(&tick(n)).await;
        }
    }

    async fn wait_for_completion(
        events: &mut broadcast::Receiver<TaskEvent>,
        id: TaskId,
    ) -> OutcomeStatus {
        loop {
            let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
                .await
                .expect("timed out waiting for task completion")
                .expect("event stream closed");
            if let TaskEvent::Completed {
                id: completed,
                status,
            } = event
            {
                if completed == id {
                    return status;
                }
            }
        }
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let engine = engine();
        engine
            .task("nightly", |_| async { Ok(None) })
            .await
            .expect("first registration");
        let err = engine
            .task("nightly", |_| async { Ok(None) })
            .await
            .expect_err("duplicate name must fail");
        assert!(matches!(err, SchedulerError::DuplicateName(name) if name == "nightly"));
        assert_eq!(engine.tasks().await.len(), 1);
    }

    #[tokio::test]
    async fn commit_arms_task_with_full_window() {
        let engine = engine();
        engine
            .task("report", |_| async { Ok(None) })
            .await
            .expect("register")
            .each(TimeUnit::Seconds, 3)
            .commit()
            .await;

        let view = engine.find_by_name("report").await.expect("task exists");
        assert_eq!(view.status, TaskStatus::Armed);
        assert_eq!(view.window, 3);
        assert_eq!(view.space, 3);
    }

    #[tokio::test]
    async fn zero_window_is_coerced_to_one_second() {
        let engine = engine();
        engine
            .task("eager", |_| async { Ok(None) })
            .await
            .expect("register")
            .commit()
            .await;

        let view = engine.find_by_name("eager").await.expect("task exists");
        assert_eq!(view.window, 1);
        assert_eq!(view.space, 1);
    }

    #[tokio::test]
    async fn each_converts_minutes_and_hours_to_seconds() {
        let engine = engine();
        engine
            .task("minutely", |_| async { Ok(None) })
            .await
            .expect("register")
            .each(TimeUnit::Minutes, 2)
            .commit()
            .await;
        engine
            .task("hourly", |_| async { Ok(None) })
            .await
            .expect("register")
            .each(TimeUnit::Hours, 1)
            .commit()
            .await;

        assert_eq!(engine.find_by_name("minutely").await.unwrap().window, 120);
        assert_eq!(engine.find_by_name("hourly").await.unwrap().window, 3600);
    }

    #[tokio::test]
    async fn fires_exactly_on_window_boundary() {
        let engine = engine();
        let count = Arc::new(AtomicU32::new(0));
        let counter = count.clone();
        let builder = engine
            .task("steady", move |_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                }
            })
            .await
            .expect("register");
        let id = builder.id();
        builder.each(TimeUnit::Seconds, 3).commit().await;

        let mut events = engine.subscribe_task_events();
        sweep_n(&engine, 1, 2).await;
        assert_eq!(count.load(Ordering::SeqCst), 0, "must not fire early");
        let view = engine.find(id).await.expect("task exists");
        assert_eq!(view.status, TaskStatus::Armed);
        assert_eq!(view.space, 1);

        engine.sweep(&tick(3)).await;
        let status = wait_for_completion(&mut events, id).await;
        assert_eq!(status, OutcomeStatus::Success);
        assert_eq!(count.load(Ordering::SeqCst), 1, "fires exactly once");
    }

    #[tokio::test]
    async fn uncommitted_task_is_never_scheduled() {
        let engine = engine();
        let count = Arc::new(AtomicU32::new(0));
        let counter = count.clone();
        engine
            .task("dormant", move |_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                }
            })
            .await
            .expect("register");

        sweep_n(&engine, 1, 5).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        let view = engine.find_by_name("dormant").await.expect("task exists");
        assert_eq!(view.status, TaskStatus::Off);
        assert_eq!(view.space, 0);
    }

    #[tokio::test]
    async fn stall_notice_fires_while_task_keeps_running() {
        let engine = engine();
        let gate = Arc::new(Notify::new());
        let held = gate.clone();
        let builder = engine
            .task("slow", move |_| {
                let held = held.clone();
                async move {
                    held.notified().await;
                    Ok(None)
                }
            })
            .await
            .expect("register");
        let id = builder.id();
        builder.each(TimeUnit::Seconds, 2).commit().await;

        let mut events = engine.subscribe_task_events();
        // Tick 2 triggers the task; the action now blocks on the gate.
        sweep_n(&engine, 1, 2).await;
        let view = engine.find(id).await.expect("task exists");
        assert_eq!(view.status, TaskStatus::Running);
        assert_eq!(view.wait_time, 2);

        engine.sweep(&tick(3)).await;
        engine.sweep(&tick(4)).await;
        assert_eq!(engine.find(id).await.unwrap().wait_time, 0);

        // The budget is exhausted: the next sweep emits the stall notice and
        // keeps counting down below zero.
        engine.sweep(&tick(5)).await;
        loop {
            let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
                .await
                .expect("timed out waiting for stall notice")
                .expect("event stream closed");
            match event {
                TaskEvent::Stalled { id: stalled, tick } if stalled == id => {
                    assert_eq!(tick.tick_count, 5);
                    break;
                }
                _ => continue,
            }
        }
        let view = engine.find(id).await.expect("task exists");
        assert_eq!(view.status, TaskStatus::Running, "a stall never cancels");
        assert_eq!(view.wait_time, -1);

        gate.notify_one();
        let status = wait_for_completion(&mut events, id).await;
        assert_eq!(status, OutcomeStatus::Success);
        let view = engine.find(id).await.expect("task exists");
        assert_eq!(view.status, TaskStatus::Armed);
        assert_eq!(view.space, 2);
    }

    #[tokio::test]
    async fn success_dispatches_success_hooks_then_done_hooks() {
        let engine = engine();
        let log: Arc<Mutex<Vec<(String, OutcomeStatus, Option<String>)>>> =
            Arc::new(Mutex::new(Vec::new()));

        let success_log = log.clone();
        let fail_log = log.clone();
        let done_log = log.clone();
        let builder = engine
            .task("exporter", |_| async { Ok(Some("42".to_string())) })
            .await
            .expect("register")
            .on_success(move |outcome| {
                let log = success_log.clone();
                async move {
                    log.lock()
                        .unwrap()
                        .push(("success".into(), outcome.status, outcome.result.clone()));
                }
            })
            .on_fail(move |outcome| {
                let log = fail_log.clone();
                async move {
                    log.lock()
                        .unwrap()
                        .push(("fail".into(), outcome.status, outcome.result.clone()));
                }
            })
            .on_done(move |outcome| {
                let log = done_log.clone();
                async move {
                    log.lock()
                        .unwrap()
                        .push(("done".into(), outcome.status, outcome.result.clone()));
                }
            });
        let id = builder.id();
        builder.each(TimeUnit::Seconds, 1).commit().await;

        let mut events = engine.subscribe_task_events();
        engine.sweep(&tick(1)).await;
        let status = wait_for_completion(&mut events, id).await;
        assert_eq!(status, OutcomeStatus::Success);

        let entries = log.lock().unwrap();
        let phases: Vec<_> = entries.iter().map(|(phase, _, _)| phase.as_str()).collect();
        assert_eq!(phases, ["success", "done"], "on_fail must stay silent");
        for (_, status, result) in entries.iter() {
            assert_eq!(*status, OutcomeStatus::Success);
            assert_eq!(result.as_deref(), Some("42"));
        }
    }

    #[tokio::test]
    async fn failure_routes_payload_to_fail_and_done_hooks() {
        let engine = engine();
        let log: Arc<Mutex<Vec<(String, OutcomeStatus, Option<String>)>>> =
            Arc::new(Mutex::new(Vec::new()));

        let success_log = log.clone();
        let fail_log = log.clone();
        let done_log = log.clone();
        let builder = engine
            .task("flaky", |_| async { Err(anyhow::anyhow!("boom")) })
            .await
            .expect("register")
            .on_success(move |outcome| {
                let log = success_log.clone();
                async move {
                    log.lock()
                        .unwrap()
                        .push(("success".into(), outcome.status, outcome.result.clone()));
                }
            })
            .on_fail(move |outcome| {
                let log = fail_log.clone();
                async move {
                    log.lock()
                        .unwrap()
                        .push(("fail".into(), outcome.status, outcome.result.clone()));
                }
            })
            .on_done(move |outcome| {
                let log = done_log.clone();
                async move {
                    log.lock()
                        .unwrap()
                        .push(("done".into(), outcome.status, outcome.result.clone()));
                }
            });
        let id = builder.id();
        builder.each(TimeUnit::Seconds, 1).commit().await;

        let mut events = engine.subscribe_task_events();
        engine.sweep(&tick(1)).await;
        let status = wait_for_completion(&mut events, id).await;
        assert_eq!(status, OutcomeStatus::Failed);

        let entries = log.lock().unwrap();
        let phases: Vec<_> = entries.iter().map(|(phase, _, _)| phase.as_str()).collect();
        assert_eq!(phases, ["fail", "done"], "on_success must stay silent");
        for (_, status, result) in entries.iter() {
            assert_eq!(*status, OutcomeStatus::Failed);
            assert_eq!(result.as_deref(), Some("boom"));
        }
    }

    #[tokio::test]
    async fn task_rearms_and_fires_once_per_window() {
        let engine = engine();
        let count = Arc::new(AtomicU32::new(0));
        let counter = count.clone();
        let builder = engine
            .task("repeating", move |_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                }
            })
            .await
            .expect("register");
        let id = builder.id();
        builder.each(TimeUnit::Seconds, 2).commit().await;

        let mut events = engine.subscribe_task_events();
        sweep_n(&engine, 1, 2).await;
        wait_for_completion(&mut events, id).await;
        let view = engine.find(id).await.expect("task exists");
        assert_eq!(view.status, TaskStatus::Armed);
        assert_eq!(view.space, 2, "countdown resets to the full window");

        sweep_n(&engine, 3, 2).await;
        wait_for_completion(&mut events, id).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn sync_action_wrapper_runs_through_the_pipeline() {
        let engine = engine();
        let count = Arc::new(AtomicU32::new(0));
        let counter = count.clone();
        let builder = engine
            .task_sync("blocking", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            })
            .await
            .expect("register");
        let id = builder.id();
        builder.each(TimeUnit::Seconds, 1).commit().await;

        let mut events = engine.subscribe_task_events();
        engine.sweep(&tick(1)).await;
        let status = wait_for_completion(&mut events, id).await;
        assert_eq!(status, OutcomeStatus::Success);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn hook_panic_does_not_block_siblings_or_rearm() {
        let engine = engine();
        let log: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
        let sibling_log = log.clone();
        let builder = engine
            .task("volatile", |_| async { Ok(None) })
            .await
            .expect("register")
            .on_done(|_| async {
                panic!("hook exploded");
            })
            .on_done(move |_| {
                let log = sibling_log.clone();
                async move {
                    log.lock().unwrap().push("sibling ran");
                }
            });
        let id = builder.id();
        builder.each(TimeUnit::Seconds, 1).commit().await;

        let mut events = engine.subscribe_task_events();
        engine.sweep(&tick(1)).await;
        let status = wait_for_completion(&mut events, id).await;
        assert_eq!(status, OutcomeStatus::Success);
        assert_eq!(*log.lock().unwrap(), ["sibling ran"]);
        let view = engine.find(id).await.expect("task exists");
        assert_eq!(view.status, TaskStatus::Armed);
    }

    #[tokio::test]
    async fn start_twice_runs_a_single_clock() {
        let engine = CadenceEngine::new(SchedulerConfig {
            resolution: ClockResolution::Custom { millis_per_tick: 20 },
            debug: false,
        });
        let mut ticks = engine.subscribe_ticks();
        engine.start();
        engine.start();

        let mut last = 0u64;
        for _ in 0..5 {
            let tick = tokio::time::timeout(Duration::from_secs(2), ticks.recv())
                .await
                .expect("timed out waiting for a tick")
                .expect("tick stream closed");
            assert_eq!(
                tick.tick_count,
                last + 1,
                "a duplicate clock would repeat counts"
            );
            last = tick.tick_count;
        }
        engine.stop();
    }

    #[tokio::test]
    async fn end_to_end_with_running_clock() {
        let engine = CadenceEngine::new(SchedulerConfig {
            resolution: ClockResolution::Custom { millis_per_tick: 10 },
            debug: false,
        });
        let count = Arc::new(AtomicU32::new(0));
        let counter = count.clone();
        let builder = engine
            .task("clocked", move |_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                }
            })
            .await
            .expect("register");
        let id = builder.id();
        builder.each(TimeUnit::Seconds, 2).commit().await;

        let mut events = engine.subscribe_task_events();
        engine.start();
        let status = wait_for_completion(&mut events, id).await;
        engine.stop();
        assert_eq!(status, OutcomeStatus::Success);
        assert!(count.load(Ordering::SeqCst) >= 1);
    }
}
