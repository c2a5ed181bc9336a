use anyhow::Result;
use cadence::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    // 2. Create the engine. A compressed tick makes the demo snappy; drop the
    //    custom resolution for real one-second scheduling.
    let config = SchedulerConfig {
        resolution: ClockResolution::Custom {
            millis_per_tick: 250,
        },
        debug: true,
    };
    let engine = CadenceEngine::new(config);

    // 3. Spawn concurrent tasks to listen to the engine's event streams.
    spawn_event_listeners(&engine);

    // 4. Register tasks to exercise the scheduling pipeline.
    register_demo_tasks(&engine).await?;

    // 5. Run the engine. This blocks until Ctrl+C.
    engine.run().await?;

    Ok(())
}

/// Spawns tasks subscribing to the engine's event streams.
fn spawn_event_listeners(engine: &CadenceEngine) {
    let mut system_rx = engine.subscribe_system_events();
    tokio::spawn(async move {
        while let Ok(event) = system_rx.recv().await {
            info!("[SYSTEM] => {:?}", event);
        }
    });

    let mut task_rx = engine.subscribe_task_events();
    tokio::spawn(async move {
        while let Ok(event) = task_rx.recv().await {
            info!("[TASK] => {:?}", event);
        }
    });
}

/// Registers demo tasks covering the success, failure, and stall paths.
async fn register_demo_tasks(engine: &CadenceEngine) -> Result<()> {
    // --- A steady heartbeat with a success hook ---
    let beats = Arc::new(AtomicU32::new(0));
    let counter = beats.clone();
    engine
        .task("heartbeat", move |_| {
            let counter = counter.clone();
            async move {
                let beat = counter.fetch_add(1, Ordering::Relaxed) + 1;
                Ok(Some(beat.to_string()))
            }
        })
        .await?
        .each(TimeUnit::Seconds, 2)
        .on_success(|outcome| async move {
            info!("[HEARTBEAT] beat #{}", outcome.result.as_deref().unwrap_or("?"));
        })
        .commit()
        .await;

    // --- A task that always fails, to show the on_fail path ---
    engine
        .task_sync("flaky", |_| Err(anyhow::anyhow!("upstream unreachable")))
        .await?
        .each(TimeUnit::Seconds, 3)
        .on_fail(|outcome| async move {
            warn!(
                "[FLAKY] failed: {}",
                outcome.result.as_deref().unwrap_or("unknown")
            );
        })
        .on_done(|outcome| async move {
            info!("[FLAKY] cycle done with {:?}", outcome.status);
        })
        .commit()
        .await;

    // --- A task slower than its own window, to show stall notices ---
    engine
        .task("sluggish", |_| async move {
            tokio::time::sleep(std::time::Duration::from_secs(2)).await;
            Ok(None)
        })
        .await?
        .each(TimeUnit::Seconds, 2)
        .on_done(|outcome| async move {
            info!("[SLUGGISH] finally finished '{}'", outcome.name);
        })
        .commit()
        .await;

    Ok(())
}
