use anyhow::Result;
use cadence::prelude::*;
use cadence::{ENGINE_NAME, VERSION as LIB_VERSION};
use colored::Colorize;
use rustyline::highlight::Highlighter;
use rustyline::Editor;
use rustyline_derive::{Completer, Helper, Hinter, Validator};
use std::borrow::Cow;
use std::env;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

const SHELL_VERSION: &str = env!("CARGO_PKG_VERSION");
const CONFIG_FILE: &str = "cadshell.toml";

/// A custom helper struct for rustyline that enables syntax highlighting.
#[derive(Completer, Helper, Hinter, Validator)]
struct MyHighlighter;

impl Highlighter for MyHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if let Some((command, rest)) = line.split_once(' ') {
            let colored_command = command.yellow().bold();
            let colored_rest = rest.yellow();
            Cow::Owned(format!("{} {}", colored_command, colored_rest))
        } else {
            Cow::Owned(line.yellow().bold().to_string())
        }
    }
    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

fn print_banner() {
    if env::var("QUIET_MODE").is_ok() {
        return;
    }
    const LOGO_TEXT: &str = include_str!("../logo.log");
    println!("{}", LOGO_TEXT.cyan());

    let version_string = format!(
        "          Shell   v{:<8} Library   v{:<8}",
        SHELL_VERSION, LIB_VERSION
    );

    println!("{}", "---------------------------------------------------------------".dimmed());
    println!("{}", version_string);
    println!("{}", "---------------------------------------------------------------".dimmed());
}

/// Spawns tasks subscribing to the engine's event streams.
fn spawn_event_listeners(engine: &CadenceEngine, is_listening_to_ticks: Arc<AtomicBool>) {
    let mut system_rx = engine.subscribe_system_events();
    tokio::spawn(async move {
        while let Ok(event) = system_rx.recv().await {
            println!("\n<-- [SYSTEM EVENT] {:?}\n>> ", event);
        }
    });

    let mut task_rx = engine.subscribe_task_events();
    tokio::spawn(async move {
        while let Ok(event) = task_rx.recv().await {
            match event {
                TaskEvent::Stalled { id, tick } => {
                    println!(
                        "\n<-- [STALL] task {:?} overran its window (tick #{})\n>> ",
                        id, tick.tick_count
                    );
                }
                TaskEvent::Completed { id, status } => {
                    println!("\n<-- [DONE] task {:?} finished with {:?}\n>> ", id, status);
                }
                _ => {}
            }
        }
    });

    // Tick listener (controlled by the shared flag).
    let mut tick_rx = engine.subscribe_ticks();
    tokio::spawn(async move {
        while let Ok(event) = tick_rx.recv().await {
            if is_listening_to_ticks.load(Ordering::Relaxed) && event.tick_count % 5 == 0 {
                println!("<-- [RAW TICK] Tick #{}", event.tick_count);
            }
        }
    });
}

fn status_label(status: TaskStatus) -> colored::ColoredString {
    match status {
        TaskStatus::Off => "off".dimmed(),
        TaskStatus::Armed => "armed".green(),
        TaskStatus::Running => "running".yellow(),
        TaskStatus::Failed => "failed".red(),
    }
}

async fn add_task(engine: &CadenceEngine, name: &str, seconds: u64, failing: bool) -> Result<()> {
    let task_name = name.to_string();
    let builder = if failing {
        engine
            .task_sync(name, move |outcome| {
                Err(anyhow::anyhow!("'{}' failed on purpose", outcome.name))
            })
            .await?
    } else {
        engine
            .task(name, move |outcome| async move {
                println!("\n<-- [ACTION] '{}' fired\n>> ", outcome.name);
                Ok(None)
            })
            .await?
    };
    builder
        .each(TimeUnit::Seconds, seconds)
        .on_fail(|outcome| async move {
            println!(
                "\n<-- [FAIL HOOK] '{}': {}\n>> ",
                outcome.name,
                outcome.result.as_deref().unwrap_or("unknown")
            );
        })
        .commit()
        .await;
    println!(
        "--> Committed task '{}' every {} second(s).",
        task_name, seconds
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let config = if Path::new(CONFIG_FILE).exists() {
        SchedulerConfig::from_file(Path::new(CONFIG_FILE))?
    } else {
        SchedulerConfig::default()
    };
    let engine = CadenceEngine::new(config);

    // Create the shared flag for the tick listener.
    let is_listening_to_ticks = Arc::new(AtomicBool::new(false));
    spawn_event_listeners(&engine, is_listening_to_ticks.clone());

    info!("Spawning {} in the background...", ENGINE_NAME.cyan());
    engine.start();

    let mut rl = Editor::new()?;
    let helper = MyHighlighter {};
    rl.set_helper(Some(helper));

    println!(
        "{} is running. Type 'help' for commands or 'exit' to quit.",
        ENGINE_NAME.cyan()
    );

    loop {
        let prompt = format!("{}", ">> ".cyan().bold());
        let readline = rl.readline(&prompt);
        match readline {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                let args = line.trim().split_whitespace().collect::<Vec<_>>();

                if let Some(command) = args.first() {
                    match *command {
                        "add" | "flaky" => {
                            let failing = *command == "flaky";
                            match (args.get(1), args.get(2).and_then(|s| s.parse::<u64>().ok())) {
                                (Some(name), Some(seconds)) => {
                                    if let Err(e) = add_task(&engine, name, seconds, failing).await
                                    {
                                        println!("Error: {}", e);
                                    }
                                }
                                _ => println!("Usage: {} <NAME> <SECONDS>", command),
                            }
                        }
                        "list" => {
                            let views = engine.tasks().await;
                            if views.is_empty() {
                                println!("No tasks registered.");
                            }
                            for view in views {
                                println!(
                                    "  {:<16} {:<8} window={:<5} space={:<5} wait={}",
                                    view.name,
                                    status_label(view.status),
                                    view.window,
                                    view.space,
                                    view.wait_time
                                );
                            }
                        }
                        "start" => {
                            if let Some(&"ticks") = args.get(1) {
                                is_listening_to_ticks.store(true, Ordering::Relaxed);
                                println!("--> Started listening to raw tick stream.");
                            } else {
                                println!("Unknown 'start' command. Try 'start ticks'.");
                            }
                        }
                        "stop" => {
                            if let Some(&"ticks") = args.get(1) {
                                is_listening_to_ticks.store(false, Ordering::Relaxed);
                                println!("--> Stopped listening to raw tick stream.");
                            } else {
                                println!("Unknown 'stop' command. Try 'stop ticks'.");
                            }
                        }
                        "debug" => match args.get(1) {
                            Some(&"on") => {
                                engine.set_debug(true);
                                println!("--> Countdown logging on.");
                            }
                            Some(&"off") => {
                                engine.set_debug(false);
                                println!("--> Countdown logging off.");
                            }
                            _ => println!("Usage: debug on|off"),
                        },
                        "help" => {
                            println!("Available commands:");
                            println!("  add <NAME> <S>    - Adds a task firing every S seconds.");
                            println!("  flaky <NAME> <S>  - Adds a task that always fails.");
                            println!("  list              - Shows every task and its countdown.");
                            println!("  start ticks       - Begins printing the raw tick stream.");
                            println!("  stop ticks        - Stops printing the raw tick stream.");
                            println!("  debug on|off      - Toggles per-tick countdown logging.");
                            println!("  exit              - Quits the shell.");
                        }
                        "exit" => break,
                        "" => {}
                        _ => println!("Unknown command: '{}'. Type 'help'.", line),
                    }
                }
            }
            Err(_) => {
                println!("Exiting cadshell...");
                break;
            }
        }
    }

    engine.stop();
    Ok(())
}
