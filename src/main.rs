use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::Instrument;

use laundry_tracker::display::{format_time, machine_title, render_room, render_snapshot};
use laundry_tracker::telemetry::session_span;
use laundry_tracker::{
    generate_correlation_id, init_telemetry, shutdown_telemetry, ActionOutcome, LaundryService,
    LaundrySnapshot, LaundryState, LaundryTrackerConfig, MachineId, ShutdownCoordinator,
};

#[derive(Parser)]
#[command(name = "laundry-tracker")]
#[command(about = "Campus laundry room status dashboard")]
#[command(long_about = "Shows washer and dryer availability across campus laundry rooms. \
                       Machine timers are simulated in memory and reset on every start.")]
struct Cli {
    /// Configuration file (defaults to ./laundry-tracker.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print snapshots as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every room, or a single room
    Status {
        /// Room id, e.g. sentinelHall
        #[arg(long)]
        room: Option<String>,
    },
    /// Apply actions to a fresh dataset and fast-forward the clock
    Simulate {
        /// Number of one-second ticks to apply
        #[arg(long, default_value = "60")]
        seconds: u64,
        /// Start a cycle on this machine before ticking (repeatable)
        #[arg(long = "start", value_name = "ID")]
        start: Vec<MachineId>,
        /// Report a machine as broken, as ID=MESSAGE (repeatable)
        #[arg(long = "report", value_name = "ID=MESSAGE", value_parser = parse_report)]
        report: Vec<(MachineId, String)>,
    },
    /// Live dashboard driven by the tick scheduler, controlled from stdin
    Run {
        /// Stop automatically after this many seconds
        #[arg(long)]
        duration: Option<u64>,
    },
}

fn parse_report(arg: &str) -> Result<(MachineId, String), String> {
    let (id, message) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected ID=MESSAGE, got '{arg}'"))?;
    let id = id
        .trim()
        .parse::<MachineId>()
        .map_err(|_| format!("invalid machine id '{id}'"))?;
    Ok((id, message.to_string()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_file = LaundryTrackerConfig::load_env_file();
    let config = LaundryTrackerConfig::load(cli.config.as_deref())?;
    init_telemetry(&config.observability)?;
    match env_file {
        Ok(true) => tracing::info!("Loaded environment variables from .env file"),
        Ok(false) => {}
        Err(e) => tracing::warn!(error = %e, "Failed to load .env file"),
    }

    let result = match cli.command {
        None => status_command(&config, None, cli.json),
        Some(Commands::Status { room }) => status_command(&config, room.as_deref(), cli.json),
        Some(Commands::Simulate { seconds, start, report }) => {
            tokio::runtime::Runtime::new()?.block_on(async {
                simulate_command(&config, seconds, start, report, cli.json).await
            })
        }
        Some(Commands::Run { duration }) => {
            let runtime = tokio::runtime::Runtime::new()?;
            let result = runtime.block_on(async { run_command(&config, duration).await });
            // A stdin read may still be parked on a blocking thread
            runtime.shutdown_background();
            result
        }
    };

    shutdown_telemetry();
    result
}

fn print_snapshot(snapshot: &LaundrySnapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
    } else {
        println!("🧺 Laundry Tracker");
        println!();
        println!("{}", render_snapshot(snapshot));
    }
    Ok(())
}

fn status_command(config: &LaundryTrackerConfig, room: Option<&str>, json: bool) -> Result<()> {
    let state = LaundryState::new(config.engine);

    let Some(room_id) = room else {
        return print_snapshot(&state.snapshot(), json);
    };

    let room = state
        .find_room(room_id)
        .with_context(|| format!("Room '{room_id}' not found"))?;
    if json {
        println!("{}", serde_json::to_string_pretty(room)?);
    } else {
        print!("{}", render_room(room));
    }
    Ok(())
}

async fn simulate_command(
    config: &LaundryTrackerConfig,
    seconds: u64,
    start: Vec<MachineId>,
    report: Vec<(MachineId, String)>,
    json: bool,
) -> Result<()> {
    let service = LaundryService::new(LaundryState::new(config.engine));

    for machine_id in start {
        service
            .start_cycle(machine_id)
            .await
            .with_context(|| format!("Cannot start machine #{machine_id}"))?;
    }
    for (machine_id, message) in report {
        service
            .report_fault(machine_id, &message)
            .await
            .with_context(|| format!("Cannot report machine #{machine_id}"))?;
    }

    let mut changes = 0;
    for _ in 0..seconds {
        changes += service.tick().await.changes.len();
    }
    tracing::info!(ticks = %seconds, changes = %changes, "Simulation finished");

    if !json {
        println!("⏱️  Simulated {seconds}s ({changes} status changes)");
        println!();
    }
    print_snapshot(&service.snapshot().await, json)
}

/// A line typed into the live dashboard
#[derive(Debug, PartialEq, Eq)]
enum DashboardCommand {
    Start(MachineId),
    Report(MachineId, String),
    Action(MachineId),
    Room(String),
    Show,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<DashboardCommand, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let machine_id = |arg: &str| -> Result<MachineId, String> {
        arg.parse::<MachineId>()
            .map_err(|_| format!("'{arg}' is not a machine id"))
    };

    match verb {
        "start" => Ok(DashboardCommand::Start(machine_id(rest)?)),
        "action" => Ok(DashboardCommand::Action(machine_id(rest)?)),
        "report" => {
            let (id, message) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            Ok(DashboardCommand::Report(machine_id(id)?, message.trim().to_string()))
        }
        "room" if !rest.is_empty() => Ok(DashboardCommand::Room(rest.to_string())),
        "room" => Err("usage: room <id>".to_string()),
        "show" | "" => Ok(DashboardCommand::Show),
        "help" | "?" => Ok(DashboardCommand::Help),
        "quit" | "exit" => Ok(DashboardCommand::Quit),
        other => Err(format!("unknown command '{other}' (try 'help')")),
    }
}

fn print_dashboard_help() {
    println!("Commands:");
    println!("  show                  show the selected room (or all rooms)");
    println!("  room <id>             select a room");
    println!("  action <id>           press a machine's button");
    println!("  start <id>            start a cycle on an available machine");
    println!("  report <id> <message> report a machine as out of order");
    println!("  quit                  stop the dashboard");
}

async fn show(service: &LaundryService, selected_room: Option<&str>) {
    match selected_room {
        Some(room_id) => match service.room(room_id).await {
            Some(room) => print!("{}", render_room(&room)),
            None => println!("❌ Room '{room_id}' not found"),
        },
        None => println!("{}", render_snapshot(&service.snapshot().await)),
    }
}

/// Returns false once the user asks to quit
async fn handle_line(
    service: &LaundryService,
    selected_room: &mut Option<String>,
    line: &str,
) -> bool {
    let command = match parse_command(line) {
        Ok(command) => command,
        Err(message) => {
            println!("❌ {message}");
            return true;
        }
    };

    match command {
        DashboardCommand::Start(machine_id) => match service.start_cycle(machine_id).await {
            Ok(machine) => println!(
                "✅ Started {} ({})",
                machine_title(&machine),
                format_time(machine.timer)
            ),
            Err(e) => println!("❌ {e}"),
        },
        DashboardCommand::Report(machine_id, message) => {
            match service.report_fault(machine_id, &message).await {
                Ok(machine) => println!("🛠️  {} marked out of order", machine_title(&machine)),
                Err(e) => println!("❌ {e}"),
            }
        }
        DashboardCommand::Action(machine_id) => match service.handle_action(machine_id).await {
            Ok(ActionOutcome::Started(machine)) => {
                println!("✅ Started {} ({})", machine_title(&machine), format_time(machine.timer))
            }
            Ok(ActionOutcome::NeedsReport(machine)) => println!(
                "📝 {} is busy. Describe the issue with: report {} <message>",
                machine_title(&machine),
                machine.id
            ),
            Ok(ActionOutcome::Disabled(machine)) => {
                println!("🚫 {} is out of order", machine_title(&machine))
            }
            Err(e) => println!("❌ {e}"),
        },
        DashboardCommand::Room(room_id) => {
            if service.room(&room_id).await.is_some() {
                *selected_room = Some(room_id);
                show(service, selected_room.as_deref()).await;
            } else {
                println!("❌ Room '{room_id}' not found");
            }
        }
        DashboardCommand::Show => show(service, selected_room.as_deref()).await,
        DashboardCommand::Help => print_dashboard_help(),
        DashboardCommand::Quit => return false,
    }
    true
}

async fn run_command(config: &LaundryTrackerConfig, duration: Option<u64>) -> Result<()> {
    let correlation_id = generate_correlation_id();
    run_dashboard(config, duration)
        .instrument(session_span(&correlation_id))
        .await
}

async fn run_dashboard(config: &LaundryTrackerConfig, duration: Option<u64>) -> Result<()> {
    let service = Arc::new(LaundryService::new(LaundryState::new(config.engine)));
    service.start_ticking(config.scheduler.tick_period()).await;

    let coordinator = ShutdownCoordinator::new();
    if let Some(secs) = duration {
        let trigger = coordinator.trigger();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            trigger.shutdown();
        });
    }

    println!("🧺 Laundry Tracker - live dashboard (type 'help' for commands)");
    println!();
    show(&service, None).await;

    let mut selected_room: Option<String> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = coordinator.wait_for_shutdown();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            line = lines.next_line() => {
                match line.context("Failed to read from stdin")? {
                    Some(line) => {
                        if !handle_line(&service, &mut selected_room, &line).await {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    let ticks = service.stop().await.unwrap_or(0);
    println!();
    println!("👋 Dashboard stopped after {ticks} ticks");
    Ok(())
}
