mod console;
mod error;
mod output;
mod runtime;

use clap::{Parser, Subcommand};
use console::{Command, Console};
use error::{CliError, CliResult};
use output::CsvSink;
use rx_project::{ControlModeDef, PacingDef, Scenario};
use rx_sim::{ReactorSimulation, RunSummary, run};
use runtime::{EditSchedule, build_setup};
use std::cell::Cell;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rx-cli")]
#[command(about = "Jacketed reactor temperature-control simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario and write snapshots as CSV
    Run(RunArgs),
    /// Validate a scenario file
    Validate {
        /// Path to the scenario file (.yaml, .yml or .json)
        scenario_path: PathBuf,
    },
    /// Print the default scenario
    Defaults {
        /// Print JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Scenario file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Simulated seconds to run
    #[arg(short, long, default_value_t = 1800.0)]
    duration: f64,
    /// Pace ticks to wall-clock time
    #[arg(long)]
    realtime: bool,
    /// Start in open loop
    #[arg(long)]
    open_loop: bool,
    /// Open-loop valve position override
    #[arg(long)]
    valve: Option<f64>,
    /// Controller setpoint, °C
    #[arg(long)]
    setpoint: Option<f64>,
    /// Output CSV file (optional, defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Accept operator commands on stdin
    #[arg(long)]
    console: bool,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => cmd_run(&args),
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Defaults { json } => cmd_defaults(json),
    }
}

fn cmd_validate(scenario_path: &Path) -> CliResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = rx_project::load(scenario_path)?;
    println!("✓ Scenario '{}' is valid", scenario.name);
    println!("  dt = {} s, pacing = {:?}", scenario.clock.dt_s, scenario.clock.pacing);
    println!("  Scheduled edits: {}", scenario.edits.len());
    Ok(())
}

fn cmd_defaults(json: bool) -> CliResult<()> {
    let scenario = Scenario::default();
    let text = if json {
        rx_project::to_json_string(&scenario)?
    } else {
        rx_project::to_yaml_string(&scenario)?
    };
    println!("{}", text.trim_end());
    Ok(())
}

/// Scenario from file (or defaults) with command-line overrides applied.
fn resolve_scenario(args: &RunArgs) -> CliResult<Scenario> {
    let mut scenario = match &args.config {
        Some(path) => rx_project::load(path)?,
        None => Scenario::default(),
    };
    if args.realtime {
        scenario.clock.pacing = PacingDef::RealTime;
    }
    if args.open_loop {
        scenario.control.mode = ControlModeDef::OpenLoop;
    }
    if let Some(valve) = args.valve {
        scenario.control.valve = valve;
    }
    if let Some(setpoint) = args.setpoint {
        scenario.control.pid.setpoint_c = setpoint;
    }
    rx_project::validate_scenario(&scenario)?;
    Ok(scenario)
}

fn cmd_run(args: &RunArgs) -> CliResult<()> {
    if !args.duration.is_finite() || args.duration <= 0.0 {
        return Err(CliError::InvalidInput(format!(
            "duration must be positive, got {}",
            args.duration
        )));
    }

    let scenario = resolve_scenario(args)?;
    let mut sim = ReactorSimulation::new(build_setup(&scenario)?)?;
    let dt = sim.clock().dt();
    let mut schedule = EditSchedule::new(&scenario.edits, dt);
    let console = args.console.then(Console::spawn);
    if console.is_some() {
        eprintln!("{}", console::HELP);
    }

    tracing::info!(
        scenario = %scenario.name,
        duration = args.duration,
        edits = scenario.edits.len(),
        "running scenario"
    );

    // Edits scheduled at t = 0 apply before the first tick.
    for update in schedule.due(sim.time()) {
        let _ = sim.apply(update);
    }

    let out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(std::fs::File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let write_failed = Cell::new(false);
    let mut sink = CsvSink::new(out, &write_failed)?;

    let stop_at = args.duration - 1e-9 * dt;
    let result = run(&mut sim, &mut sink, |sim| {
        if write_failed.get() {
            sim.stop();
            return;
        }
        // Rejected edits are logged by `apply` and dropped.
        for update in schedule.due(sim.time()) {
            let _ = sim.apply(update);
        }
        if let Some(console) = &console {
            for command in console.drain() {
                match command {
                    Command::Update(update) => {
                        let _ = sim.apply(update);
                    }
                    Command::Quit => {
                        sim.stop();
                    }
                }
            }
        }
        if sim.time() >= stop_at {
            sim.stop();
        }
    });
    let rows = sink.finish();

    let summary = result?;
    let rows = rows?;
    if let Some(path) = &args.output {
        println!("✓ Wrote {} snapshots to {}", rows, path.display());
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("\nRun summary:");
    println!("  Ticks:        {}", summary.ticks);
    println!("  Final time:   {:.3} s", summary.final_time);
    println!(
        "  Final temps:  T = {:.3} °C, Tj = {:.3} °C",
        summary.final_state.reactor_temp, summary.final_state.jacket_temp
    );
    println!(
        "  T range:      {:.3} - {:.3} °C",
        summary.min_reactor_temp, summary.max_reactor_temp
    );
    println!("  Wall time:    {:.3} s", summary.wall_time.as_secs_f64());
}
