mod report;

use clap::{Args, Parser, Subcommand};
use jump_sim_core::core_types::{
    BUBBLE_DENSITY, DEFAULT_JUMP_END, DEFAULT_JUMP_START, DEFAULT_JUMP_STEP, DEFAULT_MAX_HOP,
    DEFAULT_QUEUE_CAPACITY, FIELD_PADDING, FIELD_SIZE,
};
use jump_sim_core::{sphere_density, FieldGeometry, JumpRangeSweep, SweepConfig, SweepRunner};
use report::{OutputFormat, Reporter};
use std::io::{self, BufWriter};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Jump-range sweeps over random 3D point fields
#[derive(Parser, Debug)]
#[command(name = "jumpsim")]
#[command(about = "Jump route reachability simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a jump-range sweep and print one record per trial
    Sweep(SweepArgs),
    /// Print the density of `count` points spread through a sphere of `radius`
    SphereDensity {
        /// Sphere radius
        #[arg(short, long, default_value_t = 20.0)]
        radius: f64,

        /// Point count
        #[arg(short, long, default_value_t = 50.0)]
        count: f64,
    },
}

#[derive(Args, Debug)]
struct SweepArgs {
    /// Field density in points per cubic unit
    #[arg(short, long, default_value_t = BUBBLE_DENSITY)]
    density: f64,

    /// Trials per jump range
    #[arg(short = 'n', long, default_value_t = 1)]
    trials: usize,

    /// Hop budget for a single trial
    #[arg(short = 'm', long, default_value_t = DEFAULT_MAX_HOP)]
    max_hop: usize,

    /// First jump range of the sweep
    #[arg(long, default_value_t = DEFAULT_JUMP_START)]
    jump_start: f64,

    /// Exclusive upper bound of the sweep
    #[arg(long, default_value_t = DEFAULT_JUMP_END)]
    jump_end: f64,

    /// Jump range increment
    #[arg(long, default_value_t = DEFAULT_JUMP_STEP)]
    jump_step: f64,

    /// Start-to-goal separation
    #[arg(long, default_value_t = FIELD_SIZE)]
    field_size: f64,

    /// Padding generated on each side of the corridor
    #[arg(long, default_value_t = FIELD_PADDING)]
    field_padding: f64,

    /// Worker threads (default: available cores minus two)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Capacity of the problem and result queues
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,

    /// Base seed (default: random, logged at start)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Tsv)]
    format: OutputFormat,

    /// Print one aggregate per jump range instead of per-trial records
    #[arg(long)]
    summary: bool,

    /// Dump the resolved configuration as JSON to stderr before running
    #[arg(long)]
    print_config: bool,
}

impl SweepArgs {
    fn config(&self) -> SweepConfig {
        SweepConfig {
            geometry: FieldGeometry {
                field_size: self.field_size,
                field_padding: self.field_padding,
            },
            density: self.density,
            sweep: JumpRangeSweep {
                start: self.jump_start,
                end: self.jump_end,
                step: self.jump_step,
                trials: self.trials,
            },
            max_hop: self.max_hop,
            seed: self.seed,
            workers: self.workers,
            queue_capacity: self.queue_capacity,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    match Cli::parse().command {
        Command::Sweep(args) => sweep(&args),
        Command::SphereDensity { radius, count } => {
            println!("{}", sphere_density(radius, count));
            ExitCode::SUCCESS
        }
    }
}

fn sweep(args: &SweepArgs) -> ExitCode {
    let runner = match SweepRunner::new(args.config()) {
        Ok(runner) => runner,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.print_config {
        // Resolved seed and worker count
        let resolved = SweepConfig {
            seed: Some(runner.seed()),
            workers: Some(runner.config().worker_count()),
            ..runner.config().clone()
        };
        match serde_json::to_string_pretty(&resolved) {
            Ok(json) => eprintln!("{json}"),
            Err(e) => warn!("Could not serialize configuration: {}", e),
        }
    }

    let stdout = io::stdout().lock();
    let mut reporter = Reporter::new(
        BufWriter::new(stdout),
        args.format,
        args.field_size,
        args.summary,
    );
    if let Err(e) = reporter.write_header() {
        error!("Failed to write output: {}", e);
        return ExitCode::FAILURE;
    }

    let cancel = runner.cancel_token();
    let mut write_error = None;
    let outcome = runner.run(|result| {
        if write_error.is_some() {
            return;
        }
        if let Err(e) = reporter.record(&result) {
            // Output is gone, stop dispatching
            cancel.cancel();
            write_error = Some(e);
        }
    });

    let flushed = reporter.finish();
    if let Some(e) = write_error.or(flushed.err()) {
        error!("Failed to write output: {}", e);
        return ExitCode::FAILURE;
    }

    match outcome {
        Ok(summary) => {
            info!("Done: {} result(s), seed={}", summary.emitted, runner.seed());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Sweep failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
