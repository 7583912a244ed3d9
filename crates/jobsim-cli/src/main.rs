// jobsim CLI
// Runs scheduling policies and the burst-time predictor over a process file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use jobsim_core::{EngineConfig, IdleStrategy, PolicyKind, DEFAULT_QUANTUM};

mod commands;

#[derive(Parser)]
#[command(name = "jobsim")]
#[command(about = "CPU scheduling simulator with burst-time prediction", version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scheduling policy and print the full result
    Run {
        /// JSON file holding an array of process records
        file: PathBuf,

        /// Policy (fcfs, sjf, rr, priority, ai)
        #[arg(short, long, default_value = "fcfs")]
        policy: PolicyKind,

        /// Round Robin quantum
        #[arg(short, long, default_value_t = DEFAULT_QUANTUM)]
        quantum: u64,

        /// Seed for the burst-time predictor
        #[arg(long)]
        seed: Option<u64>,

        /// Idle clock handling
        #[arg(long, value_enum, default_value = "jump")]
        idle: IdleArg,
    },

    /// Run every policy and print a summary per policy
    Compare {
        /// JSON file holding an array of process records
        file: PathBuf,

        /// Seed for the burst-time predictor
        #[arg(long)]
        seed: Option<u64>,

        /// Round Robin quantum
        #[arg(short, long, default_value_t = DEFAULT_QUANTUM)]
        quantum: u64,
    },

    /// Predict burst times and report the model error
    Predict {
        /// JSON file holding an array of process records
        file: PathBuf,

        /// Seed for the burst-time predictor
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Train the priority advisor on a schedule and print its recommendations
    Advise {
        /// JSON file holding an array of process records
        file: PathBuf,

        /// Policy whose schedule provides the feedback
        #[arg(short, long, default_value = "sjf")]
        policy: PolicyKind,

        /// Round Robin quantum
        #[arg(short, long, default_value_t = DEFAULT_QUANTUM)]
        quantum: u64,

        /// Number of feedback passes over the schedule
        #[arg(short, long, default_value = "50")]
        episodes: usize,

        /// Seed for the predictor and the advisor
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum IdleArg {
    /// Advance one time unit per idle step
    Tick,
    /// Jump to the next arrival
    Jump,
}

impl From<IdleArg> for IdleStrategy {
    fn from(arg: IdleArg) -> Self {
        match arg {
            IdleArg::Tick => IdleStrategy::Tick,
            IdleArg::Jump => IdleStrategy::JumpToNextArrival,
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialise output")?;
    println!("{json}");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            file,
            policy,
            quantum,
            seed,
            idle,
        } => {
            let processes = commands::load_processes(&file)?;
            let config = EngineConfig {
                idle_strategy: idle.into(),
                ..EngineConfig::default()
            };
            let result = commands::run_policy(&processes, policy, quantum, seed, config)?;
            print_json(&result)
        }
        Commands::Compare {
            file,
            seed,
            quantum,
        } => {
            let processes = commands::load_processes(&file)?;
            let config = EngineConfig {
                default_quantum: quantum,
                ..EngineConfig::default()
            };
            print_json(&commands::compare(&processes, seed, config)?)
        }
        Commands::Predict { file, seed } => {
            let processes = commands::load_processes(&file)?;
            print_json(&commands::predict(&processes, seed)?)
        }
        Commands::Advise {
            file,
            policy,
            quantum,
            episodes,
            seed,
        } => {
            let processes = commands::load_processes(&file)?;
            let advice = commands::advise(
                &processes,
                policy,
                quantum,
                episodes,
                seed,
                EngineConfig::default(),
            )?;
            print_json(&advice)
        }
    }
}
