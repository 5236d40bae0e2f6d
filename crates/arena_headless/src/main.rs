//! Command-line entry point for the headless runner.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use arena_headless::{ArenaSize, HeadlessRunner, Scenario};

/// Headless arena match runner.
#[derive(Debug, Parser)]
#[command(name = "arena_headless", about = "Run deterministic arena matches without graphics")]
struct Args {
    /// Scenario file (RON). Overrides the other match options.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Map seed; omitted seeds are drawn from entropy and reported.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of enemy tanks.
    #[arg(long, default_value_t = 3)]
    enemies: u32,

    /// Match length in ticks.
    #[arg(long, default_value_t = 1200)]
    ticks: u64,

    /// Arena size preset.
    #[arg(long, value_enum, default_value = "medium")]
    size: SizeArg,

    /// Pretty-print the JSON metrics.
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SizeArg {
    Small,
    Medium,
    Large,
}

impl From<SizeArg> for ArenaSize {
    fn from(value: SizeArg) -> Self {
        match value {
            SizeArg::Small => ArenaSize::Small,
            SizeArg::Medium => ArenaSize::Medium,
            SizeArg::Large => ArenaSize::Large,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let scenario = match &args.scenario {
        Some(path) => match Scenario::load(path) {
            Ok(scenario) => scenario,
            Err(error) => {
                eprintln!("error: {error}");
                return ExitCode::FAILURE;
            }
        },
        None => Scenario {
            name: "cli".into(),
            description: "command-line match".into(),
            arena_size: args.size.into(),
            seed: args.seed,
            enemies: args.enemies,
            duration_ticks: args.ticks,
            wall_density: None,
        },
    };

    let metrics = match HeadlessRunner::new(scenario).run() {
        Ok(metrics) => metrics,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::FAILURE;
        }
    };

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&metrics)
    } else {
        serde_json::to_string(&metrics)
    };
    match rendered {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: failed to serialize metrics: {error}");
            ExitCode::FAILURE
        }
    }
}
