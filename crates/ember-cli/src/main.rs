//! Ember CLI - run and check particle effects headless

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{simulate, validate};

#[derive(Parser)]
#[command(name = "ember")]
#[command(about = "Headless runner for Ember particle effects", long_about = None)]
#[command(version)]
struct Cli {
    /// Log emitter construction and lifecycle events
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an effect for a fixed amount of simulated time
    Simulate {
        /// Path to effect TOML file
        effect: String,

        /// Simulated seconds
        #[arg(long, default_value = "5.0")]
        seconds: f64,

        /// Frames per simulated second
        #[arg(long, default_value = "60.0")]
        fps: f64,

        /// Seed for the effect's random source (time-seeded if omitted)
        #[arg(long)]
        seed: Option<u32>,

        /// Vary frame length between 0.5x and 1.5x
        #[arg(long)]
        jitter: bool,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Build an effect and report its pipeline
    Validate {
        /// Path to effect TOML file
        effect: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Simulate {
            effect,
            seconds,
            fps,
            seed,
            jitter,
            format,
        } => simulate::run(simulate::SimulateArgs {
            effect,
            seconds,
            fps,
            seed,
            jitter,
            format,
        }),
        Commands::Validate { effect, format } => validate::run(&effect, &format),
    }
}
