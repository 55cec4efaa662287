//! Gazeflow CLI — offline tooling around the filter pipeline.
//!
//! Usage:
//!   gazeflow synth [OPTIONS]     Generate a synthetic tracker trace
//!   gazeflow replay <PATH>       Run the pipeline over a recorded trace

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "gazeflow",
    about = "Head-pointer signal stabilization toolkit",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a deterministic synthetic tracker trace
    Synth {
        /// Output trace path
        #[arg(short, long, default_value = "trace.jsonl")]
        output: PathBuf,

        /// Number of frames to generate
        #[arg(long, default_value = "300")]
        frames: usize,

        /// Tracker frame rate (Hz)
        #[arg(long, default_value = "30")]
        fps: u32,

        /// Gaussian noise sigma added to the pose (normalized units)
        #[arg(long, default_value = "0.05")]
        noise: f64,

        /// Seed for the noise generator
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Run the filter pipeline over a recorded trace
    Replay {
        /// Path to the trace file (JSONL)
        path: PathBuf,

        /// Pipeline parameters as a JSON file; defaults when omitted
        #[arg(long)]
        params: Option<PathBuf>,

        /// EAR threshold separating open from closed
        #[arg(long, default_value = "0.2")]
        ear_threshold: f64,

        /// Write the smoothed trace to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    gazeflow_common::logging::init_logging(&gazeflow_common::logging::LoggingConfig {
        level: log_level.to_string(),
        json: false,
    });

    match cli.command {
        Commands::Synth {
            output,
            frames,
            fps,
            noise,
            seed,
        } => commands::synth::run(output, frames, fps, noise, seed),
        Commands::Replay {
            path,
            params,
            ear_threshold,
            output,
        } => commands::replay::run(path, params, ear_threshold, output),
    }
}
