//! Human hopping model driver.
//!
//! Drops the four-segment hopper onto flat ground with zero drive torque and
//! reports joint angles and ground contact as it lands.
//!
//! # Usage
//!
//! - `hopsim` - 5 s at 0.1 ms, ground at z = 0
//! - `hopsim --t-stop 2 --log-every 0.05` - shorter run, denser log
//! - `hopsim --trace run.jsonl` - also write every sample as a JSON line
//!
//! Log verbosity follows `RUST_LOG` (default `info`). Contact transitions are
//! logged at `debug`.

mod run;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Planar hopping simulation
#[derive(Parser)]
#[command(name = "hopsim")]
#[command(about = "Simulate the human hopping model", long_about = None)]
#[command(version)]
struct Cli {
    /// Simulated duration (s)
    #[arg(long, default_value_t = 5.0)]
    t_stop: f64,

    /// Timestep (s)
    #[arg(long, default_value_t = 1e-4)]
    dt: f64,

    /// Ground height under the foot (m)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    ground_height: f64,

    /// Initial trunk height (m)
    #[arg(long, default_value_t = 3.4)]
    height: f64,

    /// Interval between joint angle log lines (s)
    #[arg(long, default_value_t = 0.1)]
    log_every: f64,

    /// Write one JSON object per step to this file
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Stop with an error as soon as any body state goes non-finite
    #[arg(long)]
    check_divergence: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    run::run(&run::Options {
        t_stop: cli.t_stop,
        dt: cli.dt,
        ground_height: cli.ground_height,
        height: cli.height,
        log_every: cli.log_every,
        trace: cli.trace,
        check_divergence: cli.check_divergence,
    })
}
