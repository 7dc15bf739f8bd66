//! The simulation run behind the `hopsim` binary.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use colored::Colorize;
use hopsim_core::presets::{human_hopper, names, HopperParams};
use hopsim_core::{
    ContactReading, ContactTracker, JointReading, RigidBody, RigidBodySystem, SimulationConfig,
    StepInput, Stepper, StepperConfig,
};
use serde::Serialize;
use tracing::info;

/// Run options, already parsed.
#[derive(Debug, Clone)]
pub struct Options {
    pub t_stop: f64,
    pub dt: f64,
    pub ground_height: f64,
    pub height: f64,
    pub log_every: f64,
    pub trace: Option<PathBuf>,
    pub check_divergence: bool,
}

/// What the run produced.
#[derive(Debug, Clone, Copy)]
pub struct Summary {
    pub steps: u64,
    pub touchdowns: usize,
    pub peak_normal_force: f64,
    pub stance_time: f64,
    pub trunk_height: f64,
}

#[derive(Serialize)]
struct Named<'a, T> {
    name: &'a str,
    #[serde(flatten)]
    reading: T,
}

/// One line of the `--trace` file.
#[derive(Serialize)]
struct TraceRecord<'a> {
    time: f64,
    joints: Vec<Named<'a, JointReading>>,
    contacts: Vec<Named<'a, ContactReading>>,
}

impl<'a> TraceRecord<'a> {
    fn capture(system: &'a RigidBodySystem, time: f64) -> Self {
        Self {
            time,
            joints: system
                .joints()
                .iter()
                .map(|j| Named {
                    name: j.name(),
                    reading: j.reading(),
                })
                .collect(),
            contacts: system
                .contacts()
                .iter()
                .map(|c| Named {
                    name: c.name(),
                    reading: c.reading(),
                })
                .collect(),
        }
    }
}

/// Simulate and print a summary.
pub fn run(opts: &Options) -> Result<()> {
    let summary = simulate(opts)?;

    println!();
    println!("{}", "Hopping run complete".bold());
    println!("  steps:             {}", summary.steps);
    println!("  touch-downs:       {}", summary.touchdowns);
    println!("  peak normal force: {:.1} N", summary.peak_normal_force);
    println!("  time in stance:    {:.3} s", summary.stance_time);
    println!("  trunk height:      {:.3} m", summary.trunk_height);
    if let Some(path) = &opts.trace {
        println!("  trace:             {}", path.display().to_string().dimmed());
    }
    Ok(())
}

/// Drop the hopper and step until `t_stop`.
pub fn simulate(opts: &Options) -> Result<Summary> {
    ensure!(opts.t_stop > 0.0, "--t-stop must be positive, got {}", opts.t_stop);
    ensure!(
        opts.log_every > 0.0,
        "--log-every must be positive, got {}",
        opts.log_every
    );

    let sim = SimulationConfig::with_timestep(opts.dt).end_time(opts.t_stop);
    let mut stepper = Stepper::with_config(
        sim,
        StepperConfig::default().with_divergence_check(opts.check_divergence),
    )
    .context("invalid simulation settings")?;

    let params = HopperParams::default().with_height(opts.height);
    let (mut system, handles) = human_hopper(&params).context("failed to build hopper")?;
    let ball = system
        .contact_by_name(names::BALL_CONTACT)
        .context("hopper has no ball contact")?;

    let mut writer = opts
        .trace
        .as_ref()
        .map(|path| {
            File::create(path)
                .map(BufWriter::new)
                .with_context(|| format!("failed to create {}", path.display()))
        })
        .transpose()?;

    let input = StepInput::passive(&system).with_ground_height(opts.ground_height);
    let stride = log_stride(opts.log_every, opts.dt);
    let mut tracker = ContactTracker::new(ball);

    info!(
        t_stop = opts.t_stop,
        dt = opts.dt,
        ground_height = opts.ground_height,
        "dropping hopper"
    );
    log_angles(&system, 0.0);

    while !stepper.is_complete() {
        let report = stepper.step(&mut system, &input)?;
        tracker.record(&system, report.time)?;

        if let Some(w) = writer.as_mut() {
            serde_json::to_writer(&mut *w, &TraceRecord::capture(&system, report.time))?;
            writeln!(w)?;
        }
        if report.step % stride == 0 {
            log_angles(&system, report.time);
        }
    }

    if let Some(mut w) = writer {
        w.flush()?;
    }

    let trunk_height = system
        .body(handles.trunk)
        .map_or(f64::NAN, |b| b.pose().z());

    #[allow(clippy::cast_precision_loss)]
    let stance_time = tracker.stance().count() as f64 * opts.dt;

    info!(steps = stepper.step_count(), time = stepper.time(), "done");

    Ok(Summary {
        steps: stepper.step_count(),
        touchdowns: tracker.touchdowns(),
        peak_normal_force: tracker.peak_normal_force(),
        stance_time,
        trunk_height,
    })
}

/// Steps between log lines; at least one.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn log_stride(log_every: f64, dt: f64) -> u64 {
    ((log_every / dt).round() as u64).max(1)
}

fn log_angles(system: &RigidBodySystem, time: f64) {
    let degrees = |name: &str| {
        system
            .joint_by_name(name)
            .ok()
            .and_then(|id| system.joint(id))
            .map_or(f64::NAN, |j| j.angle().to_degrees())
    };
    info!(
        time,
        hip = degrees(names::HIP),
        knee = degrees(names::KNEE),
        ankle = degrees(names::ANKLE),
        "joint angles (deg)"
    );
}
