//! Simulation stepping and control flow.
//!
//! This module provides the [`Stepper`], which owns the clock and drives a
//! [`RigidBodySystem`] through fixed steps:
//!
//! 1. Zero every site load
//! 2. Update contacts (ground reactions)
//! 3. Update joints (pin forces, drive and limit torques)
//! 4. Integrate bodies (which republishes site coordinates)
//! 5. Advance time
//!
//! Contacts and joints read site positions published at the end of the
//! *previous* step. The order is fixed; reordering changes the numerics.
//!
//! # Example
//!
//! ```
//! use hopsim_core::{RigidBodySystem, StepInput, Stepper};
//! use hopsim_types::{MassProperties, Pose, SimulationConfig, Twist};
//!
//! let mut system = RigidBodySystem::new("drop");
//! let id = system
//!     .add_body("ball", MassProperties::new(1.0, 1.0), Pose::new(0.0, 1.0, 0.0), Twist::zero())
//!     .unwrap();
//!
//! let mut stepper = Stepper::new(SimulationConfig::default()).unwrap();
//! let input = StepInput::passive(&system);
//! for _ in 0..100 {
//!     stepper.step(&mut system, &input).unwrap();
//! }
//!
//! assert!(system.body(id).unwrap().twist().linear.y < 0.0);
//! assert_eq!(stepper.step_count(), 100);
//! ```

use hopsim_types::SimulationConfig;
use tracing::info;

use crate::world::{check_len, RigidBodySystem};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-step inputs supplied by the driver.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepInput {
    /// Drive torque for each joint, in joint order (N·m).
    pub drive_torques: Vec<f64>,
    /// Ground height under each contact, in contact order (m).
    pub ground_heights: Vec<f64>,
}

impl StepInput {
    /// Zero drive torques and ground at `z = 0` for every joint and contact.
    #[must_use]
    pub fn passive(system: &RigidBodySystem) -> Self {
        Self {
            drive_torques: vec![0.0; system.joint_count()],
            ground_heights: vec![0.0; system.contact_count()],
        }
    }

    /// Set the same ground height under every contact.
    #[must_use]
    pub fn with_ground_height(mut self, height: f64) -> Self {
        self.ground_heights.fill(height);
        self
    }

    /// Replace the drive torques.
    #[must_use]
    pub fn with_drive_torques(mut self, torques: Vec<f64>) -> Self {
        self.drive_torques = torques;
        self
    }

    /// Check the input against the system's joint and contact counts.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InputMismatch`] for the first vector of the wrong
    /// length.
    ///
    /// [`SimError::InputMismatch`]: hopsim_types::SimError::InputMismatch
    pub fn check(&self, system: &RigidBodySystem) -> hopsim_types::Result<()> {
        check_len("drive torques", system.joint_count(), self.drive_torques.len())?;
        check_len("ground heights", system.contact_count(), self.ground_heights.len())
    }
}

/// Outcome of a step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepReport {
    /// Simulation time after the step.
    pub time: f64,
    /// Steps taken so far.
    pub step: u64,
    /// Whether the configured end time has been reached.
    pub completed: bool,
}

/// Configuration for the stepper.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepperConfig {
    /// Check every body for non-finite state after each step.
    pub check_divergence: bool,
}

impl StepperConfig {
    /// Enable or disable the per-step divergence check.
    #[must_use]
    pub fn with_divergence_check(mut self, enable: bool) -> Self {
        self.check_divergence = enable;
        self
    }
}

/// Fixed-step driver for a [`RigidBodySystem`].
#[derive(Debug, Clone)]
pub struct Stepper {
    sim: SimulationConfig,
    config: StepperConfig,
    step_count: u64,
}

impl Stepper {
    /// Create a stepper.
    ///
    /// # Errors
    ///
    /// Returns an error if the simulation configuration is invalid.
    pub fn new(sim: SimulationConfig) -> hopsim_types::Result<Self> {
        Self::with_config(sim, StepperConfig::default())
    }

    /// Create a stepper with custom stepper configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the simulation configuration is invalid.
    pub fn with_config(sim: SimulationConfig, config: StepperConfig) -> hopsim_types::Result<Self> {
        sim.validate()?;
        Ok(Self {
            sim,
            config,
            step_count: 0,
        })
    }

    /// Simulation configuration.
    #[must_use]
    pub fn simulation(&self) -> &SimulationConfig {
        &self.sim
    }

    /// Stepper configuration.
    #[must_use]
    pub fn config(&self) -> &StepperConfig {
        &self.config
    }

    /// Get the timestep.
    #[must_use]
    pub fn timestep(&self) -> f64 {
        self.sim.timestep
    }

    /// Get the step count.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Current simulation time.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn time(&self) -> f64 {
        // Derived from the count so long runs don't accumulate drift.
        self.step_count as f64 * self.sim.timestep
    }

    /// Whether the configured end time has been reached.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.sim
            .end_time
            .is_some_and(|end| self.reached(end))
    }

    fn reached(&self, end: f64) -> bool {
        self.time() >= end - 0.5 * self.sim.timestep
    }

    /// Execute one simulation step.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input lengths do not match the joint and contact counts (the
    ///   system is left untouched)
    /// - A joint or contact refers to a missing site
    /// - Divergence checking is enabled and a body state is non-finite
    pub fn step(
        &mut self,
        system: &mut RigidBodySystem,
        input: &StepInput,
    ) -> hopsim_types::Result<StepReport> {
        input.check(system)?;
        let dt = self.sim.timestep;

        system.clear_site_loads();
        system.apply_contacts(dt, &input.ground_heights)?;
        system.apply_joints(dt, &input.drive_torques)?;
        system.integrate_bodies(dt, self.sim.gravity);

        self.step_count += 1;

        if self.config.check_divergence {
            system.validate()?;
        }

        Ok(StepReport {
            time: self.time(),
            step: self.step_count,
            completed: self.is_complete(),
        })
    }

    /// Step until `end_time`, asking `driver` for each step's input.
    ///
    /// The driver sees the system and the time at the start of the step.
    ///
    /// # Errors
    ///
    /// Returns the first step error.
    pub fn run_until<F>(
        &mut self,
        system: &mut RigidBodySystem,
        end_time: f64,
        mut driver: F,
    ) -> hopsim_types::Result<StepReport>
    where
        F: FnMut(&RigidBodySystem, f64) -> StepInput,
    {
        let start = self.time();
        info!(system = system.name(), start, end_time, dt = self.sim.timestep, "run started");

        let mut report = StepReport {
            time: start,
            step: self.step_count,
            completed: self.is_complete(),
        };
        while !self.reached(end_time) {
            let input = driver(system, self.time());
            report = self.step(system, &input)?;
        }

        info!(
            system = system.name(),
            steps = self.step_count,
            time = self.time(),
            kinetic_energy = system.kinetic_energy(),
            "run finished"
        );
        Ok(report)
    }

    /// Reset the clock to zero.
    pub fn reset(&mut self) {
        self.step_count = 0;
    }
}
