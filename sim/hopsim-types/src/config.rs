//! Configuration types for simulation.
//!
//! This module provides configuration that controls how the simulation runs:
//! fixed timestep, gravity, and when to stop.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Standard gravitational acceleration (m/s²).
pub const STANDARD_GRAVITY: f64 = 9.8067;

/// Main configuration for a simulation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// Fixed timestep for explicit integration (seconds).
    pub timestep: f64,
    /// Gravitational acceleration magnitude, acting along −z (m/s²).
    pub gravity: f64,
    /// Simulation end time (None for unlimited).
    pub end_time: Option<f64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            // 10 kHz keeps the stiff joint penalty springs stable.
            timestep: 1e-4,
            gravity: STANDARD_GRAVITY,
            end_time: None,
        }
    }
}

impl SimulationConfig {
    /// Create a config with the given timestep.
    #[must_use]
    pub fn with_timestep(timestep: f64) -> Self {
        Self {
            timestep,
            ..Default::default()
        }
    }

    /// Configuration used for the hopping study: 10 kHz for five seconds.
    #[must_use]
    pub fn hopping() -> Self {
        Self {
            end_time: Some(5.0),
            ..Default::default()
        }
    }

    /// Set gravity magnitude.
    #[must_use]
    pub fn gravity(mut self, gravity: f64) -> Self {
        self.gravity = gravity;
        self
    }

    /// Disable gravity.
    #[must_use]
    pub fn zero_gravity(mut self) -> Self {
        self.gravity = 0.0;
        self
    }

    /// Set the end time.
    #[must_use]
    pub fn end_time(mut self, end_time: f64) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.timestep.is_finite() || self.timestep <= 0.0 {
            return Err(crate::SimError::InvalidTimestep(self.timestep));
        }

        if self.timestep > 0.1 {
            return Err(crate::SimError::invalid_config(
                "timestep > 0.1 s cannot resolve penalty contacts",
            ));
        }

        if !self.gravity.is_finite() {
            return Err(crate::SimError::invalid_config("gravity must be finite"));
        }

        if let Some(end) = self.end_time {
            if !end.is_finite() || end < 0.0 {
                return Err(crate::SimError::invalid_config(format!(
                    "end time must be finite and non-negative, got {end}"
                )));
            }
        }

        Ok(())
    }

    /// Step frequency in Hz.
    #[must_use]
    pub fn frequency(&self) -> f64 {
        1.0 / self.timestep
    }
}
