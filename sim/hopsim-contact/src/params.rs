//! Ground interaction parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Spring law used while a contact is sticking.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StictionLaw {
    /// Asymmetric spring whose effective stiffness depends on the approach
    /// direction, relaxed by the horizontal velocity cap.
    ///
    /// ```text
    /// dist >= 0:  F = -k dist (1 + v / max_v)
    /// dist <  0:  F = -k dist (1 - v / max_v)
    /// ```
    #[default]
    Nonlinear,

    /// Plain spring-damper.
    ///
    /// ```text
    /// F = -k dist - b v
    /// ```
    Linear {
        /// Damping gain (N·s/m).
        damping: f64,
    },
}

impl StictionLaw {
    /// Horizontal force for displacement `dist` from the stick anchor at
    /// velocity `v`, given spring gain `k` and relaxation velocity `max_v`.
    #[must_use]
    pub fn force(&self, dist: f64, v: f64, k: f64, max_v: f64) -> f64 {
        match *self {
            Self::Nonlinear => {
                if dist >= 0.0 {
                    -k * dist * (1.0 + v / max_v)
                } else {
                    -k * dist * (1.0 - v / max_v)
                }
            }
            Self::Linear { damping } => -k * dist - damping * v,
        }
    }
}

/// Stiffness, relaxation, and friction parameters of a ground contact.
///
/// The defaults are the ball-of-foot values of the human hopping model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactParams {
    /// Horizontal stiction stiffness (N/m).
    pub stiffness_x: f64,
    /// Horizontal relaxation velocity (m/s).
    pub max_vx: f64,
    /// Vertical penetration stiffness (N/m).
    pub stiffness_z: f64,
    /// Vertical relaxation velocity (m/s). No push at or above it.
    pub max_vz: f64,
    /// Sliding (Coulomb) friction coefficient.
    pub mu_slide: f64,
    /// Speed below which sliding turns into sticking (m/s).
    pub v_transition: f64,
    /// Static friction coefficient; sticking breaks above `mu_stick * Fz`.
    pub mu_stick: f64,
    /// Spring law while sticking.
    pub stiction: StictionLaw,
}

impl Default for ContactParams {
    fn default() -> Self {
        Self::foot()
    }
}

impl ContactParams {
    /// Ball-of-foot on rigid ground.
    #[must_use]
    pub fn foot() -> Self {
        Self {
            stiffness_x: 4000.0,
            max_vx: 0.1,
            stiffness_z: 80_000.0,
            max_vz: 0.1,
            mu_slide: 0.6,
            v_transition: 0.01,
            mu_stick: 0.8,
            stiction: StictionLaw::Nonlinear,
        }
    }

    /// Frictionless ground: only the vertical penalty acts.
    #[must_use]
    pub fn frictionless() -> Self {
        Self {
            mu_slide: 0.0,
            mu_stick: 0.0,
            v_transition: 0.0,
            ..Self::foot()
        }
    }

    /// Set the vertical stiffness and relaxation velocity.
    #[must_use]
    pub fn with_vertical(mut self, stiffness: f64, max_velocity: f64) -> Self {
        self.stiffness_z = stiffness;
        self.max_vz = max_velocity;
        self
    }

    /// Set the horizontal stiffness and relaxation velocity.
    #[must_use]
    pub fn with_horizontal(mut self, stiffness: f64, max_velocity: f64) -> Self {
        self.stiffness_x = stiffness;
        self.max_vx = max_velocity;
        self
    }

    /// Set the friction coefficients and the sliding-to-sticking speed.
    #[must_use]
    pub fn with_friction(mut self, mu_slide: f64, mu_stick: f64, v_transition: f64) -> Self {
        self.mu_slide = mu_slide;
        self.mu_stick = mu_stick;
        self.v_transition = v_transition;
        self
    }

    /// Set the stiction law.
    #[must_use]
    pub fn with_stiction(mut self, stiction: StictionLaw) -> Self {
        self.stiction = stiction;
        self
    }

    /// Validate the parameters.
    ///
    /// Both relaxation velocities divide estimated velocities every step and
    /// must be strictly positive.
    pub fn validate(&self) -> hopsim_types::Result<()> {
        let non_negative = [
            ("horizontal stiffness", self.stiffness_x),
            ("vertical stiffness", self.stiffness_z),
            ("sliding friction", self.mu_slide),
            ("transition velocity", self.v_transition),
            ("static friction", self.mu_stick),
        ];
        for (what, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(hopsim_types::SimError::invalid_config(format!(
                    "contact {what} must be non-negative and finite, got {value}"
                )));
            }
        }

        for (what, value) in [("max_vx", self.max_vx), ("max_vz", self.max_vz)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(hopsim_types::SimError::invalid_config(format!(
                    "contact {what} must be positive and finite, got {value}"
                )));
            }
        }

        if let StictionLaw::Linear { damping } = self.stiction {
            if !damping.is_finite() || damping < 0.0 {
                return Err(hopsim_types::SimError::invalid_config(format!(
                    "stiction damping must be non-negative and finite, got {damping}"
                )));
            }
        }

        Ok(())
    }
}
