//! Penalty gains for pin constraints.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Spring-damper gains that hold two joint sites together.
///
/// The joint never satisfies the pin exactly; a stiff spring pulls the sites
/// together and a damper acting on the backward difference of the violation
/// bleeds off the oscillation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointParams {
    /// Spring gain on the site separation (N/m).
    pub stiffness: f64,
    /// Damping gain on the rate of separation (N·s/m).
    pub damping: f64,
}

impl Default for JointParams {
    fn default() -> Self {
        Self::critically_damped(5000.0, 20.0)
    }
}

impl JointParams {
    /// Create joint gains.
    #[must_use]
    pub const fn new(stiffness: f64, damping: f64) -> Self {
        Self { stiffness, damping }
    }

    /// Gains for a critically damped pin on a segment of `reference_mass`.
    ///
    /// ```text
    /// k = b² / (4 m)
    /// ```
    #[must_use]
    pub fn critically_damped(damping: f64, reference_mass: f64) -> Self {
        Self {
            stiffness: damping * damping / (4.0 * reference_mass),
            damping,
        }
    }

    /// Set the spring gain.
    #[must_use]
    pub fn with_stiffness(mut self, stiffness: f64) -> Self {
        self.stiffness = stiffness;
        self
    }

    /// Set the damping gain.
    #[must_use]
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Validate the gains.
    pub fn validate(&self) -> hopsim_types::Result<()> {
        if !self.stiffness.is_finite() || self.stiffness < 0.0 {
            return Err(hopsim_types::SimError::invalid_config(format!(
                "joint stiffness must be non-negative and finite, got {}",
                self.stiffness
            )));
        }
        if !self.damping.is_finite() || self.damping < 0.0 {
            return Err(hopsim_types::SimError::invalid_config(format!(
                "joint damping must be non-negative and finite, got {}",
                self.damping
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_gains() {
        let params = JointParams::default();
        assert_relative_eq!(params.damping, 5000.0);
        assert_relative_eq!(params.stiffness, 312_500.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_invalid_gains() {
        assert!(JointParams::new(-1.0, 0.0).validate().is_err());
        assert!(JointParams::new(1.0, f64::NAN).validate().is_err());
        assert!(JointParams::default()
            .with_stiffness(0.0)
            .with_damping(0.0)
            .validate()
            .is_ok());
    }
}
