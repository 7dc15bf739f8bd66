//! Joint angle limits and soft-stop torque.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Angular bounds of a revolute joint with velocity-aware soft enforcement.
///
/// Outside `[lower, upper]` a restoring torque ramps in proportional to the
/// overshoot. The torque is scaled by how fast the joint is still moving
/// into the limit and vanishes once it is already returning faster than
/// `max_rate`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointLimits {
    /// Minimum joint angle (rad).
    pub lower: f64,
    /// Maximum joint angle (rad).
    pub upper: f64,
    /// Angular rate used to blend the restoring torque (rad/s).
    pub max_rate: f64,
    /// Restoring gain (N·m/rad).
    pub stiffness: f64,
}

impl Default for JointLimits {
    fn default() -> Self {
        Self::unlimited()
    }
}

impl JointLimits {
    /// Limit gain used by the human hopping model (N·m/rad).
    pub const DEFAULT_STIFFNESS: f64 = 180.0 / std::f64::consts::PI;

    /// Blend rate used by the human hopping model, 5 deg/s.
    pub const DEFAULT_MAX_RATE: f64 = 5.0 * std::f64::consts::PI / 180.0;

    /// Create limits on `[lower, upper]` radians with default gain and rate.
    ///
    /// Swapped bounds are reordered.
    #[must_use]
    pub fn new(lower: f64, upper: f64) -> Self {
        let (lower, upper) = if lower <= upper {
            (lower, upper)
        } else {
            (upper, lower)
        };
        Self {
            lower,
            upper,
            max_rate: Self::DEFAULT_MAX_RATE,
            stiffness: Self::DEFAULT_STIFFNESS,
        }
    }

    /// Create limits from bounds in degrees.
    #[must_use]
    pub fn from_degrees(lower: f64, upper: f64) -> Self {
        Self::new(lower.to_radians(), upper.to_radians())
    }

    /// No angular bounds.
    #[must_use]
    pub fn unlimited() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    /// Set the blend rate.
    #[must_use]
    pub fn with_max_rate(mut self, max_rate: f64) -> Self {
        self.max_rate = max_rate;
        self
    }

    /// Set the restoring gain.
    #[must_use]
    pub fn with_stiffness(mut self, stiffness: f64) -> Self {
        self.stiffness = stiffness;
        self
    }

    /// Check if an angle is within limits.
    #[must_use]
    pub fn contains(&self, angle: f64) -> bool {
        angle >= self.lower && angle <= self.upper
    }

    /// Check if limits are effectively unlimited.
    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        self.lower == f64::NEG_INFINITY && self.upper == f64::INFINITY
    }

    /// Where an angle sits relative to the bounds.
    #[must_use]
    pub fn state(&self, angle: f64) -> LimitState {
        if angle < self.lower {
            LimitState::BelowLower(self.lower - angle)
        } else if angle > self.upper {
            LimitState::AboveUpper(angle - self.upper)
        } else {
            LimitState::Free
        }
    }

    /// Restoring torque to add to the mate side of the joint.
    ///
    /// ```text
    /// q < lower, q_dot <= max_rate:   k (lower - q) (1 - q_dot / max_rate)
    /// q > upper, q_dot >= -max_rate:  k (upper - q) (1 + q_dot / max_rate)
    /// ```
    ///
    /// Zero inside the bounds and while the joint is already recovering
    /// faster than `max_rate`. The base side receives the negation.
    #[must_use]
    pub fn restoring_torque(&self, angle: f64, rate: f64) -> f64 {
        match self.state(angle) {
            LimitState::Free => 0.0,
            LimitState::BelowLower(overshoot) => {
                if rate > self.max_rate {
                    0.0
                } else {
                    self.stiffness * overshoot * (1.0 - rate / self.max_rate)
                }
            }
            LimitState::AboveUpper(overshoot) => {
                if rate < -self.max_rate {
                    0.0
                } else {
                    -self.stiffness * overshoot * (1.0 + rate / self.max_rate)
                }
            }
        }
    }

    /// Validate the limits.
    ///
    /// The blend rate divides the angular rate every step, so it must be
    /// strictly positive.
    pub fn validate(&self) -> hopsim_types::Result<()> {
        if self.lower.is_nan() || self.upper.is_nan() || self.lower > self.upper {
            return Err(hopsim_types::SimError::invalid_config(format!(
                "joint limits must satisfy lower <= upper, got [{}, {}]",
                self.lower, self.upper
            )));
        }
        if !self.max_rate.is_finite() || self.max_rate <= 0.0 {
            return Err(hopsim_types::SimError::invalid_config(format!(
                "limit blend rate must be positive and finite, got {}",
                self.max_rate
            )));
        }
        if !self.stiffness.is_finite() || self.stiffness < 0.0 {
            return Err(hopsim_types::SimError::invalid_config(format!(
                "limit stiffness must be non-negative and finite, got {}",
                self.stiffness
            )));
        }
        Ok(())
    }
}

/// Position of a joint angle relative to its limits.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LimitState {
    /// Within bounds.
    Free,
    /// Below the lower bound by the contained overshoot (positive).
    BelowLower(f64),
    /// Above the upper bound by the contained overshoot (positive).
    AboveUpper(f64),
}

impl LimitState {
    /// Check if the joint is past either bound.
    #[must_use]
    pub fn is_at_limit(&self) -> bool {
        !matches!(self, Self::Free)
    }

    /// Overshoot past the violated bound (0 if free).
    #[must_use]
    pub fn overshoot(&self) -> f64 {
        match self {
            Self::Free => 0.0,
            Self::BelowLower(d) | Self::AboveUpper(d) => *d,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_limits_creation() {
        let limits = JointLimits::new(1.0, -1.0);
        assert_relative_eq!(limits.lower, -1.0);
        assert_relative_eq!(limits.upper, 1.0);
        assert!(limits.contains(0.0));
        assert!(!limits.contains(1.5));

        let deg = JointLimits::from_degrees(-30.0, 100.0);
        assert_relative_eq!(deg.upper, 100.0_f64.to_radians());
        assert!(JointLimits::unlimited().is_unlimited());
    }

    #[test]
    fn test_free_has_no_torque() {
        let limits = JointLimits::new(-1.0, 1.0);
        assert_eq!(limits.restoring_torque(0.5, -10.0), 0.0);
        assert_eq!(limits.state(0.5), LimitState::Free);
        assert_eq!(JointLimits::unlimited().restoring_torque(1e6, 1e6), 0.0);
    }

    #[test]
    fn test_below_lower_pushes_up() {
        let limits = JointLimits::new(0.0, 1.0).with_stiffness(100.0).with_max_rate(1.0);

        // Still moving into the limit: torque exceeds the pure spring term.
        let t = limits.restoring_torque(-0.1, -0.5);
        assert_relative_eq!(t, 100.0 * 0.1 * 1.5, epsilon = 1e-12);
        assert!(t > 0.0);

        // Recovering slowly: reduced but still positive.
        let t = limits.restoring_torque(-0.1, 0.5);
        assert_relative_eq!(t, 100.0 * 0.1 * 0.5, epsilon = 1e-12);

        // Recovering fast: nothing added.
        assert_eq!(limits.restoring_torque(-0.1, 2.0), 0.0);
    }

    #[test]
    fn test_above_upper_pushes_down() {
        let limits = JointLimits::new(0.0, 1.0).with_stiffness(100.0).with_max_rate(1.0);

        let t = limits.restoring_torque(1.2, 0.0);
        assert_relative_eq!(t, -20.0, epsilon = 1e-12);
        assert!(limits.restoring_torque(1.2, 0.5) < t);
        assert_eq!(limits.restoring_torque(1.2, -2.0), 0.0);
    }

    #[test]
    fn test_state_overshoot() {
        let limits = JointLimits::new(-1.0, 1.0);
        assert_relative_eq!(limits.state(-1.5).overshoot(), 0.5);
        assert!(limits.state(1.5).is_at_limit());
        assert!(!limits.state(0.0).is_at_limit());
    }

    #[test]
    fn test_validate() {
        assert!(JointLimits::default().validate().is_ok());
        assert!(JointLimits::new(0.0, 1.0).with_max_rate(0.0).validate().is_err());
        assert!(JointLimits::new(0.0, 1.0).with_stiffness(-1.0).validate().is_err());
        assert!(JointLimits::new(f64::NAN, 1.0).validate().is_err());
    }
}
