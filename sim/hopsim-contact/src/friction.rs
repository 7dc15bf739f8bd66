//! Friction state and the closed-form force laws.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Horizontal friction regime of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FrictionMode {
    /// Coulomb friction opposing the direction of motion.
    #[default]
    Sliding,
    /// Held by a spring toward the position where sticking engaged.
    Sticking {
        /// Horizontal position recorded when sticking engaged.
        anchor_x: f64,
    },
}

impl FrictionMode {
    /// Check for sliding.
    #[must_use]
    pub fn is_sliding(&self) -> bool {
        matches!(self, Self::Sliding)
    }

    /// Stick anchor, if sticking.
    #[must_use]
    pub fn anchor(&self) -> Option<f64> {
        match self {
            Self::Sliding => None,
            Self::Sticking { anchor_x } => Some(*anchor_x),
        }
    }
}

/// Vertical ground reaction for penetration `depth` at vertical velocity `vz`.
///
/// ```text
/// vz < max_vz:  Fz = kz depth (1 - vz / max_vz)
/// otherwise:    Fz = 0
/// ```
///
/// A site already rising faster than `max_vz` gets no push. The force jumps
/// to zero at the threshold.
#[must_use]
pub fn normal_force(stiffness: f64, depth: f64, vz: f64, max_vz: f64) -> f64 {
    if vz < max_vz {
        stiffness * depth * (1.0 - vz / max_vz)
    } else {
        0.0
    }
}

/// Coulomb friction opposing horizontal velocity `vx`.
///
/// Zero velocity pushes toward +x.
#[must_use]
pub fn sliding_force(mu: f64, normal: f64, vx: f64) -> f64 {
    if vx > 0.0 {
        -mu * normal
    } else {
        mu * normal
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normal_force_relief() {
        // Moving down into the ground: stiffer than static.
        assert_relative_eq!(normal_force(1000.0, 0.01, -0.1, 0.1), 20.0, epsilon = 1e-12);
        assert_relative_eq!(normal_force(1000.0, 0.01, 0.0, 0.1), 10.0, epsilon = 1e-12);
        assert_eq!(normal_force(1000.0, 0.01, 0.1, 0.1), 0.0);
        assert_eq!(normal_force(1000.0, 5.0, 3.0, 0.1), 0.0);
    }

    #[test]
    fn test_sliding_opposes_motion() {
        assert_eq!(sliding_force(0.5, 100.0, 1.0), -50.0);
        assert_eq!(sliding_force(0.5, 100.0, -1.0), 50.0);
        assert_eq!(sliding_force(0.5, 100.0, 0.0), 50.0);
    }

    #[test]
    fn test_mode_accessors() {
        assert!(FrictionMode::default().is_sliding());
        let mode = FrictionMode::Sticking { anchor_x: 0.3 };
        assert!(!mode.is_sliding());
        assert_eq!(mode.anchor(), Some(0.3));
    }
}
