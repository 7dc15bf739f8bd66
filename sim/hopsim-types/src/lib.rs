//! Core types for planar hopping simulation.
//!
//! This crate provides the data shared by every other crate in the workspace:
//!
//! - [`Pose`], [`Twist`], [`MassProperties`] - planar rigid body state
//! - [`Site`], [`SiteLoad`], [`SiteKinematics`] - attachment points and the
//!   forces applied at them
//! - [`BodyId`], [`BodyRef`], [`SiteId`], [`SiteRef`], [`JointId`], [`ContactId`] -
//!   index handles into a rigid body system
//! - [`SimulationConfig`] - timestep, gravity, end time
//! - [`SimError`] - errors
//!
//! # Coordinate System
//!
//! - x: horizontal, forward
//! - z: vertical, up (gravity acts along −z)
//! - p: pitch, counter-clockwise positive
//!
//! nalgebra 2-vectors carry `z` in their second (`y`) component.
//!
//! # Example
//!
//! ```
//! use hopsim_types::{Pose, Site};
//!
//! let pose = Pose::new(0.0, 1.0, std::f64::consts::FRAC_PI_2);
//! let mut site = Site::new("tip", 0.5, 0.0);
//! site.update_world_offset(&pose.rotation());
//!
//! // Rotating a quarter turn moves the tip from +x to +z.
//! assert!(site.world_offset().x.abs() < 1e-12);
//! assert!((site.world_offset().y - 0.5).abs() < 1e-12);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::missing_errors_doc,        // Error docs added where non-obvious
)]

mod body;
mod config;
mod error;
mod site;

pub use body::{BodyId, BodyRef, MassProperties, Pose, Twist};
pub use config::{SimulationConfig, STANDARD_GRAVITY};
pub use error::SimError;
pub use site::{Site, SiteId, SiteKinematics, SiteLoad, SiteRef};

// Re-export math types for convenience
pub use nalgebra::{Point2, UnitComplex, Vector2};

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;

/// Index of a revolute joint inside a rigid body system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointId(pub usize);

impl JointId {
    /// Get the raw index.
    #[must_use]
    pub const fn raw(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for JointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Joint({})", self.0)
    }
}

/// Index of a ground contact inside a rigid body system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContactId(pub usize);

impl ContactId {
    /// Get the raw index.
    #[must_use]
    pub const fn raw(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ContactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Contact({})", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_display() {
        assert_eq!(JointId(2).to_string(), "Joint(2)");
        assert_eq!(ContactId(0).to_string(), "Contact(0)");
        assert_eq!(BodyId::new(4).raw(), 4);
    }

    #[test]
    fn test_site_follows_pose() {
        let pose = Pose::new(1.0, 2.0, std::f64::consts::PI);
        let mut site = Site::new("s", 0.0, 0.3);
        site.update_world_offset(&pose.rotation());
        let kin = SiteKinematics::new(pose.position, pose.angle, site.world_offset());

        assert!((kin.position.x - 1.0).abs() < 1e-12);
        assert!((kin.position.y - 1.7).abs() < 1e-12);
    }
}
