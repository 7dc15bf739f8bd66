//! Fixed-step integration of planar rigid body state.
//!
//! Bodies advance with semi-implicit (symplectic) Euler: velocity first, then
//! position from the *new* velocity. There is no sub-stepping and no energy
//! correction; stability against the stiff joint and contact penalties comes
//! from choosing a small enough step.
//!
//! # Example
//!
//! ```
//! use hopsim_core::integrators::{Integrator, SemiImplicitEuler};
//! use hopsim_types::{Pose, Twist};
//! use nalgebra::Vector2;
//!
//! let mut pose = Pose::new(0.0, 10.0, 0.0);
//! let mut twist = Twist::zero();
//!
//! SemiImplicitEuler::integrate(&mut pose, &mut twist, Vector2::new(0.0, -9.8067), 0.0, 0.01);
//!
//! assert!(pose.z() < 10.0);
//! assert!(twist.linear.y < 0.0);
//! ```

use hopsim_types::{Pose, Twist};
use nalgebra::Vector2;

/// Trait for integration methods.
pub trait Integrator {
    /// Integrate the body state forward by `dt`.
    ///
    /// # Arguments
    ///
    /// * `pose` - Position and pitch (modified in place)
    /// * `twist` - Linear and angular velocity (modified in place)
    /// * `linear_accel` - Linear acceleration `(ax, az)` (m/s²)
    /// * `angular_accel` - Pitch acceleration (rad/s²)
    /// * `dt` - Timestep in seconds
    fn integrate(
        pose: &mut Pose,
        twist: &mut Twist,
        linear_accel: Vector2<f64>,
        angular_accel: f64,
        dt: f64,
    );
}

/// Semi-implicit Euler integration (symplectic Euler).
///
/// ```text
/// v' = v + a dt
/// x' = x + v' dt
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SemiImplicitEuler;

impl Integrator for SemiImplicitEuler {
    fn integrate(
        pose: &mut Pose,
        twist: &mut Twist,
        linear_accel: Vector2<f64>,
        angular_accel: f64,
        dt: f64,
    ) {
        twist.linear += linear_accel * dt;
        twist.angular += angular_accel * dt;

        pose.position += twist.linear * dt;
        pose.angle += twist.angular * dt;
    }
}
