//! Attachment sites and the loads applied at them.
//!
//! A [`Site`] is a point fixed in its owning body's local frame. Joints and
//! ground contacts act on bodies only through sites: they read the site's
//! world position and hand back a [`SiteLoad`], which the owning body sums
//! into its net force and torque when it integrates.

use std::ops::{Add, AddAssign, Neg};

use nalgebra::{Point2, UnitComplex, Vector2};

use crate::body::BodyRef;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Index of a site within its owning body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SiteId(pub usize);

impl SiteId {
    /// Create a new site ID.
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    /// Get the raw index.
    #[must_use]
    pub const fn raw(self) -> usize {
        self.0
    }
}

/// Non-owning handle to a site: owning body plus site index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SiteRef {
    /// Owning body.
    pub body: BodyRef,
    /// Site index within the owning body.
    pub site: SiteId,
}

impl SiteRef {
    /// Create a site handle.
    #[must_use]
    pub const fn new(body: BodyRef, site: SiteId) -> Self {
        Self { body, site }
    }
}

impl std::fmt::Display for SiteRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.site[{}]", self.body, self.site.0)
    }
}

/// Force and torque applied at a site during one step.
///
/// Loads combine by addition and negate for the reaction on the opposite
/// site of a joint.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SiteLoad {
    /// Force `(fx, fz)` in the world frame (N).
    pub force: Vector2<f64>,
    /// Pure torque (N·m), counter-clockwise positive.
    pub torque: f64,
}

impl SiteLoad {
    /// No load.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            force: Vector2::zeros(),
            torque: 0.0,
        }
    }

    /// Create a load from force components and torque.
    #[must_use]
    pub fn new(fx: f64, fz: f64, torque: f64) -> Self {
        Self {
            force: Vector2::new(fx, fz),
            torque,
        }
    }

    /// Force only.
    #[must_use]
    pub fn from_force(force: Vector2<f64>) -> Self {
        Self { force, torque: 0.0 }
    }

    /// Horizontal force component.
    #[must_use]
    pub fn fx(&self) -> f64 {
        self.force.x
    }

    /// Vertical force component.
    #[must_use]
    pub fn fz(&self) -> f64 {
        self.force.y
    }

    /// Torque this load exerts about the center of mass of a body whose
    /// site sits at world-frame `offset` from that center.
    ///
    /// ```text
    /// tau + x_w * fz - z_w * fx
    /// ```
    #[must_use]
    pub fn moment_about_com(&self, offset: &Vector2<f64>) -> f64 {
        self.torque + offset.perp(&self.force)
    }

    /// Check if the load contains `NaN` or `Inf` values.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.force.iter().all(|c| c.is_finite()) && self.torque.is_finite()
    }
}

impl Add for SiteLoad {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            force: self.force + rhs.force,
            torque: self.torque + rhs.torque,
        }
    }
}

impl AddAssign for SiteLoad {
    fn add_assign(&mut self, rhs: Self) {
        self.force += rhs.force;
        self.torque += rhs.torque;
    }
}

impl Neg for SiteLoad {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            force: -self.force,
            torque: -self.torque,
        }
    }
}

/// A force/torque attachment point fixed in a body's local frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Site {
    name: String,
    /// Offset from the body's center of mass, body frame.
    local: Vector2<f64>,
    /// The same offset rotated into the world frame. Valid after the owning
    /// body last published its orientation.
    world_offset: Vector2<f64>,
    /// Load accumulated for the current step.
    load: SiteLoad,
}

impl Site {
    /// Create a site at body-frame offset `(x_b, z_b)`.
    ///
    /// The world offset starts equal to the local offset (identity rotation)
    /// until the owner publishes its orientation.
    #[must_use]
    pub fn new(name: impl Into<String>, x_b: f64, z_b: f64) -> Self {
        let local = Vector2::new(x_b, z_b);
        Self {
            name: name.into(),
            local,
            world_offset: local,
            load: SiteLoad::zero(),
        }
    }

    /// Site name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Body-frame offset.
    #[must_use]
    pub fn local_offset(&self) -> Vector2<f64> {
        self.local
    }

    /// World-frame offset from the owning body's center of mass.
    #[must_use]
    pub fn world_offset(&self) -> Vector2<f64> {
        self.world_offset
    }

    /// Load accumulated this step.
    #[must_use]
    pub fn load(&self) -> SiteLoad {
        self.load
    }

    /// Recompute the world-frame offset for the owner's current rotation.
    pub fn update_world_offset(&mut self, rotation: &UnitComplex<f64>) {
        self.world_offset = rotation.transform_vector(&self.local);
    }

    /// Add a load contribution for this step.
    pub fn add_load(&mut self, load: SiteLoad) {
        self.load += load;
    }

    /// Reset the accumulated load to zero.
    pub fn clear_load(&mut self) {
        self.load = SiteLoad::zero();
    }
}

/// Snapshot of where a site is, taken before forces are computed.
///
/// Joints and contacts only ever see these snapshots, never the bodies
/// themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SiteKinematics {
    /// Absolute world position of the site.
    pub position: Point2<f64>,
    /// World-frame offset from the owning body's center of mass.
    pub offset: Vector2<f64>,
    /// Pitch angle of the owning body.
    pub body_angle: f64,
}

impl SiteKinematics {
    /// Create a snapshot from the owner's center and angle and the site's
    /// world offset.
    #[must_use]
    pub fn new(body_position: Point2<f64>, body_angle: f64, offset: Vector2<f64>) -> Self {
        Self {
            position: body_position + offset,
            offset,
            body_angle,
        }
    }
}
