//! Planar rigid body state types.
//!
//! A planar body has three degrees of freedom: horizontal position `x`,
//! vertical position `z`, and pitch angle `p` (counter-clockwise positive,
//! measured from the world x axis). nalgebra's `Vector2`/`Point2` store these
//! as `(x, y)`; throughout this workspace the second component is the
//! vertical `z` axis.

use nalgebra::{Point2, UnitComplex, Vector2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Index of a moving body inside a rigid body system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyId(pub usize);

impl BodyId {
    /// Create a new body ID.
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

impl From<usize> for BodyId {
    fn from(id: usize) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Body({})", self.0)
    }
}

/// Non-owning handle to either the system anchor or one of its moving bodies.
///
/// Joints and contacts hold these instead of references, so the system stays
/// the single owner of every body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BodyRef {
    /// The immovable anchor (ground, wall).
    Anchor,
    /// A moving body.
    Body(BodyId),
}

impl BodyRef {
    /// Returns the moving body ID, or `None` for the anchor.
    #[must_use]
    pub fn body_id(self) -> Option<BodyId> {
        match self {
            Self::Anchor => None,
            Self::Body(id) => Some(id),
        }
    }

    /// Check whether this handle refers to the anchor.
    #[must_use]
    pub fn is_anchor(self) -> bool {
        matches!(self, Self::Anchor)
    }
}

impl From<BodyId> for BodyRef {
    fn from(id: BodyId) -> Self {
        Self::Body(id)
    }
}

impl std::fmt::Display for BodyRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anchor => write!(f, "Anchor"),
            Self::Body(id) => write!(f, "{id}"),
        }
    }
}

/// Position and orientation of a planar body.
///
/// # Example
///
/// ```
/// use hopsim_types::Pose;
/// use nalgebra::Point2;
///
/// let pose = Pose::new(1.0, 2.0, std::f64::consts::FRAC_PI_2);
/// let world = pose.transform_point(&Point2::new(1.0, 0.0));
/// assert!((world.x - 1.0).abs() < 1e-12);
/// assert!((world.y - 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose {
    /// Center-of-mass position `(x, z)` in the world frame.
    pub position: Point2<f64>,
    /// Pitch angle `p` in radians.
    pub angle: f64,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    /// Create a pose from `x`, `z`, and pitch angle `p`.
    #[must_use]
    pub fn new(x: f64, z: f64, p: f64) -> Self {
        Self {
            position: Point2::new(x, z),
            angle: p,
        }
    }

    /// Origin, no rotation.
    #[must_use]
    pub fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Create a pose from position only (zero angle).
    #[must_use]
    pub fn from_position(position: Point2<f64>) -> Self {
        Self {
            position,
            angle: 0.0,
        }
    }

    /// Horizontal position.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.position.x
    }

    /// Vertical position.
    #[must_use]
    pub fn z(&self) -> f64 {
        self.position.y
    }

    /// Rotation from the body frame to the world frame.
    #[must_use]
    pub fn rotation(&self) -> UnitComplex<f64> {
        UnitComplex::new(self.angle)
    }

    /// Rotate a body-frame vector into the world frame.
    #[must_use]
    pub fn rotate(&self, local: &Vector2<f64>) -> Vector2<f64> {
        self.rotation().transform_vector(local)
    }

    /// Transform a body-frame point to world coordinates.
    #[must_use]
    pub fn transform_point(&self, local: &Point2<f64>) -> Point2<f64> {
        self.position + self.rotate(&local.coords)
    }

    /// Check if the pose contains `NaN` or `Inf` values.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.coords.iter().all(|c| c.is_finite()) && self.angle.is_finite()
    }
}

/// Linear and angular velocity of a planar body.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Twist {
    /// Linear velocity `(vx, vz)` in m/s.
    pub linear: Vector2<f64>,
    /// Angular velocity `vp` in rad/s.
    pub angular: f64,
}

impl Default for Twist {
    fn default() -> Self {
        Self::zero()
    }
}

impl Twist {
    /// Create a twist from `vx`, `vz`, and `vp`.
    #[must_use]
    pub fn new(vx: f64, vz: f64, vp: f64) -> Self {
        Self {
            linear: Vector2::new(vx, vz),
            angular: vp,
        }
    }

    /// At rest.
    #[must_use]
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Check if the twist contains `NaN` or `Inf` values.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.linear.iter().all(|c| c.is_finite()) && self.angular.is_finite()
    }
}

/// Mass and planar moment of inertia about the center of mass.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MassProperties {
    /// Mass in kg.
    pub mass: f64,
    /// Moment of inertia about the center of mass (kg·m²).
    pub inertia: f64,
}

impl MassProperties {
    /// Create mass properties.
    #[must_use]
    pub const fn new(mass: f64, inertia: f64) -> Self {
        Self { mass, inertia }
    }

    /// Uniform rectangle of the given width (x) and height (z).
    #[must_use]
    pub fn rectangle(mass: f64, width: f64, height: f64) -> Self {
        Self {
            mass,
            inertia: mass * (width * width + height * height) / 12.0,
        }
    }

    /// Kinetic energy of a body moving with `twist`.
    #[must_use]
    pub fn kinetic_energy(&self, twist: &Twist) -> f64 {
        0.5 * self.mass * twist.linear.norm_squared()
            + 0.5 * self.inertia * twist.angular * twist.angular
    }

    /// Validate mass properties.
    ///
    /// Mass and inertia must both be positive and finite; the integrator
    /// divides by them every step.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(crate::SimError::invalid_mass(format!(
                "mass must be positive and finite, got {}",
                self.mass
            )));
        }

        if !self.inertia.is_finite() || self.inertia <= 0.0 {
            return Err(crate::SimError::invalid_mass(format!(
                "moment of inertia must be positive and finite, got {}",
                self.inertia
            )));
        }

        Ok(())
    }
}
