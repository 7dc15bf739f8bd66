//! Penalty revolute (pin) joint.

use hopsim_types::{SimError, SiteKinematics, SiteLoad, SiteRef};
use nalgebra::Vector2;

use crate::{JointLimits, JointParams};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Loads a joint applies to its two sites in one step.
///
/// `mate` is always the exact negation of `base` in force; torques differ
/// only in the sign of the drive and limit terms.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointWrench {
    /// Load on the base site.
    pub base: SiteLoad,
    /// Load on the mate site.
    pub mate: SiteLoad,
    /// Soft-stop torque added to the mate (and removed from the base).
    pub limit_torque: f64,
}

/// Telemetry snapshot of a joint.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointReading {
    /// Joint angle `mate.p - base.p` (rad).
    pub angle: f64,
    /// Drive torque last applied (N·m). Excludes limit contributions.
    pub torque: f64,
}

/// A pin joint between one site on a base body and one site on a mate body.
///
/// The pin is held by a spring-damper on the separation of the two sites.
/// Sites carry no velocity, so the damper acts on the backward difference of
/// the separation between consecutive updates. The joint angle rate used by
/// the soft limits is estimated the same way.
///
/// # Example
///
/// ```
/// use hopsim_constraint::{JointLimits, JointParams, RevoluteJoint};
/// use hopsim_types::{BodyId, BodyRef, SiteId, SiteKinematics, SiteRef};
/// use nalgebra::{Point2, Vector2};
///
/// let base = SiteRef::new(BodyRef::Anchor, SiteId(0));
/// let mate = SiteRef::new(BodyRef::Body(BodyId(0)), SiteId(0));
/// let at_origin = SiteKinematics::new(Point2::origin(), 0.0, Vector2::zeros());
///
/// let mut joint = RevoluteJoint::new(
///     "hinge",
///     base,
///     mate,
///     JointParams::default(),
///     JointLimits::unlimited(),
///     &at_origin,
///     &at_origin,
/// )
/// .unwrap();
///
/// let moved = SiteKinematics::new(Point2::new(0.001, 0.0), 0.0, Vector2::zeros());
/// let wrench = joint.update(1e-4, &at_origin, &moved, 0.0);
///
/// // The base is pulled toward the mate, the mate back toward the base.
/// assert!(wrench.base.fx() > 0.0);
/// assert_eq!(wrench.mate.fx(), -wrench.base.fx());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RevoluteJoint {
    name: String,
    base: SiteRef,
    mate: SiteRef,
    params: JointParams,
    limits: JointLimits,
    /// Site separation at the end of the previous update.
    prev_violation: Vector2<f64>,
    /// Joint angle at the end of the previous update.
    prev_angle: f64,
    angle: f64,
    torque: f64,
}

impl RevoluteJoint {
    /// Create a joint between two sites.
    ///
    /// The snapshots are the sites' current kinematics; they seed the
    /// previous-sample state so the first update sees no spurious rate.
    ///
    /// # Errors
    ///
    /// Returns an error if the gains or limits are out of range, or if both
    /// sites belong to the same body.
    pub fn new(
        name: impl Into<String>,
        base: SiteRef,
        mate: SiteRef,
        params: JointParams,
        limits: JointLimits,
        base_kin: &SiteKinematics,
        mate_kin: &SiteKinematics,
    ) -> hopsim_types::Result<Self> {
        let name = name.into();
        params.validate()?;
        limits.validate()?;
        if base.body == mate.body {
            return Err(SimError::invalid_config(format!(
                "joint '{name}' connects {} to itself",
                base.body
            )));
        }

        let angle = mate_kin.body_angle - base_kin.body_angle;
        Ok(Self {
            name,
            base,
            mate,
            params,
            limits,
            prev_violation: Self::site_distance(base_kin, mate_kin),
            prev_angle: angle,
            angle,
            torque: 0.0,
        })
    }

    /// Restart the rate estimates from the sites' current kinematics.
    ///
    /// Call after a site's body has been moved outside of integration, so
    /// the next update sees no rate from the jump.
    pub fn reseed(&mut self, base_kin: &SiteKinematics, mate_kin: &SiteKinematics) {
        self.prev_violation = Self::site_distance(base_kin, mate_kin);
        self.prev_angle = mate_kin.body_angle - base_kin.body_angle;
        self.angle = self.prev_angle;
    }

    /// Vector from the base site to the mate site: the pin violation.
    #[must_use]
    pub fn site_distance(base: &SiteKinematics, mate: &SiteKinematics) -> Vector2<f64> {
        mate.position - base.position
    }

    /// Compute this step's loads on both sites.
    ///
    /// ```text
    /// F    = k d + b (d - d_prev) / dt     on base, -F on mate
    /// q    = mate.p - base.p
    /// tau  = drive - limit                 on base
    ///       -drive + limit                 on mate
    /// ```
    ///
    /// The previous separation and angle are overwritten only after both
    /// have been used.
    pub fn update(
        &mut self,
        dt: f64,
        base: &SiteKinematics,
        mate: &SiteKinematics,
        drive_torque: f64,
    ) -> JointWrench {
        let violation = Self::site_distance(base, mate);
        let force = violation * self.params.stiffness
            + (violation - self.prev_violation) * (self.params.damping / dt);

        let angle = mate.body_angle - base.body_angle;
        let rate = (angle - self.prev_angle) / dt;
        let limit_torque = self.limits.restoring_torque(angle, rate);

        self.prev_violation = violation;
        self.prev_angle = angle;
        self.angle = angle;
        self.torque = drive_torque;

        JointWrench {
            base: SiteLoad {
                force,
                torque: drive_torque - limit_torque,
            },
            mate: SiteLoad {
                force: -force,
                torque: limit_torque - drive_torque,
            },
            limit_torque,
        }
    }

    /// Joint name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base site handle.
    #[must_use]
    pub fn base(&self) -> SiteRef {
        self.base
    }

    /// Mate site handle.
    #[must_use]
    pub fn mate(&self) -> SiteRef {
        self.mate
    }

    /// Penalty gains.
    #[must_use]
    pub fn params(&self) -> &JointParams {
        &self.params
    }

    /// Angle limits.
    #[must_use]
    pub fn limits(&self) -> &JointLimits {
        &self.limits
    }

    /// Joint angle at the last update (or at construction).
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Drive torque supplied at the last update.
    #[must_use]
    pub fn torque(&self) -> f64 {
        self.torque
    }

    /// Pin violation recorded at the last update.
    #[must_use]
    pub fn violation(&self) -> Vector2<f64> {
        self.prev_violation
    }

    /// Telemetry snapshot.
    #[must_use]
    pub fn reading(&self) -> JointReading {
        JointReading {
            angle: self.angle,
            torque: self.torque,
        }
    }
}
