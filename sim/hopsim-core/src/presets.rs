//! Ready-made models.
//!
//! [`human_hopper`] builds the four-segment trunk/thigh/shank/foot model used
//! for hopping studies. Leg segment masses are doubled to stand in for two
//! legs moving in phase.

use hopsim_constraint::{JointLimits, JointParams};
use hopsim_contact::ContactParams;
use hopsim_types::{BodyId, BodyRef, MassProperties, Point2, Pose, SiteRef, Twist, Vector2};
use nalgebra::UnitComplex;

use crate::body::{rectangle_outline, Body, RigidBody};
use crate::world::RigidBodySystem;

/// Names used by [`human_hopper`].
pub mod names {
    /// Trunk body.
    pub const TRUNK: &str = "trunk";
    /// Thigh body.
    pub const THIGH: &str = "thigh";
    /// Shank body.
    pub const SHANK: &str = "shank";
    /// Foot body.
    pub const FOOT: &str = "foot";
    /// Hip joint (trunk → thigh).
    pub const HIP: &str = "hip";
    /// Knee joint (thigh → shank).
    pub const KNEE: &str = "knee";
    /// Ankle joint (shank → foot).
    pub const ANKLE: &str = "ankle";
    /// Ball-of-foot ground contact.
    pub const BALL_CONTACT: &str = "ball contact";
}

/// Transform point `local`, given in frame B, into frame A.
///
/// ```text
/// r_A = r_AB + R(angle_AB) r_B
/// ```
#[must_use]
pub fn transform_point(origin: Point2<f64>, angle: f64, local: Vector2<f64>) -> Point2<f64> {
    origin + UnitComplex::new(angle).transform_vector(&local)
}

/// Initial pose and interaction parameters for [`human_hopper`].
///
/// Joint angles are `mate.p - base.p`; the trunk lean is absolute (negative
/// is clockwise, i.e. leaning forward).
#[derive(Debug, Clone, PartialEq)]
pub struct HopperParams {
    /// Initial horizontal position of the trunk center of mass (m).
    pub x0: f64,
    /// Initial height of the trunk center of mass (m).
    pub height: f64,
    /// Absolute trunk pitch (rad).
    pub trunk_lean: f64,
    /// Initial hip angle (rad).
    pub hip_angle: f64,
    /// Initial knee angle (rad).
    pub knee_angle: f64,
    /// Initial ankle angle (rad).
    pub ankle_angle: f64,
    /// Hip limits.
    pub hip_limits: JointLimits,
    /// Knee limits.
    pub knee_limits: JointLimits,
    /// Ankle limits.
    pub ankle_limits: JointLimits,
    /// Pin gains shared by all joints.
    pub joint: JointParams,
    /// Ball-of-foot contact.
    pub contact: ContactParams,
}

impl Default for HopperParams {
    fn default() -> Self {
        Self {
            x0: 0.0,
            height: 3.4,
            trunk_lean: (-5.0_f64).to_radians(),
            hip_angle: 30.0_f64.to_radians(),
            knee_angle: (-45.0_f64).to_radians(),
            ankle_angle: 90.0_f64.to_radians(),
            hip_limits: JointLimits::from_degrees(-30.0, 100.0),
            knee_limits: JointLimits::new((-160.0_f64).to_radians(), 0.01),
            ankle_limits: JointLimits::new(0.01, 120.0_f64.to_radians()),
            joint: JointParams::default(),
            contact: ContactParams::foot(),
        }
    }
}

impl HopperParams {
    /// Set the drop height of the trunk.
    #[must_use]
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    /// Set the initial joint angles (rad).
    #[must_use]
    pub fn with_joint_angles(mut self, hip: f64, knee: f64, ankle: f64) -> Self {
        self.hip_angle = hip;
        self.knee_angle = knee;
        self.ankle_angle = ankle;
        self
    }
}

/// Handles into a system built by [`human_hopper`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HopperHandles {
    /// Trunk.
    pub trunk: BodyId,
    /// Thigh.
    pub thigh: BodyId,
    /// Shank.
    pub shank: BodyId,
    /// Foot.
    pub foot: BodyId,
}

struct Segment {
    name: &'static str,
    mass: f64,
    inertia: f64,
    /// Site toward the proximal joint, body frame.
    top: (&'static str, f64),
    /// Site toward the distal joint or the ground, body frame.
    bottom: (&'static str, f64),
    half_width: f64,
    half_height: f64,
}

const THIGH: Segment = Segment {
    name: names::THIGH,
    mass: 17.4,
    inertia: 0.3,
    top: ("hip", 0.25),
    bottom: ("knee", -0.25),
    half_width: 0.03,
    half_height: 0.25,
};

const SHANK: Segment = Segment {
    name: names::SHANK,
    mass: 6.4,
    inertia: 0.1,
    top: ("knee", 0.25),
    bottom: ("ankle", -0.25),
    half_width: 0.02,
    half_height: 0.25,
};

const FOOT: Segment = Segment {
    name: names::FOOT,
    mass: 1.9,
    inertia: 0.01,
    top: ("ankle", 0.075),
    bottom: ("ball", -0.125),
    half_width: 0.01,
    half_height: 0.125,
};

/// Build the human hopping model.
///
/// Each segment hangs from the previous one: its pitch is the parent's pitch
/// plus the joint angle, and its center sits so that its proximal site lands
/// exactly on the parent's distal site. Joints therefore start with zero
/// violation.
///
/// # Errors
///
/// Returns an error if any parameter is out of range.
pub fn human_hopper(
    params: &HopperParams,
) -> hopsim_types::Result<(RigidBodySystem, HopperHandles)> {
    let mut system = RigidBodySystem::new("Human Hopping Model");

    let trunk = system.insert_body(
        Body::new(
            names::TRUNK,
            MassProperties::new(53.0, 3.0),
            Pose::new(params.x0, params.height, params.trunk_lean),
            Twist::zero(),
        )?
        .with_geometry(rectangle_outline(0.08, 0.3)),
    )?;
    let trunk_hip = system.add_site(BodyRef::Body(trunk), "hip", 0.0, -0.3)?;

    let (thigh, thigh_hip, thigh_knee) =
        hang_segment(&mut system, &THIGH, trunk_hip, params.hip_angle)?;
    let (shank, shank_knee, shank_ankle) =
        hang_segment(&mut system, &SHANK, thigh_knee, params.knee_angle)?;
    let (foot, foot_ankle, foot_ball) =
        hang_segment(&mut system, &FOOT, shank_ankle, params.ankle_angle)?;

    system.add_joint(names::HIP, trunk_hip, thigh_hip, params.joint, params.hip_limits)?;
    system.add_joint(names::KNEE, thigh_knee, shank_knee, params.joint, params.knee_limits)?;
    system.add_joint(
        names::ANKLE,
        shank_ankle,
        foot_ankle,
        params.joint,
        params.ankle_limits,
    )?;

    system.add_contact(names::BALL_CONTACT, foot_ball, params.contact)?;

    Ok((
        system,
        HopperHandles {
            trunk,
            thigh,
            shank,
            foot,
        },
    ))
}

/// Add `segment` below `parent_site`, rotated `joint_angle` from the parent.
fn hang_segment(
    system: &mut RigidBodySystem,
    segment: &Segment,
    parent_site: SiteRef,
    joint_angle: f64,
) -> hopsim_types::Result<(BodyId, SiteRef, SiteRef)> {
    let parent = system.site_kinematics(parent_site)?;
    let angle = parent.body_angle + joint_angle;
    let center = transform_point(parent.position, angle, Vector2::new(0.0, -segment.top.1));

    let mut body = Body::new(
        segment.name,
        MassProperties::new(segment.mass, segment.inertia),
        Pose::new(center.x, center.y, angle),
        Twist::zero(),
    )?
    .with_geometry(rectangle_outline(segment.half_width, segment.half_height));
    let top = body.add_site(segment.top.0, 0.0, segment.top.1);
    let bottom = body.add_site(segment.bottom.0, 0.0, segment.bottom.1);

    let id = system.insert_body(body)?;
    Ok((
        id,
        SiteRef::new(BodyRef::Body(id), top),
        SiteRef::new(BodyRef::Body(id), bottom),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_transform_point() {
        let p = transform_point(Point2::new(1.0, 1.0), FRAC_PI_2, Vector2::new(0.0, -0.25));
        assert_relative_eq!(p.x, 1.25, epsilon = 1e-12);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_hopper_layout() {
        let (system, handles) = human_hopper(&HopperParams::default()).unwrap();

        assert_eq!(system.body_count(), 4);
        assert_eq!(system.joint_count(), 3);
        assert_eq!(system.contact_count(), 1);
        assert_eq!(system.body_by_name(names::FOOT), Ok(handles.foot));
        assert!(system.contact_by_name(names::BALL_CONTACT).is_ok());

        let total: f64 = system.bodies().map(|b| b.mass_properties().mass).sum();
        assert_relative_eq!(total, 78.7, epsilon = 1e-9);
        assert_eq!(system.body(handles.trunk).unwrap().geometry().len(), 5);
    }

    #[test]
    fn test_hopper_joints_start_closed() {
        let params = HopperParams::default();
        let (system, _) = human_hopper(&params).unwrap();

        for joint in system.joints() {
            let base = system.site_kinematics(joint.base()).unwrap();
            let mate = system.site_kinematics(joint.mate()).unwrap();
            assert_relative_eq!((mate.position - base.position).norm(), 0.0, epsilon = 1e-12);
        }

        let angles: Vec<f64> = system.joint_readings().iter().map(|r| r.angle).collect();
        assert_relative_eq!(angles[0], params.hip_angle, epsilon = 1e-12);
        assert_relative_eq!(angles[1], params.knee_angle, epsilon = 1e-12);
        assert_relative_eq!(angles[2], params.ankle_angle, epsilon = 1e-12);
    }

    #[test]
    fn test_hopper_starts_airborne() {
        let (system, _) = human_hopper(&HopperParams::default()).unwrap();
        let ball = system.contacts()[0].site();
        assert!(system.site_kinematics(ball).unwrap().position.y > 1.0);
        assert!(!system.contacts()[0].in_contact());
    }

    #[test]
    fn test_rejects_bad_params() {
        let params = HopperParams {
            joint: JointParams::new(-1.0, 0.0),
            ..HopperParams::default()
        };
        assert!(human_hopper(&params).is_err());
    }
}
