//! End-to-end scenarios: free fall, a single pin joint, a contact drop test,
//! and the human hopping model.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use approx::assert_relative_eq;
use hopsim_core::presets::{human_hopper, names, HopperParams};
use hopsim_core::{
    BodyId, BodyRef, ContactParams, ContactTracker, JointLimits, JointParams, JointTracker,
    MassProperties, Pose, RigidBody, RigidBodySystem, SimulationConfig, StepInput, Stepper,
    StepperConfig, Twist,
};

fn unit_mass() -> MassProperties {
    MassProperties::new(1.0, 1.0)
}

#[test]
fn free_fall_reaches_ground_at_expected_speed() {
    let mut system = RigidBodySystem::new("free fall");
    let id = system
        .add_body("ball", unit_mass(), Pose::new(0.0, 1.0, 0.0), Twist::zero())
        .unwrap();

    let mut stepper = Stepper::new(SimulationConfig::default()).unwrap();
    let input = StepInput::passive(&system);
    while system.body(id).unwrap().pose().z() > 0.0 {
        stepper.step(&mut system, &input).unwrap();
    }

    let body = system.body(id).unwrap();
    let expected = -(2.0 * 9.8067_f64).sqrt();
    assert_relative_eq!(body.twist().linear.y, expected, epsilon = 2e-3);
    assert_relative_eq!(body.twist().linear.x, 0.0);
    assert_relative_eq!(body.pose().angle, 0.0);
    assert_relative_eq!(stepper.time(), (2.0 / 9.8067_f64).sqrt(), epsilon = 1e-3);
}

#[test]
fn free_fall_conserves_energy_to_first_order() {
    let mut system = RigidBodySystem::new("energy");
    system
        .add_body("ball", unit_mass(), Pose::new(0.0, 10.0, 0.0), Twist::new(1.0, 0.0, 0.5))
        .unwrap();
    let g = 9.8067;
    let start = system.kinetic_energy() + system.potential_energy(g);

    let mut stepper = Stepper::new(SimulationConfig::default()).unwrap();
    stepper
        .run_until(&mut system, 1.0, |s, _| StepInput::passive(s))
        .unwrap();

    let end = system.kinetic_energy() + system.potential_energy(g);
    assert_relative_eq!(start, end, max_relative = 1e-3);
}

#[test]
fn pin_joint_holds_sites_together() {
    let mut system = RigidBodySystem::new("pair");
    let a = system
        .add_body("a", unit_mass(), Pose::new(0.0, 0.0, 0.0), Twist::zero())
        .unwrap();
    let b = system
        .add_body("b", unit_mass(), Pose::new(1.0, 0.0, 0.0), Twist::new(0.5, 0.0, 1.0))
        .unwrap();
    let sa = system.add_site(BodyRef::Body(a), "right", 0.5, 0.0).unwrap();
    let sb = system.add_site(BodyRef::Body(b), "left", -0.5, 0.0).unwrap();
    let pin = system
        .add_joint("pin", sa, sb, JointParams::default(), JointLimits::unlimited())
        .unwrap();

    let mut stepper = Stepper::with_config(
        SimulationConfig::default(),
        StepperConfig::default().with_divergence_check(true),
    )
    .unwrap();
    let input = StepInput::passive(&system);
    let mut tracker = JointTracker::new(pin);

    let mut max_separation: f64 = 0.0;
    for _ in 0..5000 {
        let report = stepper.step(&mut system, &input).unwrap();
        tracker.record(&system, report.time).unwrap();

        let ka = system.site_kinematics(sa).unwrap();
        let kb = system.site_kinematics(sb).unwrap();
        max_separation = max_separation.max((kb.position - ka.position).norm());

        // Newton's third law on the sites themselves.
        let la = system.site(sa).unwrap().load();
        let lb = system.site(sb).unwrap().load();
        assert_eq!(la.fx(), -lb.fx());
        assert_eq!(la.fz(), -lb.fz());
    }

    assert!(max_separation < 1e-3, "separation {max_separation}");
    assert_eq!(tracker.samples().len(), 5000);
    assert!(tracker.samples().iter().all(|s| s.reading.torque == 0.0));
    assert!(tracker.angles().all(f64::is_finite));
}

#[test]
fn pendulum_on_anchor_stays_attached() {
    let mut system = RigidBodySystem::new("pendulum");
    let ground = system.add_anchor("ground", Pose::new(0.0, 2.0, 0.0)).unwrap();
    let pivot = system.add_site(ground, "pivot", 0.0, 0.0).unwrap();
    let bob = system
        .add_body("bob", MassProperties::new(1.0, 0.5), Pose::new(0.5, 2.0, 0.0), Twist::zero())
        .unwrap();
    let top = system.add_site(BodyRef::Body(bob), "top", -0.5, 0.0).unwrap();
    system
        .add_joint("hinge", pivot, top, JointParams::default(), JointLimits::unlimited())
        .unwrap();

    let mut stepper = Stepper::new(SimulationConfig::default()).unwrap();
    stepper
        .run_until(&mut system, 0.5, |s, _| StepInput::passive(s))
        .unwrap();

    let body = system.body(bob).unwrap();
    let tip = system.site_kinematics(top).unwrap();
    assert!(tip.position.coords.metric_distance(&nalgebra::Vector2::new(0.0, 2.0)) < 1e-2);
    // Swinging down: the bob has dropped and rotated clockwise.
    assert!(body.pose().z() < 2.0);
    assert!(body.pose().angle < 0.0);
    // The anchor itself never moves.
    assert_eq!(system.anchor().unwrap().pose().z(), 2.0);
}

#[test]
fn drop_test_contact_transitions() {
    let mut system = RigidBodySystem::new("drop");
    let id = system
        .add_body("block", unit_mass(), Pose::new(0.0, 0.05, 0.0), Twist::zero())
        .unwrap();
    let site = system.add_site(BodyRef::Body(id), "bottom", 0.0, 0.0).unwrap();
    let contact = system
        .add_contact("ground", site, ContactParams::foot())
        .unwrap();

    let mut stepper = Stepper::new(SimulationConfig::default()).unwrap();
    let input = StepInput::passive(&system);
    let mut tracker = ContactTracker::new(contact);

    let mut touched_down = false;
    let mut touchdowns = 0;
    for _ in 0..20_000 {
        // Contacts see the position published by the previous step.
        let z_before = system.site_kinematics(site).unwrap().position.y;
        let was_in_contact = system.contact(contact).unwrap().in_contact();
        stepper.step(&mut system, &input).unwrap();
        tracker.record(&system, stepper.time()).unwrap();

        let c = system.contact(contact).unwrap();
        assert_eq!(c.in_contact(), z_before < 0.0);

        if c.in_contact() && !was_in_contact {
            touchdowns += 1;
            assert!(c.force().y > 0.0, "no reaction at touch-down");
            touched_down = true;
        }
        if touched_down && z_before >= 0.0 {
            // First rebound above ground.
            assert_eq!(c.force().y, 0.0);
            assert!(c.is_sliding());
            break;
        }
    }

    assert!(touched_down);
    assert_eq!(touchdowns, 1);
    assert_eq!(tracker.touchdowns(), 1);
    assert!(tracker.peak_normal_force() > 9.8067);
}

#[test]
fn ground_height_is_per_contact_input() {
    let mut system = RigidBodySystem::new("raised");
    let id = system
        .add_body("block", unit_mass(), Pose::new(0.0, 0.5, 0.0), Twist::zero())
        .unwrap();
    let site = system.add_site(BodyRef::Body(id), "bottom", 0.0, 0.0).unwrap();
    let contact = system
        .add_contact("ground", site, ContactParams::foot())
        .unwrap();

    let mut stepper = Stepper::new(SimulationConfig::default()).unwrap();
    stepper
        .run_until(&mut system, 0.5, |s, _| {
            StepInput::passive(s).with_ground_height(0.45)
        })
        .unwrap();

    let c = system.contact(contact).unwrap();
    assert_eq!(c.ground_height(), 0.45);
    // Settled on the raised ground, far above z = 0.
    assert!(system.body(id).unwrap().pose().z() > 0.4);
}

#[test]
fn hopper_falls_lands_and_stays_finite() {
    let (mut system, handles) = human_hopper(&HopperParams::default()).unwrap();
    let ball = system.contact_by_name(names::BALL_CONTACT).unwrap();
    let hip = system.joint_by_name(names::HIP).unwrap();

    let mut stepper = Stepper::with_config(
        SimulationConfig::hopping(),
        StepperConfig::default().with_divergence_check(true),
    )
    .unwrap();
    let mut contacts = ContactTracker::new(ball);
    let mut hip_tracker = JointTracker::new(hip);

    stepper
        .run_until(&mut system, 1.0, |s, t| {
            contacts.record(s, t).unwrap();
            hip_tracker.record(s, t).unwrap();
            StepInput::passive(s)
        })
        .unwrap();

    assert!(system.validate().is_ok());
    assert!(contacts.touchdowns() >= 1);
    assert!(contacts.peak_normal_force() > 0.0);
    assert_eq!(hip_tracker.samples().len(), 10_000);

    // Pins stay within a few centimetres even through the landing.
    for joint in system.joints() {
        let base = system.site_kinematics(joint.base()).unwrap();
        let mate = system.site_kinematics(joint.mate()).unwrap();
        assert!((mate.position - base.position).norm() < 0.05, "{}", joint.name());
    }

    // Trunk was falling freely for the first half second.
    let early = &hip_tracker.samples()[..5000];
    assert!(early
        .iter()
        .all(|s| (s.reading.angle - 30.0_f64.to_radians()).abs() < 1e-6));
    assert!(system.body(handles.trunk).unwrap().pose().z() < 3.4);
    assert_eq!(system.body_by_name(names::TRUNK), Ok(BodyId(0)));
}

#[test]
fn hopper_geometry_follows_bodies() {
    let (system, handles) = human_hopper(&HopperParams::default()).unwrap();
    let foot = system.body(handles.foot).unwrap();
    let outline = foot.geometry_world();

    assert_eq!(outline.len(), 5);
    let centroid = outline[..4]
        .iter()
        .fold(nalgebra::Vector2::zeros(), |acc, p| acc + p.coords)
        / 4.0;
    assert_relative_eq!(centroid.x, foot.pose().x(), epsilon = 1e-12);
    assert_relative_eq!(centroid.y, foot.pose().z(), epsilon = 1e-12);
}
