//! Planar articulated rigid-body simulation.
//!
//! This crate ties the workspace together:
//!
//! - [`Anchor`] and [`Body`] - the two [`RigidBody`] flavors
//! - [`RigidBodySystem`] - sole owner of bodies, joints, and contacts
//! - [`Stepper`] - fixed-step driver: contacts → joints → integration
//! - [`JointTracker`] / [`ContactTracker`] - telemetry time series
//! - [`presets::human_hopper`] - the four-segment hopping model
//!
//! # Explicit Accumulation
//!
//! Joints and contacts never touch bodies. Each step the system zeroes all
//! site loads, hands every joint and contact a [`SiteKinematics`] snapshot,
//! and adds the load it returns to the referenced site. Bodies then sum
//! their own site loads when they integrate.
//!
//! # Example
//!
//! ```
//! use hopsim_core::presets::{human_hopper, HopperParams};
//! use hopsim_core::{StepInput, Stepper};
//! use hopsim_types::SimulationConfig;
//!
//! let (mut system, handles) = human_hopper(&HopperParams::default()).unwrap();
//! let mut stepper = Stepper::new(SimulationConfig::default()).unwrap();
//!
//! stepper
//!     .run_until(&mut system, 0.01, |s, _t| StepInput::passive(s))
//!     .unwrap();
//!
//! // Still falling toward the ground.
//! assert!(system.body(handles.trunk).unwrap().twist().linear.y < 0.0);
//! ```
//!
//! [`SiteKinematics`]: hopsim_types::SiteKinematics

#![doc(html_root_url = "https://docs.rs/hopsim-core/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
)]

mod body;
pub mod integrators;
pub mod presets;
mod stepper;
mod trace;
mod world;

pub use body::{rectangle_outline, Anchor, Body, RigidBody};
pub use stepper::{StepInput, StepReport, Stepper, StepperConfig};
pub use trace::{ContactTracker, JointTracker, Sample};
pub use world::RigidBodySystem;

// Re-export key types from the layer-0 crates for convenience
pub use hopsim_constraint::{JointLimits, JointParams, JointReading, RevoluteJoint};
pub use hopsim_contact::{ContactParams, ContactReading, FrictionMode, GroundContact, StictionLaw};
pub use hopsim_types::{
    BodyId, BodyRef, ContactId, JointId, MassProperties, Pose, SimError, SimulationConfig, SiteId,
    SiteRef, Twist,
};
