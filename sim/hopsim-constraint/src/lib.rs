//! Revolute joints for planar articulated hopping models.
//!
//! This crate provides the pin joint that connects body segments:
//!
//! - [`RevoluteJoint`]: holds two sites together with a stiff spring-damper
//!   and transmits an externally supplied drive torque
//! - [`JointParams`]: penalty gains
//! - [`JointLimits`]: angular bounds with a velocity-aware soft stop
//!
//! # Constraint Formulation
//!
//! Joints are penalty constraints, not exact ones:
//!
//! ```text
//! d = r_mate - r_base                    (pin violation)
//! F = k d + b (d - d_prev) / dt          (on base, -F on mate)
//! ```
//!
//! A small bounded violation is accepted in exchange for explicit
//! integrability. Stability depends on `k`, `b`, and the step size; the
//! default gains assume `dt = 1e-4`.
//!
//! # Ownership
//!
//! Joints refer to sites through [`SiteRef`](hopsim_types::SiteRef) handles
//! and never touch bodies. The caller hands in [`SiteKinematics`] snapshots
//! and applies the returned [`JointWrench`] itself.
//!
//! # Layer 0 Crate
//!
//! Depends only on `hopsim-types` and `nalgebra`.
//!
//! [`SiteKinematics`]: hopsim_types::SiteKinematics

#![doc(html_root_url = "https://docs.rs/hopsim-constraint/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::missing_errors_doc,
)]

mod joint;
mod limits;
mod params;

pub use joint::{JointReading, JointWrench, RevoluteJoint};
pub use limits::{JointLimits, LimitState};
pub use params::JointParams;
