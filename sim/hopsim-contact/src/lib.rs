//! Ground contact for planar hopping simulation.
//!
//! This crate models the interaction between a body site (typically the ball
//! of the foot) and a flat ground plane at a configurable height.
//!
//! # Contact Model
//!
//! A hybrid penalty/friction model with three states:
//!
//! ```text
//!                 z < ground
//!   no contact ───────────────▶ sliding ◀──────────────┐
//!       ▲                         │ |vx| < v_transition │ |Fx| > mu_stick Fz
//!       │ z >= ground             ▼                     │
//!       └───────────────────── sticking ────────────────┘
//! ```
//!
//! - **Vertical**: `Fz = kz depth (1 - vz/max_vz)` while `vz < max_vz`, else 0
//! - **Sliding**: Coulomb friction `Fx = ∓mu_slide Fz` opposing motion
//! - **Sticking**: spring toward the anchor recorded when sticking engaged,
//!   see [`StictionLaw`]
//!
//! Lift-off zeroes the reaction and re-arms sliding for the next touch-down.
//!
//! # Example
//!
//! ```
//! use hopsim_contact::{ContactParams, GroundContact};
//! use hopsim_types::{BodyId, BodyRef, SiteId, SiteKinematics, SiteRef};
//! use nalgebra::{Point2, Vector2};
//!
//! let site = SiteRef::new(BodyRef::Body(BodyId(0)), SiteId(0));
//! let above = SiteKinematics::new(Point2::new(0.0, 0.01), 0.0, Vector2::zeros());
//! let mut contact = GroundContact::new("ball", site, ContactParams::foot(), &above).unwrap();
//!
//! let below = SiteKinematics::new(Point2::new(0.0, -0.001), 0.0, Vector2::zeros());
//! let load = contact.update(1e-4, &below, 0.0);
//!
//! assert!(contact.in_contact());
//! assert!(load.fz() > 0.0);
//! ```
//!
//! # Layer 0 Crate
//!
//! Depends only on `hopsim-types`, `nalgebra`, and `tracing`.

#![doc(html_root_url = "https://docs.rs/hopsim-contact/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::missing_errors_doc,
)]

mod contact;
mod friction;
mod params;

pub use contact::{ContactReading, GroundContact};
pub use friction::{normal_force, sliding_force, FrictionMode};
pub use params::{ContactParams, StictionLaw};
