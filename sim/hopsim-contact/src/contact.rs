//! Ground contact at a single site.

use hopsim_types::{SiteKinematics, SiteLoad, SiteRef};
use nalgebra::{Point2, Vector2};
use tracing::debug;

use crate::friction::{normal_force, sliding_force, FrictionMode};
use crate::ContactParams;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Telemetry snapshot of a ground contact.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactReading {
    /// Ground reaction `(fx, fz)` from the last update (N).
    pub force: Vector2<f64>,
    /// Whether the site is below the ground.
    pub in_contact: bool,
    /// Whether the sliding law is active.
    pub sliding: bool,
    /// Horizontal displacement from the stick anchor, while sticking.
    pub stick_offset: Option<f64>,
    /// Site height at the last update.
    pub height: f64,
    /// Ground height at the last update.
    pub ground_height: f64,
}

/// Penalty contact between one site and a flat ground plane.
///
/// Three states: no contact, sliding, sticking. The vertical reaction is a
/// penetration spring relieved by the site's rising speed; the horizontal
/// reaction is Coulomb friction while sliding and a spring toward the stick
/// anchor while sticking.
///
/// Velocities are backward differences of the site position. The position is
/// recorded at the end of every update, in or out of contact, so the first
/// step after touch-down sees a valid velocity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroundContact {
    name: String,
    site: SiteRef,
    params: ContactParams,
    in_contact: bool,
    mode: FrictionMode,
    prev_position: Point2<f64>,
    force: Vector2<f64>,
    ground_height: f64,
}

impl GroundContact {
    /// Create a contact at `site`, currently at `kinematics`.
    ///
    /// Starts out of contact in sliding mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are out of range.
    pub fn new(
        name: impl Into<String>,
        site: SiteRef,
        params: ContactParams,
        kinematics: &SiteKinematics,
    ) -> hopsim_types::Result<Self> {
        params.validate()?;
        Ok(Self {
            name: name.into(),
            site,
            params,
            in_contact: false,
            mode: FrictionMode::Sliding,
            prev_position: kinematics.position,
            force: Vector2::zeros(),
            ground_height: 0.0,
        })
    }

    /// Restart the velocity estimate from the site's current position.
    pub fn reseed(&mut self, kinematics: &SiteKinematics) {
        self.prev_position = kinematics.position;
    }

    /// Compute this step's ground reaction at the site.
    pub fn update(
        &mut self,
        dt: f64,
        kinematics: &SiteKinematics,
        ground_height: f64,
    ) -> SiteLoad {
        self.ground_height = ground_height;
        let position = kinematics.position;
        let (x, z) = (position.x, position.y);

        if z < ground_height {
            if !self.in_contact {
                debug!(contact = %self.name, x, z, ground_height, "touch-down");
            }
            self.in_contact = true;

            let velocity = (position - self.prev_position) / dt;
            let (vx, vz) = (velocity.x, velocity.y);

            let p = &self.params;
            let fz = normal_force(p.stiffness_z, ground_height - z, vz, p.max_vz);

            let fx = match self.mode {
                FrictionMode::Sliding => {
                    let fx = sliding_force(p.mu_slide, fz, vx);
                    if vx.abs() < p.v_transition {
                        debug!(contact = %self.name, anchor = x, vx, "sliding -> sticking");
                        self.mode = FrictionMode::Sticking { anchor_x: x };
                    }
                    fx
                }
                FrictionMode::Sticking { anchor_x } => {
                    let fx = p.stiction.force(x - anchor_x, vx, p.stiffness_x, p.max_vx);
                    let capacity = p.mu_stick * fz;
                    if fx.abs() > capacity {
                        debug!(
                            contact = %self.name,
                            fx = fx.abs(),
                            capacity,
                            "sticking -> sliding"
                        );
                        self.mode = FrictionMode::Sliding;
                    }
                    fx
                }
            };

            self.force = Vector2::new(fx, fz);
        } else if self.in_contact {
            debug!(contact = %self.name, x, z, ground_height, "lift-off");
            self.in_contact = false;
            self.force = Vector2::zeros();
            self.mode = FrictionMode::Sliding;
        }

        self.prev_position = position;
        SiteLoad::from_force(self.force)
    }

    /// Contact name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Site handle.
    #[must_use]
    pub fn site(&self) -> SiteRef {
        self.site
    }

    /// Parameters.
    #[must_use]
    pub fn params(&self) -> &ContactParams {
        &self.params
    }

    /// Whether the site was below ground at the last update.
    #[must_use]
    pub fn in_contact(&self) -> bool {
        self.in_contact
    }

    /// Whether the sliding law is active.
    #[must_use]
    pub fn is_sliding(&self) -> bool {
        self.mode.is_sliding()
    }

    /// Current friction mode.
    #[must_use]
    pub fn mode(&self) -> FrictionMode {
        self.mode
    }

    /// Horizontal position where sticking engaged, while sticking.
    #[must_use]
    pub fn stick_anchor(&self) -> Option<f64> {
        self.mode.anchor()
    }

    /// Ground reaction `(fx, fz)` from the last update.
    #[must_use]
    pub fn force(&self) -> Vector2<f64> {
        self.force
    }

    /// Ground height seen at the last update.
    #[must_use]
    pub fn ground_height(&self) -> f64 {
        self.ground_height
    }

    /// Site position recorded at the last update.
    #[must_use]
    pub fn last_position(&self) -> Point2<f64> {
        self.prev_position
    }

    /// Telemetry snapshot.
    #[must_use]
    pub fn reading(&self) -> ContactReading {
        ContactReading {
            force: self.force,
            in_contact: self.in_contact,
            sliding: self.mode.is_sliding(),
            stick_offset: self.mode.anchor().map(|a| self.prev_position.x - a),
            height: self.prev_position.y,
            ground_height: self.ground_height,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::StictionLaw;
    use approx::assert_relative_eq;
    use hopsim_types::{BodyId, BodyRef, SiteId};

    const DT: f64 = 1e-4;

    fn at(x: f64, z: f64) -> SiteKinematics {
        SiteKinematics::new(Point2::new(x, z), 0.0, Vector2::zeros())
    }

    fn contact(params: ContactParams, x: f64, z: f64) -> GroundContact {
        GroundContact::new(
            "ball",
            SiteRef::new(BodyRef::Body(BodyId(0)), SiteId(0)),
            params,
            &at(x, z),
        )
        .unwrap()
    }

    #[test]
    fn test_above_ground_is_noop() {
        let mut c = contact(ContactParams::foot(), 0.0, 0.1);
        let load = c.update(DT, &at(0.0, 0.09), 0.0);
        assert_eq!(load, SiteLoad::zero());
        assert!(!c.in_contact());
        assert!(c.is_sliding());
    }

    #[test]
    fn test_penetration_pushes_up() {
        let mut c = contact(ContactParams::foot(), 0.0, -0.001);
        // Resting at -1 mm, zero velocity.
        let load = c.update(DT, &at(0.0, -0.001), 0.0);
        assert!(c.in_contact());
        assert_relative_eq!(load.fz(), 80.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fast_rise_gets_no_push() {
        let params = ContactParams::foot();
        let mut c = contact(params, 0.0, -0.01);
        // Rising 2e-5 m in one step is 0.2 m/s, above max_vz.
        let load = c.update(DT, &at(0.0, -0.00998), 0.0);
        assert!(c.in_contact());
        assert_eq!(load.fz(), 0.0);
        assert_eq!(load.fx(), 0.0);
    }

    #[test]
    fn test_ground_height_offset() {
        let mut c = contact(ContactParams::foot(), 0.0, 0.5);
        let load = c.update(DT, &at(0.0, 0.5), 0.501);
        assert!(c.in_contact());
        assert_relative_eq!(load.fz(), 80.0, epsilon = 1e-6);
        assert_eq!(c.ground_height(), 0.501);
    }

    #[test]
    fn test_sliding_stays_sliding_above_transition() {
        let mut c = contact(ContactParams::foot(), 0.0, -0.001);
        // vx = 1e-5 / 1e-4 = 0.1 m/s > v_transition.
        let load = c.update(DT, &at(1e-5, -0.001), 0.0);
        assert!(c.is_sliding());
        assert_relative_eq!(load.fx(), -0.6 * load.fz(), epsilon = 1e-9);

        let load = c.update(DT, &at(0.0, -0.001), 0.0);
        assert!(c.is_sliding());
        assert_relative_eq!(load.fx(), 0.6 * load.fz(), epsilon = 1e-9);
    }

    #[test]
    fn test_slow_slide_engages_stiction_at_current_position() {
        let mut c = contact(ContactParams::foot(), 0.0, -0.001);
        c.update(DT, &at(1e-5, -0.001), 0.0);
        assert!(c.is_sliding());

        // vx = 5e-7 / 1e-4 = 0.005 m/s < v_transition.
        let x = 1e-5 + 5e-7;
        let load = c.update(DT, &at(x, -0.001), 0.0);
        // The switching step still applies sliding friction.
        assert_relative_eq!(load.fx(), -0.6 * load.fz(), epsilon = 1e-9);
        assert!(!c.is_sliding());
        assert_eq!(c.stick_anchor(), Some(x));
    }

    #[test]
    fn test_stiction_holds_then_breaks() {
        let mut c = contact(ContactParams::foot(), 0.0, -0.001);
        c.update(DT, &at(0.0, -0.001), 0.0);
        assert_eq!(c.stick_anchor(), Some(0.0));

        // Small creep: spring force well under 0.8 * 80 N.
        let load = c.update(DT, &at(1e-6, -0.001), 0.0);
        assert!(load.fx() < 0.0);
        assert!(!c.is_sliding());
        assert_relative_eq!(c.reading().stick_offset.unwrap(), 1e-6, epsilon = 1e-15);

        // Large jump: |Fx| exceeds capacity, back to sliding.
        let load = c.update(DT, &at(0.05, -0.001), 0.0);
        assert!(load.fx().abs() > 0.8 * load.fz());
        assert!(c.is_sliding());
        assert!(c.stick_anchor().is_none());
    }

    #[test]
    fn test_linear_stiction_law() {
        let params = ContactParams::foot().with_stiction(StictionLaw::Linear { damping: 100.0 });
        let mut c = contact(params, 0.0, -0.001);
        c.update(DT, &at(0.0, -0.001), 0.0);

        let load = c.update(DT, &at(1e-6, -0.001), 0.0);
        // -k dist - b v = -4000e-6 - 100 * 0.01
        assert_relative_eq!(load.fx(), -0.004 - 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_lift_off_resets_state() {
        let mut c = contact(ContactParams::foot(), 0.0, -0.001);
        c.update(DT, &at(0.0, -0.001), 0.0);
        assert!(!c.is_sliding());

        let load = c.update(DT, &at(0.0, 0.001), 0.0);
        assert!(!c.in_contact());
        assert!(c.is_sliding());
        assert_eq!(load, SiteLoad::zero());
        assert_eq!(c.force(), Vector2::zeros());
        assert_eq!(c.last_position(), Point2::new(0.0, 0.001));
    }

    #[test]
    fn test_reseed_restarts_velocity() {
        let mut c = contact(ContactParams::foot(), 0.0, 0.5);
        c.reseed(&at(0.0, -0.001));
        assert_eq!(c.last_position(), Point2::new(0.0, -0.001));

        // At rest in the ground: pure penetration spring.
        c.update(DT, &at(0.0, -0.001), 0.0);
        assert_relative_eq!(c.force().y, 80.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_bad_params() {
        let result = GroundContact::new(
            "bad",
            SiteRef::new(BodyRef::Anchor, SiteId(0)),
            ContactParams::foot().with_vertical(1.0, 0.0),
            &at(0.0, 0.0),
        );
        assert!(result.is_err());
    }
}
