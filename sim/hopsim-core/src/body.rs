//! Anchors and moving bodies.
//!
//! Both flavors share the [`RigidBody`] interface: a pose, a set of owned
//! sites, and an outline polygon. Only [`Body`] integrates; an [`Anchor`]
//! has no dynamics at all, so there is nothing to override or no-op.

use hopsim_types::{
    MassProperties, Point2, Pose, Site, SiteId, SiteKinematics, SiteLoad, Twist, Vector2,
};

use crate::integrators::{Integrator, SemiImplicitEuler};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Capabilities shared by anchors and moving bodies.
pub trait RigidBody {
    /// Body name.
    fn name(&self) -> &str;

    /// Current pose.
    fn pose(&self) -> &Pose;

    /// Owned sites, in insertion order.
    fn sites(&self) -> &[Site];

    /// Mutable access to owned sites.
    fn sites_mut(&mut self) -> &mut [Site];

    /// Append a site without publishing its world offset.
    fn push_site(&mut self, site: Site) -> SiteId;

    /// Local-frame outline polygon (may be empty).
    fn geometry(&self) -> &[Point2<f64>];

    /// Add a site at body-frame offset `(x_b, z_b)` and publish its world
    /// offset for the current orientation.
    fn add_site(&mut self, name: &str, x_b: f64, z_b: f64) -> SiteId {
        let id = self.push_site(Site::new(name, x_b, z_b));
        self.update_site_coords();
        id
    }

    /// Recompute every site's world offset from the current pitch angle.
    fn update_site_coords(&mut self) {
        let rotation = self.pose().rotation();
        for site in self.sites_mut() {
            site.update_world_offset(&rotation);
        }
    }

    /// Site by index.
    fn site(&self, id: SiteId) -> Option<&Site> {
        self.sites().get(id.0)
    }

    /// Index of the first site with the given name.
    fn site_by_name(&self, name: &str) -> Option<SiteId> {
        self.sites()
            .iter()
            .position(|s| s.name() == name)
            .map(SiteId)
    }

    /// World position, world offset, and owner angle of a site.
    fn site_kinematics(&self, id: SiteId) -> Option<SiteKinematics> {
        let pose = self.pose();
        self.site(id)
            .map(|s| SiteKinematics::new(pose.position, pose.angle, s.world_offset()))
    }

    /// Zero every site's accumulated load.
    fn clear_site_loads(&mut self) {
        for site in self.sites_mut() {
            site.clear_load();
        }
    }

    /// Outline polygon mapped into the world frame.
    fn geometry_world(&self) -> Vec<Point2<f64>> {
        let pose = self.pose();
        self.geometry()
            .iter()
            .map(|p| pose.transform_point(p))
            .collect()
    }
}

/// Immovable body: the ground or a wall.
///
/// Its pose changes only through [`Anchor::set_pose`] during model
/// construction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Anchor {
    name: String,
    pose: Pose,
    sites: Vec<Site>,
    geometry: Vec<Point2<f64>>,
}

impl Anchor {
    /// Create an anchor at the given pose.
    #[must_use]
    pub fn new(name: impl Into<String>, pose: Pose) -> Self {
        Self {
            name: name.into(),
            pose,
            sites: Vec::new(),
            geometry: Vec::new(),
        }
    }

    /// Set the outline polygon.
    #[must_use]
    pub fn with_geometry(mut self, vertices: Vec<Point2<f64>>) -> Self {
        self.geometry = vertices;
        self
    }

    /// Move the anchor and republish its site coordinates.
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
        self.update_site_coords();
    }
}

impl RigidBody for Anchor {
    fn name(&self) -> &str {
        &self.name
    }

    fn pose(&self) -> &Pose {
        &self.pose
    }

    fn sites(&self) -> &[Site] {
        &self.sites
    }

    fn sites_mut(&mut self) -> &mut [Site] {
        &mut self.sites
    }

    fn push_site(&mut self, site: Site) -> SiteId {
        self.sites.push(site);
        SiteId(self.sites.len() - 1)
    }

    fn geometry(&self) -> &[Point2<f64>] {
        &self.geometry
    }
}

/// A moving planar rigid body.
///
/// # Example
///
/// ```
/// use hopsim_core::{Body, RigidBody};
/// use hopsim_types::{MassProperties, Pose, SiteLoad, Twist};
///
/// let mut body = Body::new(
///     "block",
///     MassProperties::new(2.0, 0.1),
///     Pose::new(0.0, 1.0, 0.0),
///     Twist::zero(),
/// )
/// .unwrap();
/// let tip = body.add_site("tip", 0.5, 0.0);
///
/// // Push up at the tip hard enough to cancel gravity.
/// body.add_site_load(tip, SiteLoad::new(0.0, 2.0 * 9.8067, 0.0));
/// body.integrate(1e-3, 9.8067);
///
/// assert!(body.twist().linear.y.abs() < 1e-12);
/// assert!(body.twist().angular > 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Body {
    name: String,
    pose: Pose,
    twist: Twist,
    mass: MassProperties,
    sites: Vec<Site>,
    geometry: Vec<Point2<f64>>,
}

impl Body {
    /// Create a moving body.
    ///
    /// # Errors
    ///
    /// Returns an error if mass or inertia is not positive and finite.
    pub fn new(
        name: impl Into<String>,
        mass: MassProperties,
        pose: Pose,
        twist: Twist,
    ) -> hopsim_types::Result<Self> {
        mass.validate()?;
        Ok(Self {
            name: name.into(),
            pose,
            twist,
            mass,
            sites: Vec::new(),
            geometry: Vec::new(),
        })
    }

    /// Set the outline polygon.
    #[must_use]
    pub fn with_geometry(mut self, vertices: Vec<Point2<f64>>) -> Self {
        self.geometry = vertices;
        self
    }

    /// Current velocity.
    #[must_use]
    pub fn twist(&self) -> &Twist {
        &self.twist
    }

    /// Mass and inertia.
    #[must_use]
    pub fn mass_properties(&self) -> &MassProperties {
        &self.mass
    }

    /// Move the body and republish its site coordinates.
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
        self.update_site_coords();
    }

    /// Set the velocity.
    pub fn set_twist(&mut self, twist: Twist) {
        self.twist = twist;
    }

    /// Add a load to one of this body's sites.
    ///
    /// Returns `false` if the site does not exist.
    pub fn add_site_load(&mut self, id: SiteId, load: SiteLoad) -> bool {
        match self.sites.get_mut(id.0) {
            Some(site) => {
                site.add_load(load);
                true
            }
            None => false,
        }
    }

    /// Net force and net torque about the center of mass from all site loads.
    #[must_use]
    pub fn net_load(&self) -> (Vector2<f64>, f64) {
        self.sites
            .iter()
            .fold((Vector2::zeros(), 0.0), |(force, torque), site| {
                let load = site.load();
                (
                    force + load.force,
                    torque + load.moment_about_com(&site.world_offset()),
                )
            })
    }

    /// Advance one step under the accumulated site loads and gravity
    /// (magnitude `gravity`, along −z), then republish site coordinates.
    pub fn integrate(&mut self, dt: f64, gravity: f64) {
        let (force, torque) = self.net_load();
        let linear_accel = force / self.mass.mass - Vector2::new(0.0, gravity);
        let angular_accel = torque / self.mass.inertia;

        SemiImplicitEuler::integrate(
            &mut self.pose,
            &mut self.twist,
            linear_accel,
            angular_accel,
            dt,
        );
        self.update_site_coords();
    }

    /// Translational plus rotational kinetic energy.
    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        self.mass.kinetic_energy(&self.twist)
    }

    /// Gravitational potential energy relative to `z = 0`.
    #[must_use]
    pub fn potential_energy(&self, gravity: f64) -> f64 {
        self.mass.mass * gravity * self.pose.z()
    }

    /// Check if the pose and velocity are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.pose.is_finite() && self.twist.is_finite()
    }
}

impl RigidBody for Body {
    fn name(&self) -> &str {
        &self.name
    }

    fn pose(&self) -> &Pose {
        &self.pose
    }

    fn sites(&self) -> &[Site] {
        &self.sites
    }

    fn sites_mut(&mut self) -> &mut [Site] {
        &mut self.sites
    }

    fn push_site(&mut self, site: Site) -> SiteId {
        self.sites.push(site);
        SiteId(self.sites.len() - 1)
    }

    fn geometry(&self) -> &[Point2<f64>] {
        &self.geometry
    }
}

/// Closed rectangle outline `[-hw, hw] × [-hh, hh]`, first vertex repeated.
#[must_use]
pub fn rectangle_outline(half_width: f64, half_height: f64) -> Vec<Point2<f64>> {
    vec![
        Point2::new(-half_width, -half_height),
        Point2::new(half_width, -half_height),
        Point2::new(half_width, half_height),
        Point2::new(-half_width, half_height),
        Point2::new(-half_width, -half_height),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn unit_body(z: f64) -> Body {
        Body::new(
            "unit",
            MassProperties::new(1.0, 1.0),
            Pose::new(0.0, z, 0.0),
            Twist::zero(),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_bad_mass() {
        let result = Body::new(
            "bad",
            MassProperties::new(0.0, 1.0),
            Pose::identity(),
            Twist::zero(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_add_site_publishes_world_offset() {
        let mut body = unit_body(0.0);
        body.set_pose(Pose::new(0.0, 0.0, FRAC_PI_2));
        let id = body.add_site("tip", 1.0, 0.0);

        let w = body.site(id).unwrap().world_offset();
        assert_relative_eq!(w.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(w.y, 1.0, epsilon = 1e-12);
        assert_eq!(body.site_by_name("tip"), Some(id));
        assert!(body.site_by_name("heel").is_none());
    }

    #[test]
    fn test_set_pose_republishes_sites() {
        let mut anchor = Anchor::new("ground", Pose::identity());
        let id = anchor.add_site("pin", 0.0, 1.0);
        anchor.set_pose(Pose::new(2.0, 0.0, FRAC_PI_2));

        let kin = anchor.site_kinematics(id).unwrap();
        assert_relative_eq!(kin.position.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(kin.position.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_free_fall_step() {
        let mut body = unit_body(1.0);
        body.integrate(0.1, 10.0);
        assert_relative_eq!(body.twist().linear.y, -1.0, epsilon = 1e-12);
        assert_relative_eq!(body.pose().z(), 0.9, epsilon = 1e-12);
    }

    #[test]
    fn test_site_force_moment_arm() {
        let mut body = unit_body(0.0);
        let right = body.add_site("right", 1.0, 0.0);
        let top = body.add_site("top", 0.0, 1.0);

        body.add_site_load(right, SiteLoad::new(0.0, 2.0, 0.0));
        body.add_site_load(top, SiteLoad::new(3.0, 0.0, 0.5));
        assert!(!body.add_site_load(SiteId(9), SiteLoad::zero()));

        let (force, torque) = body.net_load();
        assert_relative_eq!(force.x, 3.0);
        assert_relative_eq!(force.y, 2.0);
        // 1*2 - 1*3 + 0.5
        assert_relative_eq!(torque, -0.5, epsilon = 1e-12);

        body.clear_site_loads();
        let (force, torque) = body.net_load();
        assert_eq!(force, Vector2::zeros());
        assert_eq!(torque, 0.0);
    }

    #[test]
    fn test_integrate_updates_site_coords() {
        let mut body = unit_body(0.0);
        let id = body.add_site("tip", 1.0, 0.0);
        body.set_twist(Twist::new(0.0, 0.0, 10.0));
        body.integrate(0.1, 0.0);

        let w = body.site(id).unwrap().world_offset();
        assert_relative_eq!(w.x, 1.0_f64.cos(), epsilon = 1e-12);
        assert_relative_eq!(w.y, 1.0_f64.sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_geometry_world() {
        let body = unit_body(1.0).with_geometry(rectangle_outline(0.1, 0.5));
        let world = body.geometry_world();
        assert_eq!(world.len(), 5);
        assert_eq!(world[0], world[4]);
        assert_relative_eq!(world[2].y, 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_energies() {
        let mut body = unit_body(2.0);
        body.set_twist(Twist::new(1.0, 0.0, 2.0));
        assert_relative_eq!(body.kinetic_energy(), 2.5);
        assert_relative_eq!(body.potential_energy(10.0), 20.0);
        assert!(body.is_finite());
    }
}
