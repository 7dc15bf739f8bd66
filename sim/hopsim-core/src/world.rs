//! The rigid body system: sole owner of every anchor, body, joint, and contact.

use hashbrown::HashMap;
use hopsim_constraint::{JointLimits, JointParams, JointReading, RevoluteJoint};
use hopsim_contact::{ContactParams, ContactReading, GroundContact};
use hopsim_types::{
    BodyId, BodyRef, ContactId, JointId, MassProperties, Pose, SimError, Site, SiteKinematics,
    SiteLoad, SiteRef, Twist,
};
use tracing::{debug, warn};

use crate::body::{Anchor, Body, RigidBody};

/// An articulated planar system.
///
/// Built once by appending bodies, sites, joints, and contacts, then driven
/// step by step. Joints and contacts refer to sites by [`SiteRef`] handles;
/// nothing is ever removed, so handles stay valid for the system's lifetime.
///
/// # Example
///
/// ```
/// use hopsim_core::RigidBodySystem;
/// use hopsim_constraint::{JointLimits, JointParams};
/// use hopsim_types::{BodyRef, MassProperties, Pose, Twist};
///
/// let mut system = RigidBodySystem::new("pendulum");
/// let ground = system.add_anchor("ground", Pose::new(0.0, 1.0, 0.0)).unwrap();
/// let pivot = system.add_site(ground, "pivot", 0.0, 0.0).unwrap();
///
/// let bob = system
///     .add_body("bob", MassProperties::new(1.0, 0.01), Pose::new(0.0, 0.5, 0.0), Twist::zero())
///     .unwrap();
/// let top = system.add_site(BodyRef::Body(bob), "top", 0.0, 0.5).unwrap();
///
/// system
///     .add_joint("hinge", pivot, top, JointParams::default(), JointLimits::unlimited())
///     .unwrap();
///
/// assert_eq!(system.body_count(), 1);
/// assert!(system.joint_by_name("hinge").is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RigidBodySystem {
    name: String,
    anchor: Option<Anchor>,
    bodies: Vec<Body>,
    joints: Vec<RevoluteJoint>,
    contacts: Vec<GroundContact>,
    body_names: HashMap<String, BodyId>,
    joint_names: HashMap<String, JointId>,
    contact_names: HashMap<String, ContactId>,
}

impl RigidBodySystem {
    /// Create an empty system.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// System name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of moving bodies.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Get the number of joints.
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Get the number of contacts.
    #[must_use]
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Add the system's anchor.
    ///
    /// # Errors
    ///
    /// Returns an error if the system already has an anchor.
    pub fn add_anchor(&mut self, name: impl Into<String>, pose: Pose) -> hopsim_types::Result<BodyRef> {
        if self.anchor.is_some() {
            return Err(SimError::invalid_config("system already has an anchor"));
        }
        let anchor = Anchor::new(name, pose);
        debug!(anchor = anchor.name(), x = pose.x(), z = pose.z(), p = pose.angle, "added anchor");
        self.anchor = Some(anchor);
        Ok(BodyRef::Anchor)
    }

    /// Add a moving body and return its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if mass or inertia is invalid.
    pub fn add_body(
        &mut self,
        name: impl Into<String>,
        mass: MassProperties,
        pose: Pose,
        twist: Twist,
    ) -> hopsim_types::Result<BodyId> {
        self.insert_body(Body::new(name, mass, pose, twist)?)
    }

    /// Add a pre-built body (with sites and geometry) and return its ID.
    ///
    /// Site world offsets are republished for the body's current pose.
    ///
    /// # Errors
    ///
    /// Returns an error if the body's mass properties are invalid or the
    /// name is already taken.
    pub fn insert_body(&mut self, mut body: Body) -> hopsim_types::Result<BodyId> {
        body.mass_properties().validate()?;
        unique_name(&self.body_names, "body", body.name())?;
        body.update_site_coords();

        let id = BodyId(self.bodies.len());
        debug!(
            body = body.name(),
            %id,
            mass = body.mass_properties().mass,
            "added body"
        );
        self.body_names.insert(body.name().to_string(), id);
        self.bodies.push(body);
        Ok(id)
    }

    /// Add a site to the anchor or a body.
    ///
    /// The site's world offset is published immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` does not exist.
    pub fn add_site(
        &mut self,
        body: BodyRef,
        name: &str,
        x_b: f64,
        z_b: f64,
    ) -> hopsim_types::Result<SiteRef> {
        let site = match body {
            BodyRef::Anchor => self
                .anchor
                .as_mut()
                .ok_or(SimError::MissingAnchor)?
                .add_site(name, x_b, z_b),
            BodyRef::Body(id) => self
                .bodies
                .get_mut(id.0)
                .ok_or(SimError::InvalidBodyId(id.0))?
                .add_site(name, x_b, z_b),
        };
        debug!(%body, site = name, x_b, z_b, "added site");
        Ok(SiteRef::new(body, site))
    }

    /// Add a revolute joint between two existing, posed sites.
    ///
    /// # Errors
    ///
    /// Returns an error if either site does not exist, if both sites are on
    /// the same body, if the gains or limits are invalid, or if the name is
    /// already taken.
    pub fn add_joint(
        &mut self,
        name: impl Into<String>,
        base: SiteRef,
        mate: SiteRef,
        params: JointParams,
        limits: JointLimits,
    ) -> hopsim_types::Result<JointId> {
        let name = name.into();
        unique_name(&self.joint_names, "joint", &name)?;
        let base_kin = self.site_kinematics(base)?;
        let mate_kin = self.site_kinematics(mate)?;
        let joint = RevoluteJoint::new(name, base, mate, params, limits, &base_kin, &mate_kin)?;

        let id = JointId(self.joints.len());
        debug!(
            joint = joint.name(),
            %id,
            %base,
            %mate,
            angle = joint.angle(),
            "added joint"
        );
        self.joint_names.insert(joint.name().to_string(), id);
        self.joints.push(joint);
        Ok(id)
    }

    /// Add a ground contact at an existing, posed site.
    ///
    /// # Errors
    ///
    /// Returns an error if the site does not exist, the parameters are
    /// invalid, or the name is already taken.
    pub fn add_contact(
        &mut self,
        name: impl Into<String>,
        site: SiteRef,
        params: ContactParams,
    ) -> hopsim_types::Result<ContactId> {
        let name = name.into();
        unique_name(&self.contact_names, "contact", &name)?;
        let kin = self.site_kinematics(site)?;
        let contact = GroundContact::new(name, site, params, &kin)?;

        let id = ContactId(self.contacts.len());
        debug!(contact = contact.name(), %id, %site, z = kin.position.y, "added contact");
        self.contact_names.insert(contact.name().to_string(), id);
        self.contacts.push(contact);
        Ok(id)
    }

    /// Move the anchor or a body during model construction.
    ///
    /// Site coordinates are republished and every joint and contact attached
    /// to the moved body restarts its rate estimates from the new pose, so
    /// the next step sees no damping spike from the jump.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` does not exist or `pose` is not finite.
    pub fn set_pose(&mut self, body: BodyRef, pose: Pose) -> hopsim_types::Result<()> {
        if !pose.is_finite() {
            return Err(SimError::invalid_config(format!(
                "non-finite pose for {body}"
            )));
        }
        match body {
            BodyRef::Anchor => self
                .anchor
                .as_mut()
                .ok_or(SimError::MissingAnchor)?
                .set_pose(pose),
            BodyRef::Body(id) => self
                .bodies
                .get_mut(id.0)
                .ok_or(SimError::InvalidBodyId(id.0))?
                .set_pose(pose),
        }

        let Self {
            anchor,
            bodies,
            joints,
            contacts,
            ..
        } = self;
        for joint in joints
            .iter_mut()
            .filter(|j| j.base().body == body || j.mate().body == body)
        {
            let base = kinematics(anchor.as_ref(), bodies, joint.base())?;
            let mate = kinematics(anchor.as_ref(), bodies, joint.mate())?;
            joint.reseed(&base, &mate);
        }
        for contact in contacts.iter_mut().filter(|c| c.site().body == body) {
            contact.reseed(&kinematics(anchor.as_ref(), bodies, contact.site())?);
        }
        debug!(%body, x = pose.x(), z = pose.z(), p = pose.angle, "moved");
        Ok(())
    }

    // =========================================================================
    // Access
    // =========================================================================

    /// The anchor, if any.
    #[must_use]
    pub fn anchor(&self) -> Option<&Anchor> {
        self.anchor.as_ref()
    }

    /// Get a body by ID.
    #[must_use]
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.0)
    }

    /// Get a mutable body by ID.
    ///
    /// For setting up state before a run. Moving a body here does not reseed
    /// the joints and contacts attached to it; use [`Self::set_pose`] for
    /// that.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id.0)
    }

    /// Get a body ID by name.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::BodyNotFound`] if no body has that name.
    pub fn body_by_name(&self, name: &str) -> hopsim_types::Result<BodyId> {
        self.body_names
            .get(name)
            .copied()
            .ok_or_else(|| SimError::BodyNotFound { name: name.into() })
    }

    /// Iterate over moving bodies in insertion order.
    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    /// Anchor or body behind a handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle does not resolve.
    pub fn rigid_body(&self, body: BodyRef) -> hopsim_types::Result<&dyn RigidBody> {
        resolve(self.anchor.as_ref(), &self.bodies, body)
    }

    /// Site behind a handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle does not resolve.
    pub fn site(&self, site: SiteRef) -> hopsim_types::Result<&Site> {
        self.rigid_body(site.body)?
            .site(site.site)
            .ok_or_else(|| SimError::InvalidSite {
                body: site.body.to_string(),
                site: site.site.0,
            })
    }

    /// World position, world offset, and owner angle of a site.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle does not resolve.
    pub fn site_kinematics(&self, site: SiteRef) -> hopsim_types::Result<SiteKinematics> {
        kinematics(self.anchor.as_ref(), &self.bodies, site)
    }

    /// Get a joint by ID.
    #[must_use]
    pub fn joint(&self, id: JointId) -> Option<&RevoluteJoint> {
        self.joints.get(id.0)
    }

    /// Get a joint ID by name.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::JointNotFound`] if no joint has that name.
    pub fn joint_by_name(&self, name: &str) -> hopsim_types::Result<JointId> {
        self.joint_names
            .get(name)
            .copied()
            .ok_or_else(|| SimError::JointNotFound { name: name.into() })
    }

    /// Joints in insertion order.
    #[must_use]
    pub fn joints(&self) -> &[RevoluteJoint] {
        &self.joints
    }

    /// Get a contact by ID.
    #[must_use]
    pub fn contact(&self, id: ContactId) -> Option<&GroundContact> {
        self.contacts.get(id.0)
    }

    /// Get a contact ID by name.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ContactNotFound`] if no contact has that name.
    pub fn contact_by_name(&self, name: &str) -> hopsim_types::Result<ContactId> {
        self.contact_names
            .get(name)
            .copied()
            .ok_or_else(|| SimError::ContactNotFound { name: name.into() })
    }

    /// Contacts in insertion order.
    #[must_use]
    pub fn contacts(&self) -> &[GroundContact] {
        &self.contacts
    }

    /// Angle and drive torque of every joint.
    #[must_use]
    pub fn joint_readings(&self) -> Vec<JointReading> {
        self.joints.iter().map(RevoluteJoint::reading).collect()
    }

    /// Force and state of every contact.
    #[must_use]
    pub fn contact_readings(&self) -> Vec<ContactReading> {
        self.contacts.iter().map(GroundContact::reading).collect()
    }

    // =========================================================================
    // Step phases
    // =========================================================================

    /// Zero every site load on the anchor and all bodies.
    pub fn clear_site_loads(&mut self) {
        if let Some(anchor) = self.anchor.as_mut() {
            anchor.clear_site_loads();
        }
        for body in &mut self.bodies {
            body.clear_site_loads();
        }
    }

    /// Update every contact in order and add its load to its site.
    ///
    /// # Errors
    ///
    /// Returns an error if `ground_heights` does not have one entry per
    /// contact or a contact's site does not resolve.
    pub fn apply_contacts(&mut self, dt: f64, ground_heights: &[f64]) -> hopsim_types::Result<()> {
        check_len("ground heights", self.contacts.len(), ground_heights.len())?;

        let Self {
            anchor,
            bodies,
            contacts,
            ..
        } = self;
        for (contact, &ground) in contacts.iter_mut().zip(ground_heights) {
            let kin = kinematics(anchor.as_ref(), bodies, contact.site())?;
            let load = contact.update(dt, &kin, ground);
            add_load(anchor.as_mut(), bodies, contact.site(), load)?;
        }
        Ok(())
    }

    /// Update every joint in order and add its wrench to both sites.
    ///
    /// # Errors
    ///
    /// Returns an error if `drive_torques` does not have one entry per joint
    /// or a joint's site does not resolve.
    pub fn apply_joints(&mut self, dt: f64, drive_torques: &[f64]) -> hopsim_types::Result<()> {
        check_len("drive torques", self.joints.len(), drive_torques.len())?;

        let Self {
            anchor,
            bodies,
            joints,
            ..
        } = self;
        for (joint, &tau) in joints.iter_mut().zip(drive_torques) {
            let base = kinematics(anchor.as_ref(), bodies, joint.base())?;
            let mate = kinematics(anchor.as_ref(), bodies, joint.mate())?;
            let wrench = joint.update(dt, &base, &mate, tau);
            add_load(anchor.as_mut(), bodies, joint.base(), wrench.base)?;
            add_load(anchor.as_mut(), bodies, joint.mate(), wrench.mate)?;
        }
        Ok(())
    }

    /// Integrate every moving body one step.
    pub fn integrate_bodies(&mut self, dt: f64, gravity: f64) {
        for body in &mut self.bodies {
            body.integrate(dt, gravity);
        }
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Total kinetic energy of the moving bodies.
    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        self.bodies.iter().map(Body::kinetic_energy).sum()
    }

    /// Total gravitational potential energy relative to `z = 0`.
    #[must_use]
    pub fn potential_energy(&self, gravity: f64) -> f64 {
        self.bodies.iter().map(|b| b.potential_energy(gravity)).sum()
    }

    /// Check that every body has finite state.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Diverged`] naming the first non-finite body.
    pub fn validate(&self) -> hopsim_types::Result<()> {
        for (i, body) in self.bodies.iter().enumerate() {
            if !body.is_finite() {
                warn!(body = body.name(), id = i, "non-finite body state");
                return Err(SimError::diverged(format!(
                    "body '{}' ({}) has non-finite state",
                    body.name(),
                    BodyId(i)
                )));
            }
        }
        Ok(())
    }
}

/// Input length check shared by the step phases and [`StepInput::check`].
///
/// [`StepInput::check`]: crate::StepInput::check
pub(crate) fn check_len(
    what: &'static str,
    expected: usize,
    actual: usize,
) -> hopsim_types::Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(SimError::InputMismatch {
            what,
            expected,
            actual,
        })
    }
}

fn unique_name<T>(
    names: &HashMap<String, T>,
    kind: &str,
    name: &str,
) -> hopsim_types::Result<()> {
    if names.contains_key(name) {
        Err(SimError::invalid_config(format!("duplicate {kind} name '{name}'")))
    } else {
        Ok(())
    }
}

fn resolve<'a>(
    anchor: Option<&'a Anchor>,
    bodies: &'a [Body],
    body: BodyRef,
) -> hopsim_types::Result<&'a dyn RigidBody> {
    match body {
        BodyRef::Anchor => anchor
            .map(|a| a as &dyn RigidBody)
            .ok_or(SimError::MissingAnchor),
        BodyRef::Body(id) => bodies
            .get(id.0)
            .map(|b| b as &dyn RigidBody)
            .ok_or(SimError::InvalidBodyId(id.0)),
    }
}

fn kinematics(
    anchor: Option<&Anchor>,
    bodies: &[Body],
    site: SiteRef,
) -> hopsim_types::Result<SiteKinematics> {
    resolve(anchor, bodies, site.body)?
        .site_kinematics(site.site)
        .ok_or_else(|| SimError::InvalidSite {
            body: site.body.to_string(),
            site: site.site.0,
        })
}

fn add_load(
    anchor: Option<&mut Anchor>,
    bodies: &mut [Body],
    site: SiteRef,
    load: SiteLoad,
) -> hopsim_types::Result<()> {
    let target = match site.body {
        BodyRef::Anchor => anchor
            .ok_or(SimError::MissingAnchor)?
            .sites_mut()
            .get_mut(site.site.0),
        BodyRef::Body(id) => bodies
            .get_mut(id.0)
            .ok_or(SimError::InvalidBodyId(id.0))?
            .sites_mut()
            .get_mut(site.site.0),
    };
    target
        .ok_or_else(|| SimError::InvalidSite {
            body: site.body.to_string(),
            site: site.site.0,
        })?
        .add_load(load);
    Ok(())
}
