//! Telemetry trackers.
//!
//! Trackers read joint and contact state after each step and keep a time
//! series. They never mutate the system.

use hopsim_constraint::JointReading;
use hopsim_contact::ContactReading;
use hopsim_types::{ContactId, JointId, SimError};

use crate::world::RigidBodySystem;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One timestamped reading.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sample<T> {
    /// Simulation time (s).
    pub time: f64,
    /// Reading at that time.
    pub reading: T,
}

/// Records angle and drive torque of one joint.
#[derive(Debug, Clone)]
pub struct JointTracker {
    joint: JointId,
    samples: Vec<Sample<JointReading>>,
}

impl JointTracker {
    /// Track `joint`.
    #[must_use]
    pub fn new(joint: JointId) -> Self {
        Self {
            joint,
            samples: Vec::new(),
        }
    }

    /// Tracked joint.
    #[must_use]
    pub fn joint(&self) -> JointId {
        self.joint
    }

    /// Append the joint's current reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the joint does not exist in `system`.
    pub fn record(&mut self, system: &RigidBodySystem, time: f64) -> hopsim_types::Result<()> {
        let joint = system
            .joint(self.joint)
            .ok_or(SimError::InvalidJointId(self.joint.0))?;
        self.samples.push(Sample {
            time,
            reading: joint.reading(),
        });
        Ok(())
    }

    /// Recorded samples.
    #[must_use]
    pub fn samples(&self) -> &[Sample<JointReading>] {
        &self.samples
    }

    /// Recorded angles.
    pub fn angles(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.reading.angle)
    }
}

/// Records ground reaction and friction state of one contact.
#[derive(Debug, Clone)]
pub struct ContactTracker {
    contact: ContactId,
    samples: Vec<Sample<ContactReading>>,
}

impl ContactTracker {
    /// Track `contact`.
    #[must_use]
    pub fn new(contact: ContactId) -> Self {
        Self {
            contact,
            samples: Vec::new(),
        }
    }

    /// Tracked contact.
    #[must_use]
    pub fn contact(&self) -> ContactId {
        self.contact
    }

    /// Append the contact's current reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the contact does not exist in `system`.
    pub fn record(&mut self, system: &RigidBodySystem, time: f64) -> hopsim_types::Result<()> {
        let contact = system
            .contact(self.contact)
            .ok_or(SimError::InvalidContactId(self.contact.0))?;
        self.samples.push(Sample {
            time,
            reading: contact.reading(),
        });
        Ok(())
    }

    /// Recorded samples.
    #[must_use]
    pub fn samples(&self) -> &[Sample<ContactReading>] {
        &self.samples
    }

    /// Samples taken while in contact.
    pub fn stance(&self) -> impl Iterator<Item = &Sample<ContactReading>> + '_ {
        self.samples.iter().filter(|s| s.reading.in_contact)
    }

    /// Number of touch-downs (out-of-contact to in-contact edges).
    #[must_use]
    pub fn touchdowns(&self) -> usize {
        self.samples
            .windows(2)
            .filter(|w| !w[0].reading.in_contact && w[1].reading.in_contact)
            .count()
    }

    /// Largest vertical reaction seen (N).
    #[must_use]
    pub fn peak_normal_force(&self) -> f64 {
        self.samples
            .iter()
            .map(|s| s.reading.force.y)
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::stepper::{StepInput, Stepper};
    use hopsim_contact::ContactParams;
    use hopsim_types::{BodyRef, MassProperties, Pose, SimulationConfig, Twist};

    #[test]
    fn test_missing_ids() {
        let system = RigidBodySystem::new("empty");
        assert_eq!(
            JointTracker::new(JointId(0)).record(&system, 0.0).unwrap_err(),
            SimError::InvalidJointId(0)
        );
        assert_eq!(
            ContactTracker::new(ContactId(2)).record(&system, 0.0).unwrap_err(),
            SimError::InvalidContactId(2)
        );
    }

    #[test]
    fn test_contact_tracker_counts_touchdown() {
        let mut system = RigidBodySystem::new("drop");
        let id = system
            .add_body("ball", MassProperties::new(1.0, 0.01), Pose::new(0.0, 0.01, 0.0), Twist::zero())
            .unwrap();
        let site = system.add_site(BodyRef::Body(id), "bottom", 0.0, 0.0).unwrap();
        let contact = system
            .add_contact("ground", site, ContactParams::foot())
            .unwrap();

        let mut tracker = ContactTracker::new(contact);
        let mut stepper = Stepper::new(SimulationConfig::default()).unwrap();
        let input = StepInput::passive(&system);
        tracker.record(&system, 0.0).unwrap();
        for _ in 0..1000 {
            let report = stepper.step(&mut system, &input).unwrap();
            tracker.record(&system, report.time).unwrap();
        }

        assert_eq!(tracker.samples().len(), 1001);
        assert!(tracker.touchdowns() >= 1);
        assert!(tracker.peak_normal_force() > 0.0);
        assert!(tracker.stance().count() > 0);
    }
}
