//! Error types for simulation operations.

use thiserror::Error;

/// Errors that can occur while building or stepping a rigid body system.
///
/// Numerical failure (an over-stiff penalty spring blowing up) is not an error
/// raised by the step itself; it only surfaces as [`SimError::Diverged`] when
/// the caller asks for validation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// Invalid body ID referenced.
    #[error("invalid body ID: {0}")]
    InvalidBodyId(usize),

    /// The anchor was referenced but the system has none.
    #[error("system has no anchor")]
    MissingAnchor,

    /// Invalid site referenced on an existing body.
    #[error("invalid site {site} on {body}")]
    InvalidSite {
        /// Display form of the owning body handle.
        body: String,
        /// The offending site index.
        site: usize,
    },

    /// Invalid joint ID referenced.
    #[error("invalid joint ID: {0}")]
    InvalidJointId(usize),

    /// Invalid contact ID referenced.
    #[error("invalid contact ID: {0}")]
    InvalidContactId(usize),

    /// Invalid timestep.
    #[error("invalid timestep: {0} (must be positive and finite)")]
    InvalidTimestep(f64),

    /// Invalid mass properties.
    #[error("invalid mass properties: {reason}")]
    InvalidMassProperties {
        /// Description of what's wrong.
        reason: String,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// Step input does not match the system layout.
    #[error("step input mismatch: expected {expected} {what}, got {actual}")]
    InputMismatch {
        /// Which input vector is wrong.
        what: &'static str,
        /// Length required by the system.
        expected: usize,
        /// Length supplied.
        actual: usize,
    },

    /// Simulation diverged (`NaN` or `Inf` detected).
    #[error("simulation diverged: {reason}")]
    Diverged {
        /// Description of what went wrong.
        reason: String,
    },

    /// Body not found by name.
    #[error("body not found: {name}")]
    BodyNotFound {
        /// Name of the missing body.
        name: String,
    },

    /// Joint not found by name.
    #[error("joint not found: {name}")]
    JointNotFound {
        /// Name of the missing joint.
        name: String,
    },

    /// Contact not found by name.
    #[error("contact not found: {name}")]
    ContactNotFound {
        /// Name of the missing contact.
        name: String,
    },
}

impl SimError {
    /// Create a diverged error.
    #[must_use]
    pub fn diverged(reason: impl Into<String>) -> Self {
        Self::Diverged {
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create an invalid mass properties error.
    #[must_use]
    pub fn invalid_mass(reason: impl Into<String>) -> Self {
        Self::InvalidMassProperties {
            reason: reason.into(),
        }
    }

    /// Check if this is a divergence error.
    #[must_use]
    pub fn is_diverged(&self) -> bool {
        matches!(self, Self::Diverged { .. })
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. }
                | Self::InvalidTimestep(_)
                | Self::InvalidMassProperties { .. }
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SimError::InvalidBodyId(42);
        assert!(err.to_string().contains("42"));

        let err = SimError::InputMismatch {
            what: "drive torques",
            expected: 3,
            actual: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("drive torques"));
        assert!(msg.contains('3'));

        let err = SimError::diverged("NaN in velocity");
        assert!(err.to_string().contains("NaN"));
    }

    #[test]
    fn test_error_predicates() {
        let err = SimError::diverged("test");
        assert!(err.is_diverged());
        assert!(!err.is_config_error());

        let err = SimError::invalid_config("bad value");
        assert!(err.is_config_error());
        assert!(!err.is_diverged());

        assert!(SimError::InvalidTimestep(0.0).is_config_error());
        assert!(SimError::invalid_mass("zero").is_config_error());
    }
}
