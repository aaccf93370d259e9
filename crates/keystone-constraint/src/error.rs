use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Conversion domain named in a range error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Domain {
    /// `0..=100`
    Percentage,
    /// `0.0..=1.0`
    Value,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percentage => write!(f, "percentage (0..=100)"),
            Self::Value => write!(f, "value (0.0..=1.0)"),
        }
    }
}

/// Errors from the constraint resolver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstraintError {
    /// Out-of-domain input. Recoverable: correct the input and retry.
    #[error("{input} is outside the {domain} range")]
    Range { domain: Domain, input: f64 },

    /// A fixed invariant could not be established. Fatal configuration error.
    #[error("constraint invariant {invariant_id} not established: {message}")]
    InvariantNotEstablished {
        invariant_id: String,
        message: String,
    },
}

/// A single invariant that does not hold for a given set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    pub invariant_id: String,
    pub message: String,
}

impl From<ConstraintViolation> for ConstraintError {
    fn from(v: ConstraintViolation) -> Self {
        Self::InvariantNotEstablished {
            invariant_id: v.invariant_id,
            message: v.message,
        }
    }
}
