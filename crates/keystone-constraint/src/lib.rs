#![deny(unsafe_code)]
//! # keystone-constraint
//!
//! Global numeric invariants for the Keystone kernel.
//!
//! Two bounds are fixed: the normalized domain runs from `0.0` (0 %) to
//! `1.0` (100 %). One open-ended sentinel records that the unbounded
//! case was resolved at initialization. The resolver establishes the set,
//! re-derives every invariant on demand, and converts between the
//! percentage and normalized-value domains.

pub mod error;
pub mod invariants;
pub mod resolver;
pub mod set;

pub use error::{ConstraintError, ConstraintViolation, Domain};
pub use invariants::{
    BoundOrderingInvariant, ConstraintInvariant, LowerBoundInvariant, PercentageAlignmentInvariant,
    UnboundedSentinelInvariant, UpperBoundInvariant,
};
pub use resolver::{ConstraintCheck, ConstraintResolver, ValidationResult};
pub use set::{Bound, ConstraintSet};
