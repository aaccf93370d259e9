#![deny(unsafe_code)]
//! # keystone-capability
//!
//! Escalation registry for the Keystone kernel.
//!
//! The registry holds an escalation level that only goes up and a set of
//! [`CapabilityFlag`]s that only grows. Each level unlocks a fixed set of
//! flags (see [`flags_for_level`]). Activation is gated on presence: a flag
//! the registry does not hold cannot be activated.
//!
//! The escalation formula `(∞↑∞)↑(∞↑∞)` is symbolic. It is represented by
//! [`CapabilityFlag::EscalationFormula`] and validated by checking that the
//! marker is present, never by computing anything.

pub mod error;
pub mod flags;
pub mod registry;

pub use error::CapabilityError;
pub use flags::{baseline_flags, flags_for_level, CapabilityFlag, ESCALATION_FORMULA};
pub use registry::{
    ActivationResult, CapabilityRegistry, EvolutionAction, EvolutionEvent, EvolutionResult,
    FormulaValidation,
};
