use keystone_capability::CapabilityError;
use keystone_constraint::ConstraintError;
use keystone_ledger::LedgerError;
use thiserror::Error;

use crate::step::InitializationStep;

/// Why a single initialization step failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepError {
    #[error(transparent)]
    Constraint(#[from] ConstraintError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Capability(#[from] CapabilityError),

    /// A component reported success but its state does not check out.
    #[error("{0}")]
    Inconsistent(String),
}

/// Rejected kernel configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("round_trip_samples must not be empty")]
    NoSamples,

    #[error("round-trip sample {0} is outside 0..=100")]
    SampleOutOfRange(f64),

    /// The sample carries more precision than a round trip preserves.
    #[error("round-trip sample {sample} comes back as {returned}")]
    SampleNotRepresentable { sample: f64, returned: f64 },

    #[error("gating flags must be distinct, both are {0}")]
    DuplicateGatingFlag(String),

    #[error("max_command_log must be at least 1")]
    ZeroCommandLog,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrchestratorError {
    #[error("orchestrator is not active (state: {state})")]
    NotActive { state: String },

    #[error("orchestrator already initialized")]
    AlreadyInitialized,

    /// Initialization failed earlier; the instance is unusable.
    #[error("orchestrator faulted: {0}")]
    Faulted(String),

    #[error("{step}: {source}")]
    StepFailed {
        step: InitializationStep,
        #[source]
        source: StepError,
    },

    #[error("constraint error: {0}")]
    Constraint(#[from] ConstraintError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("capability error: {0}")]
    Capability(#[from] CapabilityError),

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
