#![deny(unsafe_code)]
//! # keystone-kernel
//!
//! The [`Orchestrator`] owns one constraint set, one integrity ledger and
//! one capability registry. [`Orchestrator::initialize`] drives them through
//! eight fixed steps and freezes in `Error` on the first failure. The
//! [`AuditValidator`] re-checks everything afterwards without mutating it.
//!
//! ```text
//! Created ──initialize()──▶ Initializing ──▶ Active
//!                                       └──▶ Error(reason)
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod report;
pub mod step;

pub use audit::{AuditCheck, AuditReport, AuditValidator, CheckResult};
pub use config::KernelConfig;
pub use error::{ConfigError, OrchestratorError, StepError};
pub use metrics::KernelMetrics;
pub use orchestrator::{Orchestrator, OrchestratorState};
pub use report::{CommandReceipt, ConversionResult, InitializationReport, SystemStatus};
pub use step::InitializationStep;
