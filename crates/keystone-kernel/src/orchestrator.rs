use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use keystone_capability::{CapabilityRegistry, EvolutionResult};
use keystone_constraint::{ConstraintResolver, ConstraintSet};
use keystone_ledger::{Block, BlockKind, IntegrityLedger, LedgerState};
use keystone_types::{Clock, ContentHash, SystemClock};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::audit::{AuditReport, AuditValidator};
use crate::config::KernelConfig;
use crate::error::{OrchestratorError, StepError};
use crate::metrics::KernelMetrics;
use crate::report::{CommandReceipt, ConversionResult, InitializationReport, SystemStatus};
use crate::step::InitializationStep;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum OrchestratorState {
    Created,
    Initializing,
    Active,
    /// Terminal. Holds `"<step>: <detail>"` of the first failure.
    Error(String),
}

impl OrchestratorState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Initializing => write!(f, "initializing"),
            Self::Active => write!(f, "active"),
            Self::Error(reason) => write!(f, "error: {reason}"),
        }
    }
}

/// Owns the constraint set, the ledger and the capability registry for its
/// whole lifetime.
pub struct Orchestrator {
    id: Uuid,
    config: KernelConfig,
    state: OrchestratorState,
    resolver: ConstraintResolver,
    constraints: ConstraintSet,
    ledger: IntegrityLedger,
    registry: CapabilityRegistry,
    completed_steps: Vec<InitializationStep>,
    command_log: VecDeque<CommandReceipt>,
    command_sequence: u64,
    metrics: KernelMetrics,
}

impl Orchestrator {
    pub fn new(config: KernelConfig) -> Result<Self, OrchestratorError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build with an explicit ledger clock.
    pub fn with_clock(config: KernelConfig, clock: Arc<dyn Clock>) -> Result<Self, OrchestratorError> {
        config.validate()?;
        let ledger = IntegrityLedger::with_clock(clock, config.node_id);
        let id = Uuid::new_v4();
        debug!(%id, node_id = config.node_id, "Orchestrator created");

        Ok(Self {
            id,
            config,
            state: OrchestratorState::Created,
            resolver: ConstraintResolver::new(),
            constraints: ConstraintSet::unresolved(),
            ledger,
            registry: CapabilityRegistry::new(),
            completed_steps: Vec::new(),
            command_log: VecDeque::new(),
            command_sequence: 0,
            metrics: KernelMetrics::default(),
        })
    }

    /// Run the eight initialization steps. Stops at the first failure and
    /// leaves the instance in `Error`; nothing is rolled back.
    pub fn initialize(&mut self) -> Result<InitializationReport, OrchestratorError> {
        match &self.state {
            OrchestratorState::Created => {}
            OrchestratorState::Error(reason) => {
                return Err(OrchestratorError::Faulted(reason.clone()))
            }
            OrchestratorState::Initializing | OrchestratorState::Active => {
                return Err(OrchestratorError::AlreadyInitialized)
            }
        }

        let started_at = Utc::now();
        self.metrics.initialization_attempts += 1;
        self.state = OrchestratorState::Initializing;
        info!(id = %self.id, "Initialization started");

        for step in InitializationStep::ALL {
            if let Err(source) = self.run_step(step) {
                return Err(self.abort(step, source));
            }
            self.completed_steps.push(step);
            self.metrics.steps_completed += 1;
            debug!(step = %step, number = step.number(), "Initialization step complete");
        }

        let Some(certificate) = self.ledger.certificate().cloned() else {
            return Err(self.abort(
                InitializationStep::SealLedger,
                StepError::Inconsistent("ledger sealed without a certificate".into()),
            ));
        };
        self.state = OrchestratorState::Active;
        info!(
            id = %self.id,
            seal = %certificate.seal_hash.short(),
            "Orchestrator active"
        );

        Ok(InitializationReport {
            orchestrator_id: self.id,
            completed_steps: self.completed_steps.clone(),
            certificate,
            capability_level: self.registry.level(),
            activated_flags: self.registry.activated().iter().copied().collect(),
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Freeze the instance in `Error` with the failing step's reason.
    fn abort(&mut self, step: InitializationStep, source: StepError) -> OrchestratorError {
        let err = OrchestratorError::StepFailed { step, source };
        error!(step = %step, number = step.number(), error = %err, "Initialization aborted");
        self.state = OrchestratorState::Error(err.to_string());
        err
    }

    fn run_step(&mut self, step: InitializationStep) -> Result<(), StepError> {
        match step {
            InitializationStep::ResolveConstraints => {
                self.constraints = self.resolver.initialize()?;
            }
            InitializationStep::VerifyGenesis => self.verify_genesis()?,
            InitializationStep::SeedCapabilities => {
                self.registry.initialize()?;
            }
            InitializationStep::ValidateConstraints => {
                let result = self.resolver.validate_consistency(&self.constraints);
                if !result.valid {
                    return Err(StepError::Inconsistent(format!(
                        "{} constraint check(s) failed",
                        result.error_count
                    )));
                }
            }
            InitializationStep::LockLedger => {
                self.ledger.lock()?;
            }
            InitializationStep::SealLedger => {
                self.ledger.seal()?;
            }
            InitializationStep::ActivatePrimaryGate => {
                self.registry.activate(self.config.gating_flags[0])?;
            }
            InitializationStep::ActivateSecondaryGate => {
                self.registry.activate(self.config.gating_flags[1])?;
            }
        }
        Ok(())
    }

    /// The ledger creates its genesis block on construction; this step only
    /// confirms it.
    fn verify_genesis(&self) -> Result<(), StepError> {
        let genesis = self.ledger.genesis();
        if genesis.kind() != BlockKind::Genesis
            || genesis.index() != 0
            || !genesis.previous_hash().is_zero()
        {
            return Err(StepError::Inconsistent("malformed genesis block".into()));
        }
        let integrity = self.ledger.validate_integrity();
        if !integrity.valid {
            return Err(StepError::Inconsistent(
                integrity
                    .reason
                    .unwrap_or_else(|| "ledger integrity check failed".into()),
            ));
        }
        Ok(())
    }

    fn require_active(&self) -> Result<(), OrchestratorError> {
        if self.state.is_active() {
            Ok(())
        } else {
            Err(OrchestratorError::NotActive {
                state: self.state.to_string(),
            })
        }
    }

    /// Convert a percentage to a normalized value.
    pub fn process_constraint(&mut self, percentage: f64) -> Result<ConversionResult, OrchestratorError> {
        self.require_active()?;
        match self.resolver.percentage_to_value(percentage) {
            Ok(value) => {
                self.metrics.record_conversion(true);
                Ok(ConversionResult { percentage, value })
            }
            Err(err) => {
                self.metrics.record_conversion(false);
                debug!(percentage, error = %err, "Conversion rejected");
                Err(err.into())
            }
        }
    }

    /// Audited pass-through. Leaves the ledger and registry untouched.
    pub fn execute_command(&mut self, command: &str) -> Result<CommandReceipt, OrchestratorError> {
        if let Err(err) = self.require_active() {
            self.metrics.record_command(false);
            return Err(err);
        }
        let command = command.trim();
        if command.is_empty() {
            self.metrics.record_command(false);
            return Err(OrchestratorError::InvalidCommand("empty command".into()));
        }

        self.command_sequence += 1;
        let receipt = CommandReceipt {
            id: Uuid::new_v4(),
            sequence: self.command_sequence,
            command: command.to_string(),
            digest: ContentHash::hash(command.as_bytes()),
            capability_level: self.registry.level(),
            ledger_state: self.ledger.state(),
            executed_at: Utc::now(),
        };

        if self.command_log.len() == self.config.max_command_log {
            self.command_log.pop_front();
        }
        self.command_log.push_back(receipt.clone());
        self.metrics.record_command(true);
        info!(
            sequence = receipt.sequence,
            digest = %receipt.digest.short(),
            "Command executed"
        );
        Ok(receipt)
    }

    /// Append to the ledger. Only succeeds while the ledger is still open,
    /// which after a successful `initialize` it never is.
    pub fn append_entry(&mut self, payload: impl Into<Vec<u8>>) -> Result<Block, OrchestratorError> {
        let block = self.ledger.append(payload).map_err(|err| {
            warn!(error = %err, "Ledger append rejected");
            OrchestratorError::from(err)
        })?;
        self.metrics.ledger_appends += 1;
        Ok(block)
    }

    pub fn evolve_capabilities(&mut self) -> Result<EvolutionResult, OrchestratorError> {
        self.require_active()?;
        let result = self.registry.evolve()?;
        self.metrics.evolutions += 1;
        Ok(result)
    }

    pub fn get_system_status(&self) -> SystemStatus {
        SystemStatus {
            orchestrator_id: self.id,
            state: self.state.clone(),
            node_id: self.config.node_id,
            unbounded_resolved: self.constraints.unbounded_resolved(),
            constraint_span: self.constraints.span_percentage(),
            ledger_state: self.ledger.state(),
            ledger_blocks: self.ledger.len(),
            head_hash: self.ledger.head().hash(),
            seal_hash: self.ledger.certificate().map(|c| c.seal_hash),
            capability_level: self.registry.level(),
            capabilities: self.registry.capabilities().iter().copied().collect(),
            activated: self.registry.activated().iter().copied().collect(),
            commands_executed: self.metrics.commands_executed,
            generated_at: Utc::now(),
        }
    }

    /// Full audit. Never fails and never mutates.
    pub fn validate_system(&self) -> AuditReport {
        AuditValidator::from_config(&self.config).run_comprehensive_validation(self)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &OrchestratorState {
        &self.state
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn resolver(&self) -> &ConstraintResolver {
        &self.resolver
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    pub fn ledger(&self) -> &IntegrityLedger {
        &self.ledger
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn completed_steps(&self) -> &[InitializationStep] {
        &self.completed_steps
    }

    pub fn command_log(&self) -> impl ExactSizeIterator<Item = &CommandReceipt> {
        self.command_log.iter()
    }

    pub fn metrics(&self) -> &KernelMetrics {
        &self.metrics
    }

    pub fn ledger_state(&self) -> LedgerState {
        self.ledger.state()
    }

    #[cfg(any(test, feature = "test-hooks"))]
    pub fn ledger_mut(&mut self) -> &mut IntegrityLedger {
        &mut self.ledger
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("ledger", &self.ledger)
            .field("capability_level", &self.registry.level())
            .finish_non_exhaustive()
    }
}
