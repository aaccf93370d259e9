use std::fmt;

use chrono::{DateTime, Utc};
use keystone_capability::{flags_for_level, CapabilityFlag};
use keystone_ledger::LedgerState;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::KernelConfig;
use crate::orchestrator::{Orchestrator, OrchestratorState};
use crate::step::InitializationStep;

/// The seven audit checks, in report order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditCheck {
    ConstraintInvariants,
    CrossInvariantConsistency,
    PercentageRoundTrip,
    LedgerIntegrity,
    CapabilityEscalation,
    GatingActivation,
    OrchestratorState,
}

impl AuditCheck {
    pub const ALL: [Self; 7] = [
        Self::ConstraintInvariants,
        Self::CrossInvariantConsistency,
        Self::PercentageRoundTrip,
        Self::LedgerIntegrity,
        Self::CapabilityEscalation,
        Self::GatingActivation,
        Self::OrchestratorState,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::ConstraintInvariants => "constraint invariants",
            Self::CrossInvariantConsistency => "cross-invariant consistency",
            Self::PercentageRoundTrip => "percentage round trip",
            Self::LedgerIntegrity => "ledger integrity",
            Self::CapabilityEscalation => "capability escalation",
            Self::GatingActivation => "gating activation",
            Self::OrchestratorState => "orchestrator state",
        }
    }
}

impl fmt::Display for AuditCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: AuditCheck,
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    fn pass(name: AuditCheck, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: true,
            detail: detail.into(),
        }
    }

    fn fail(name: AuditCheck, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: false,
            detail: detail.into(),
        }
    }

    fn from_failures(name: AuditCheck, ok_detail: impl Into<String>, failures: Vec<String>) -> Self {
        if failures.is_empty() {
            Self::pass(name, ok_detail)
        } else {
            Self::fail(name, failures.join("; "))
        }
    }
}

/// Fresh on every validation call; not persisted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditReport {
    pub id: Uuid,
    pub orchestrator_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub checks: Vec<CheckResult>,
    pub overall_valid: bool,
}

impl AuditReport {
    pub fn passed(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed)
    }

    pub fn check(&self, name: AuditCheck) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// Re-checks every invariant of an orchestrator. Read-only.
#[derive(Clone, Debug)]
pub struct AuditValidator {
    samples: Vec<f64>,
    gating_flags: [CapabilityFlag; 2],
}

impl AuditValidator {
    pub fn from_config(config: &KernelConfig) -> Self {
        Self {
            samples: config.round_trip_samples.clone(),
            gating_flags: config.gating_flags,
        }
    }

    /// Run all seven checks. Always returns a report.
    pub fn run_comprehensive_validation(&self, orchestrator: &Orchestrator) -> AuditReport {
        let checks: Vec<CheckResult> = AuditCheck::ALL
            .iter()
            .map(|check| self.run_check(*check, orchestrator))
            .collect();

        for failed in checks.iter().filter(|c| !c.passed) {
            warn!(check = %failed.name, detail = %failed.detail, "Audit check failed");
        }

        let overall_valid = checks.iter().all(|c| c.passed);
        info!(
            orchestrator = %orchestrator.id(),
            overall_valid,
            "Audit complete"
        );

        AuditReport {
            id: Uuid::new_v4(),
            orchestrator_id: orchestrator.id(),
            generated_at: Utc::now(),
            checks,
            overall_valid,
        }
    }

    fn run_check(&self, check: AuditCheck, orch: &Orchestrator) -> CheckResult {
        match check {
            AuditCheck::ConstraintInvariants => constraint_invariants(orch),
            AuditCheck::CrossInvariantConsistency => cross_invariant_consistency(orch),
            AuditCheck::PercentageRoundTrip => self.round_trip(orch),
            AuditCheck::LedgerIntegrity => ledger_integrity(orch),
            AuditCheck::CapabilityEscalation => capability_escalation(orch),
            AuditCheck::GatingActivation => self.gating_activation(orch),
            AuditCheck::OrchestratorState => orchestrator_state(orch),
        }
    }

    fn round_trip(&self, orch: &Orchestrator) -> CheckResult {
        let resolver = orch.resolver();
        let failures: Vec<String> = self
            .samples
            .iter()
            .filter_map(|&p| {
                let back = resolver
                    .percentage_to_value(p)
                    .and_then(|v| resolver.value_to_percentage(v));
                match back {
                    Ok(back) if back == p => None,
                    Ok(back) => Some(format!("{p} came back as {back}")),
                    Err(err) => Some(format!("{p}: {err}")),
                }
            })
            .collect();

        CheckResult::from_failures(
            AuditCheck::PercentageRoundTrip,
            format!("{} samples round-trip exactly", self.samples.len()),
            failures,
        )
    }

    fn gating_activation(&self, orch: &Orchestrator) -> CheckResult {
        let failures: Vec<String> = self
            .gating_flags
            .iter()
            .filter(|flag| !orch.registry().is_activated(**flag))
            .map(|flag| format!("{flag} not activated"))
            .collect();
        CheckResult::from_failures(
            AuditCheck::GatingActivation,
            format!("{} and {} active", self.gating_flags[0], self.gating_flags[1]),
            failures,
        )
    }
}

fn constraint_invariants(orch: &Orchestrator) -> CheckResult {
    let set = orch.constraints();
    let mut failures = Vec::new();
    if set.max().value != 1.0 {
        failures.push(format!("max value is {}", set.max().value));
    }
    if set.min().value != 0.0 {
        failures.push(format!("min value is {}", set.min().value));
    }
    if !set.unbounded_resolved() {
        failures.push("unbounded sentinel unresolved".to_string());
    }
    CheckResult::from_failures(
        AuditCheck::ConstraintInvariants,
        "bounds fixed at [0.0, 1.0], sentinel resolved",
        failures,
    )
}

fn cross_invariant_consistency(orch: &Orchestrator) -> CheckResult {
    let result = orch.resolver().validate_consistency(orch.constraints());
    if result.valid {
        CheckResult::pass(
            AuditCheck::CrossInvariantConsistency,
            format!("{} invariants hold", result.checks.len()),
        )
    } else {
        let failed: Vec<_> = result
            .checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| format!("{}: {}", c.invariant_id, c.detail))
            .collect();
        CheckResult::fail(AuditCheck::CrossInvariantConsistency, failed.join("; "))
    }
}

fn ledger_integrity(orch: &Orchestrator) -> CheckResult {
    let ledger = orch.ledger();
    let mut failures = Vec::new();
    if ledger.state() != LedgerState::Sealed {
        failures.push(format!("ledger is {}", ledger.state()));
    }
    if ledger.lock_receipt().is_none() {
        failures.push("no lock receipt".to_string());
    }

    let integrity = ledger.validate_integrity();
    if !integrity.valid {
        let at = integrity
            .violating_index
            .map_or_else(String::new, |i| format!(" at block {i}"));
        let reason = integrity.reason.as_deref().unwrap_or("chain invalid");
        failures.push(format!("{reason}{at}"));
    }
    if integrity.seal_valid != Some(true) {
        failures.push("seal certificate missing or does not match".to_string());
    }

    CheckResult::from_failures(
        AuditCheck::LedgerIntegrity,
        format!("{} blocks locked, sealed and intact", ledger.len()),
        failures,
    )
}

fn capability_escalation(orch: &Orchestrator) -> CheckResult {
    let registry = orch.registry();
    let mut failures = Vec::new();

    let formula = registry.validate_formula();
    if !formula.valid {
        failures.push(format!("formula {}: {}", formula.formula, formula.detail));
    }
    let missing: Vec<String> = (0..=registry.level())
        .flat_map(flags_for_level)
        .filter(|f| !registry.has(*f))
        .map(|f| f.to_string())
        .collect();
    if !missing.is_empty() {
        failures.push(format!("missing flags: {}", missing.join(", ")));
    }
    let history = registry.history();
    if history.windows(2).any(|w| w[1].new_level < w[0].new_level) {
        failures.push("escalation level decreased".to_string());
    }

    CheckResult::from_failures(
        AuditCheck::CapabilityEscalation,
        format!(
            "level {}, {} flags, formula marker present",
            registry.level(),
            registry.capabilities().len()
        ),
        failures,
    )
}

fn orchestrator_state(orch: &Orchestrator) -> CheckResult {
    let mut failures = Vec::new();
    if orch.state() != &OrchestratorState::Active {
        failures.push(format!("state is {}", orch.state()));
    }
    let done = orch.completed_steps().len();
    if done != InitializationStep::ALL.len() {
        failures.push(format!(
            "{done} of {} initialization steps completed",
            InitializationStep::ALL.len()
        ));
    }
    CheckResult::from_failures(
        AuditCheck::OrchestratorState,
        "active, all initialization steps completed",
        failures,
    )
}
