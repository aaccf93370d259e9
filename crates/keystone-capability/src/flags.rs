use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The symbolic escalation formula. Never evaluated.
pub const ESCALATION_FORMULA: &str = "(∞↑∞)↑(∞↑∞)";

/// Named feature gates. Closed set: levels beyond the named ones contribute
/// an [`EscalationTier`](CapabilityFlag::EscalationTier) entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityFlag {
    // Baseline, seeded at level 0.
    EscalationFormula,
    CoreGovernance,
    IntegrityEnforcement,
    ConstraintResolution,
    AuditTrail,

    // Level 1..=4.
    CommandExecution,
    AdaptivePolicy,
    CrossDomainAudit,
    RecursiveEscalation,

    /// Marks that level `n` was reached.
    EscalationTier(u32),
}

impl CapabilityFlag {
    pub fn is_baseline(self) -> bool {
        matches!(
            self,
            Self::EscalationFormula
                | Self::CoreGovernance
                | Self::IntegrityEnforcement
                | Self::ConstraintResolution
                | Self::AuditTrail
        )
    }
}

impl fmt::Display for CapabilityFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EscalationFormula => write!(f, "escalation_formula"),
            Self::CoreGovernance => write!(f, "core_governance"),
            Self::IntegrityEnforcement => write!(f, "integrity_enforcement"),
            Self::ConstraintResolution => write!(f, "constraint_resolution"),
            Self::AuditTrail => write!(f, "audit_trail"),
            Self::CommandExecution => write!(f, "command_execution"),
            Self::AdaptivePolicy => write!(f, "adaptive_policy"),
            Self::CrossDomainAudit => write!(f, "cross_domain_audit"),
            Self::RecursiveEscalation => write!(f, "recursive_escalation"),
            Self::EscalationTier(n) => write!(f, "escalation_tier_{n}"),
        }
    }
}

/// Flags seeded by `initialize`.
pub fn baseline_flags() -> BTreeSet<CapabilityFlag> {
    [
        CapabilityFlag::EscalationFormula,
        CapabilityFlag::CoreGovernance,
        CapabilityFlag::IntegrityEnforcement,
        CapabilityFlag::ConstraintResolution,
        CapabilityFlag::AuditTrail,
    ]
    .into_iter()
    .collect()
}

/// Flags unlocked on reaching `level`. Level 0 is the baseline.
pub fn flags_for_level(level: u32) -> BTreeSet<CapabilityFlag> {
    if level == 0 {
        return baseline_flags();
    }

    let mut flags = BTreeSet::from([CapabilityFlag::EscalationTier(level)]);
    let named = match level {
        1 => Some(CapabilityFlag::CommandExecution),
        2 => Some(CapabilityFlag::AdaptivePolicy),
        3 => Some(CapabilityFlag::CrossDomainAudit),
        4 => Some(CapabilityFlag::RecursiveEscalation),
        _ => None,
    };
    flags.extend(named);
    flags
}
