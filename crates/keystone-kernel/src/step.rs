use serde::{Deserialize, Serialize};
use std::fmt;

/// The eight initialization steps, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitializationStep {
    ResolveConstraints,
    VerifyGenesis,
    SeedCapabilities,
    ValidateConstraints,
    LockLedger,
    SealLedger,
    ActivatePrimaryGate,
    ActivateSecondaryGate,
}

impl InitializationStep {
    pub const ALL: [Self; 8] = [
        Self::ResolveConstraints,
        Self::VerifyGenesis,
        Self::SeedCapabilities,
        Self::ValidateConstraints,
        Self::LockLedger,
        Self::SealLedger,
        Self::ActivatePrimaryGate,
        Self::ActivateSecondaryGate,
    ];

    /// 1-based position in the sequence.
    pub fn number(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).map_or(0, |i| i + 1)
    }

    /// Stable name used in error reasons and logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::ResolveConstraints => "constraint-resolve",
            Self::VerifyGenesis => "ledger-genesis",
            Self::SeedCapabilities => "capability-seed",
            Self::ValidateConstraints => "constraint-validate",
            Self::LockLedger => "ledger-lock",
            Self::SealLedger => "ledger-seal",
            Self::ActivatePrimaryGate => "capability-activate-primary",
            Self::ActivateSecondaryGate => "capability-activate-secondary",
        }
    }
}

impl fmt::Display for InitializationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
