use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::CapabilityError;
use crate::flags::{baseline_flags, flags_for_level, CapabilityFlag, ESCALATION_FORMULA};

/// What a history entry records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "flag", rename_all = "snake_case")]
pub enum EvolutionAction {
    Initialized,
    Evolved,
    Activated(CapabilityFlag),
    ActivationDenied(CapabilityFlag),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionEvent {
    pub timestamp: DateTime<Utc>,
    pub previous_level: u32,
    pub new_level: u32,
    pub added_flags: Vec<CapabilityFlag>,
    pub action: EvolutionAction,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationResult {
    pub level: u32,
    /// Flags seeded (initialize) or activated (activate).
    pub flags: Vec<CapabilityFlag>,
    pub activated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionResult {
    pub previous_level: u32,
    pub new_level: u32,
    pub new_flags: Vec<CapabilityFlag>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaValidation {
    pub valid: bool,
    pub formula: String,
    pub detail: String,
}

/// Escalation registry.
///
/// `level` never decreases and `capabilities` never shrinks. Every mutating
/// call, including a denied activation, appends one [`EvolutionEvent`].
#[derive(Clone, Debug, Default)]
pub struct CapabilityRegistry {
    level: u32,
    capabilities: BTreeSet<CapabilityFlag>,
    activated: BTreeSet<CapabilityFlag>,
    history: Vec<EvolutionEvent>,
    initialized: bool,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the baseline flags at level 0.
    pub fn initialize(&mut self) -> Result<ActivationResult, CapabilityError> {
        if self.initialized {
            return Err(CapabilityError::AlreadyInitialized);
        }

        let seeded: Vec<_> = baseline_flags().into_iter().collect();
        self.capabilities.extend(seeded.iter().copied());
        self.initialized = true;
        let event = self.record(self.level, seeded.clone(), EvolutionAction::Initialized);

        info!(
            level = self.level,
            flags = seeded.len(),
            "Capability registry initialized"
        );

        Ok(ActivationResult {
            level: self.level,
            flags: seeded,
            activated_at: event,
        })
    }

    /// Raise the level by one and add the flags that level unlocks.
    pub fn evolve(&mut self) -> Result<EvolutionResult, CapabilityError> {
        if !self.initialized {
            return Err(CapabilityError::NotInitialized);
        }

        let previous_level = self.level;
        let new_level = previous_level
            .checked_add(1)
            .ok_or(CapabilityError::LevelCeiling {
                level: previous_level,
            })?;
        let new_flags: Vec<_> = flags_for_level(new_level)
            .into_iter()
            .filter(|f| !self.capabilities.contains(f))
            .collect();

        self.level = new_level;
        self.capabilities.extend(new_flags.iter().copied());
        self.record(previous_level, new_flags.clone(), EvolutionAction::Evolved);

        info!(
            previous_level,
            new_level,
            added = new_flags.len(),
            "Capability level evolved"
        );

        Ok(EvolutionResult {
            previous_level,
            new_level,
            new_flags,
        })
    }

    /// Activate a held flag. Activating an already-active flag succeeds again.
    pub fn activate(&mut self, flag: CapabilityFlag) -> Result<ActivationResult, CapabilityError> {
        if !self.capabilities.contains(&flag) {
            self.record(self.level, Vec::new(), EvolutionAction::ActivationDenied(flag));
            warn!(%flag, level = self.level, "Capability activation denied");
            return Err(CapabilityError::NotAvailable { flag });
        }

        let first = self.activated.insert(flag);
        let at = self.record(self.level, Vec::new(), EvolutionAction::Activated(flag));
        debug!(%flag, first, "Capability activated");

        Ok(ActivationResult {
            level: self.level,
            flags: vec![flag],
            activated_at: at,
        })
    }

    /// Structural check: the formula marker must be held. Read-only.
    pub fn validate_formula(&self) -> FormulaValidation {
        let valid = self.capabilities.contains(&CapabilityFlag::EscalationFormula);
        let detail = if valid {
            format!("formula marker present at level {}", self.level)
        } else if !self.initialized {
            "registry not initialized".to_string()
        } else {
            "formula marker missing".to_string()
        };

        FormulaValidation {
            valid,
            formula: ESCALATION_FORMULA.to_string(),
            detail,
        }
    }

    fn record(
        &mut self,
        previous_level: u32,
        added_flags: Vec<CapabilityFlag>,
        action: EvolutionAction,
    ) -> DateTime<Utc> {
        let timestamp = Utc::now();
        self.history.push(EvolutionEvent {
            timestamp,
            previous_level,
            new_level: self.level,
            added_flags,
            action,
        });
        timestamp
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn capabilities(&self) -> &BTreeSet<CapabilityFlag> {
        &self.capabilities
    }

    pub fn has(&self, flag: CapabilityFlag) -> bool {
        self.capabilities.contains(&flag)
    }

    pub fn is_activated(&self, flag: CapabilityFlag) -> bool {
        self.activated.contains(&flag)
    }

    pub fn activated(&self) -> &BTreeSet<CapabilityFlag> {
        &self.activated
    }

    pub fn history(&self) -> &[EvolutionEvent] {
        &self.history
    }
}
