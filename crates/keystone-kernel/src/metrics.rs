use serde::{Deserialize, Serialize};

/// Counters kept by the orchestrator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelMetrics {
    pub initialization_attempts: u64,
    pub steps_completed: u64,
    pub commands_executed: u64,
    pub commands_rejected: u64,
    pub conversions_ok: u64,
    pub conversions_failed: u64,
    pub ledger_appends: u64,
    pub evolutions: u64,
}

impl KernelMetrics {
    pub fn record_conversion(&mut self, ok: bool) {
        if ok {
            self.conversions_ok += 1;
        } else {
            self.conversions_failed += 1;
        }
    }

    pub fn record_command(&mut self, accepted: bool) {
        if accepted {
            self.commands_executed += 1;
        } else {
            self.commands_rejected += 1;
        }
    }

    pub fn conversion_success_rate(&self) -> f64 {
        let total = self.conversions_ok + self.conversions_failed;
        if total == 0 {
            return 1.0;
        }
        self.conversions_ok as f64 / total as f64
    }
}
