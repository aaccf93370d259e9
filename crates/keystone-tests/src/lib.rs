//! Shared fixtures for the Keystone cross-crate test suites.

use std::sync::Arc;

use keystone_capability::CapabilityFlag;
use keystone_kernel::{KernelConfig, Orchestrator};
use keystone_types::ManualClock;

/// Fixed start time so ledger timestamps are reproducible.
pub const EPOCH_MS: u64 = 1_700_000_000_000;

/// Orchestrator on a manual clock, not yet initialized.
pub fn orchestrator(config: KernelConfig) -> (Orchestrator, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(EPOCH_MS));
    let orch = match Orchestrator::with_clock(config, clock.clone()) {
        Ok(orch) => orch,
        Err(err) => panic!("fixture config rejected: {err}"),
    };
    (orch, clock)
}

/// Default-configured orchestrator that completed initialization.
pub fn active_orchestrator() -> Orchestrator {
    let (mut orch, _) = orchestrator(KernelConfig::default());
    if let Err(err) = orch.initialize() {
        panic!("default initialization failed: {err}");
    }
    orch
}

/// Config whose second gate is not part of the baseline, so step 8 fails.
pub fn unavailable_gate_config() -> KernelConfig {
    KernelConfig {
        gating_flags: [
            CapabilityFlag::CoreGovernance,
            CapabilityFlag::RecursiveEscalation,
        ],
        ..KernelConfig::default()
    }
}
