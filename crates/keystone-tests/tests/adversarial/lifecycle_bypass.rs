//! The ledger and orchestrator lifecycles only move forward.

use keystone_kernel::{KernelConfig, OrchestratorError};
use keystone_ledger::{IntegrityLedger, LedgerError, LedgerState, SealError};
use keystone_tests::{active_orchestrator, orchestrator};

#[test]
fn lock_twice_keeps_locked() {
    let mut ledger = IntegrityLedger::new();
    ledger.lock().unwrap();
    let len = ledger.len();
    assert_eq!(
        ledger.lock().unwrap_err(),
        LedgerError::AlreadyLocked {
            state: LedgerState::Locked
        }
    );
    assert_eq!(ledger.state(), LedgerState::Locked);
    assert_eq!(ledger.len(), len);
}

#[test]
fn seal_ordering_is_enforced() {
    let mut ledger = IntegrityLedger::new();
    assert_eq!(ledger.seal().unwrap_err(), LedgerError::Seal(SealError::NotLocked));
    ledger.lock().unwrap();
    ledger.seal().unwrap();
    assert_eq!(
        ledger.seal().unwrap_err(),
        LedgerError::Seal(SealError::AlreadySealed)
    );
    assert!(matches!(
        ledger.append(b"late".to_vec()),
        Err(LedgerError::Locked { .. })
    ));
    assert!(matches!(
        ledger.append_json(&"late"),
        Err(LedgerError::Locked { .. })
    ));
}

#[test]
fn reinitialize_active_orchestrator_is_rejected() {
    let mut orch = active_orchestrator();
    let seal = orch.ledger().certificate().cloned();
    assert_eq!(orch.initialize().unwrap_err(), OrchestratorError::AlreadyInitialized);
    assert_eq!(orch.ledger().certificate().cloned(), seal);
}

#[test]
fn operations_before_initialize_are_not_active() {
    let (mut orch, _) = orchestrator(KernelConfig::default());
    assert!(matches!(
        orch.process_constraint(50.0),
        Err(OrchestratorError::NotActive { .. })
    ));
    assert!(matches!(
        orch.execute_command("status"),
        Err(OrchestratorError::NotActive { .. })
    ));
    assert_eq!(orch.metrics().commands_rejected, 1);
}

#[test]
fn conversion_rejects_out_of_range_and_non_finite() {
    let mut orch = active_orchestrator();
    for bad in [-1.0, 101.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            orch.process_constraint(bad),
            Err(OrchestratorError::Constraint(_))
        ));
    }
    assert_eq!(orch.metrics().conversions_failed, 4);
}
