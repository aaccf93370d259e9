//! End-to-end: construct, initialize, audit, convert, then try to append.

use keystone_capability::CapabilityFlag;
use keystone_kernel::{InitializationStep, KernelConfig, OrchestratorError, OrchestratorState};
use keystone_ledger::{BlockKind, LedgerError, LedgerState};
use keystone_tests::{active_orchestrator, orchestrator};

#[test]
fn construct_initialize_validate_convert_append() {
    let (mut orch, _) = orchestrator(KernelConfig::default());
    assert_eq!(orch.state(), &OrchestratorState::Created);

    let report = orch.initialize().unwrap();
    assert_eq!(orch.state(), &OrchestratorState::Active);
    assert_eq!(report.completed_steps.len(), InitializationStep::ALL.len());

    let audit = orch.validate_system();
    assert!(audit.overall_valid);
    assert_eq!(audit.checks.len(), 7);

    let conversion = orch.process_constraint(75.0).unwrap();
    assert_eq!(conversion.value, 0.75);

    let err = orch.append_entry(b"after seal".to_vec()).unwrap_err();
    assert_eq!(
        err,
        OrchestratorError::Ledger(LedgerError::Locked {
            state: LedgerState::Sealed
        })
    );
}

#[test]
fn sealed_chain_shape() {
    let orch = active_orchestrator();
    let kinds: Vec<_> = orch.ledger().blocks().iter().map(|b| b.kind()).collect();
    assert_eq!(
        kinds,
        vec![BlockKind::Genesis, BlockKind::LockMarker, BlockKind::SealMarker]
    );

    let certificate = orch.ledger().certificate().unwrap();
    assert_eq!(certificate.block_count, 3);
    assert_eq!(certificate.head_hash, orch.ledger().head().hash());
    assert_eq!(orch.ledger().lock_receipt().unwrap().marker_index, 1);
}

#[test]
fn pre_initialization_entries_are_sealed_into_the_chain() {
    let (mut orch, clock) = orchestrator(KernelConfig::default());
    orch.append_entry(b"operator: alice".to_vec()).unwrap();
    clock.advance(5);
    orch.append_entry(b"policy: v3".to_vec()).unwrap();
    orch.initialize().unwrap();

    let ledger = orch.ledger();
    assert_eq!(ledger.len(), 5);
    assert_eq!(ledger.get(2).unwrap().payload(), b"policy: v3");
    let integrity = ledger.validate_integrity();
    assert!(integrity.valid);
    assert_eq!(integrity.seal_valid, Some(true));
}

#[test]
fn status_and_commands_after_activation() {
    let mut orch = active_orchestrator();
    let receipt = orch.execute_command("snapshot").unwrap();
    assert_eq!(receipt.ledger_state, LedgerState::Sealed);

    orch.evolve_capabilities().unwrap();
    orch.evolve_capabilities().unwrap();

    let status = orch.get_system_status();
    assert_eq!(status.capability_level, 2);
    assert!(status.capabilities.contains(&CapabilityFlag::AdaptivePolicy));
    assert_eq!(
        status.activated,
        vec![CapabilityFlag::CoreGovernance, CapabilityFlag::IntegrityEnforcement]
    );
    assert_eq!(status.commands_executed, 1);
    assert!(orch.validate_system().overall_valid);
}

#[test]
fn audit_report_serializes() {
    let orch = active_orchestrator();
    let json = serde_json::to_value(orch.validate_system()).unwrap();
    assert_eq!(json["overall_valid"], true);
    assert_eq!(json["checks"][3]["name"], "ledger_integrity");
}
