//! A failing step freezes the orchestrator in Error with the step named.

use keystone_capability::{CapabilityError, CapabilityFlag};
use keystone_kernel::{AuditCheck, OrchestratorError, OrchestratorState, StepError};
use keystone_ledger::LedgerState;
use keystone_tests::{orchestrator, unavailable_gate_config};

#[test]
fn unavailable_gate_aborts_at_step_eight() {
    let (mut orch, _) = orchestrator(unavailable_gate_config());
    let err = orch.initialize().unwrap_err();

    let OrchestratorError::StepFailed { step, source } = &err else {
        panic!("unexpected error {err:?}");
    };
    assert_eq!(step.number(), 8);
    assert_eq!(
        source,
        &StepError::Capability(CapabilityError::NotAvailable {
            flag: CapabilityFlag::RecursiveEscalation
        })
    );
    assert_eq!(orch.state(), &OrchestratorState::Error(err.to_string()));
}

#[test]
fn error_state_is_terminal() {
    let (mut orch, _) = orchestrator(unavailable_gate_config());
    let first = orch.initialize().unwrap_err();

    assert_eq!(
        orch.initialize().unwrap_err(),
        OrchestratorError::Faulted(first.to_string())
    );
    assert!(matches!(
        orch.process_constraint(10.0),
        Err(OrchestratorError::NotActive { .. })
    ));
    assert!(matches!(
        orch.execute_command("anything"),
        Err(OrchestratorError::NotActive { .. })
    ));
    assert!(orch.evolve_capabilities().is_err());
}

#[test]
fn earlier_steps_are_not_rolled_back() {
    let (mut orch, _) = orchestrator(unavailable_gate_config());
    orch.initialize().unwrap_err();

    assert_eq!(orch.ledger().state(), LedgerState::Sealed);
    assert!(orch.registry().is_activated(CapabilityFlag::CoreGovernance));
    assert!(orch.constraints().unbounded_resolved());
}

#[test]
fn audit_of_faulted_instance_reports_instead_of_failing() {
    let (mut orch, _) = orchestrator(unavailable_gate_config());
    orch.initialize().unwrap_err();

    let report = orch.validate_system();
    assert!(!report.overall_valid);
    let failed: Vec<_> = report.failures().map(|c| c.name).collect();
    assert_eq!(
        failed,
        vec![AuditCheck::GatingActivation, AuditCheck::OrchestratorState]
    );
}
