//! Editing a sealed block through the test hooks is always detected.

use keystone_kernel::AuditCheck;
use keystone_ledger::{IntegrityLedger, LedgerState};
use keystone_tests::active_orchestrator;

fn sealed_with_entries(n: usize) -> IntegrityLedger {
    let mut ledger = IntegrityLedger::new();
    for i in 0..n {
        ledger.append(format!("entry-{i}").into_bytes()).unwrap();
    }
    ledger.lock().unwrap();
    ledger.seal().unwrap();
    ledger
}

#[test]
fn payload_edit_breaks_chain_and_seal() {
    let mut ledger = sealed_with_entries(3);
    assert!(ledger.tamper_payload(2, |p| p[0] = b'X'));

    let result = ledger.validate_integrity();
    assert!(!result.valid);
    assert_eq!(result.violating_index, Some(2));
    assert_eq!(result.seal_valid, Some(false));
    assert_eq!(ledger.state(), LedgerState::Sealed);
}

#[test]
fn earliest_of_several_edits_is_reported() {
    let mut ledger = sealed_with_entries(4);
    assert!(ledger.tamper_payload(4, |p| p.push(b'!')));
    assert!(ledger.tamper_payload(2, |p| p.push(b'!')));

    let original = ledger.get(2).unwrap().hash();
    assert_ne!(original, ledger.get(2).unwrap().recompute_hash());

    let result = ledger.validate_integrity();
    assert!(!result.valid);
    assert_eq!(result.violating_index, Some(2));
    assert_eq!(result.seal_valid, Some(false));
}

#[test]
fn tampered_seal_marker_is_caught() {
    let mut ledger = sealed_with_entries(1);
    let last = ledger.len() as u64 - 1;
    assert!(ledger.tamper_payload(last, |p| p.clear()));
    let result = ledger.validate_integrity();
    assert!(!result.valid);
    assert_eq!(result.violating_index, Some(last));
}

#[test]
fn orchestrator_audit_flags_tampering() {
    let mut orch = active_orchestrator();
    assert!(orch.ledger_mut().tamper_payload(1, |p| p.push(b' ')));

    let report = orch.validate_system();
    assert!(!report.overall_valid);
    let ledger_check = report.check(AuditCheck::LedgerIntegrity).unwrap();
    assert!(!ledger_check.passed);
    assert!(ledger_check.detail.contains("at block 1"));
}
