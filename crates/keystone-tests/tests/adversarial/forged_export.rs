//! Offline verification rejects snapshots that were edited after export.

use std::sync::Arc;

use keystone_ledger::{
    verify_chain, Block, HashAlgorithm, IntegrityLedger, LedgerError, LedgerExport, LedgerState,
    LockReceipt, SealCertificate, SEAL_HASH_DOMAIN,
};
use keystone_tests::active_orchestrator;
use keystone_types::{ContentHash, ManualClock};

fn sealed_export() -> LedgerExport {
    active_orchestrator().ledger().export()
}

#[test]
fn untouched_snapshot_verifies_after_json() {
    let json = sealed_export().to_json_pretty().unwrap();
    let export = LedgerExport::from_json(&json).unwrap();
    let result = export.verify();
    assert!(result.valid);
    assert_eq!(result.seal_valid, Some(true));
}

#[test]
fn replaced_certificate_hash_fails_seal() {
    let mut export = sealed_export();
    if let Some(cert) = export.certificate.as_mut() {
        cert.seal_hash = ContentHash::hash(b"forged");
    }
    let result = export.verify();
    assert!(!result.valid);
    assert_eq!(result.seal_valid, Some(false));
}

#[test]
fn truncated_chain_fails() {
    let mut export = sealed_export();
    export.blocks.pop();
    assert!(!export.verify().valid);
}

#[test]
fn reopened_snapshot_is_rejected() {
    let mut export = sealed_export();
    export.state = LedgerState::Open;
    export.certificate = None;
    export.lock_receipt = None;
    assert!(!export.verify().valid);

    let err = IntegrityLedger::from_export(export, Arc::new(ManualClock::new(0)), 0).unwrap_err();
    assert!(matches!(err, LedgerError::IntegrityViolation { .. }));
}

#[test]
fn json_edit_of_a_payload_is_located() {
    let mut value = serde_json::to_value(sealed_export()).unwrap();
    value["blocks"][0]["payload"][0] = serde_json::json!(b'[');
    let export: LedgerExport = serde_json::from_value(value).unwrap();
    let result = export.verify();
    assert!(!result.valid);
    assert_eq!(result.violating_index, Some(0));
}

/// Open ledger with `data` entries, one block relabelled as `kind` and the
/// chain rehashed so every link and block hash checks out.
fn relabelled_chain(data: &[&str], at: usize, kind: &str) -> LedgerExport {
    let mut ledger = IntegrityLedger::with_clock(Arc::new(ManualClock::new(10)), 3);
    for entry in data {
        ledger.append(entry.as_bytes().to_vec()).unwrap();
    }
    let mut value = serde_json::to_value(ledger.export()).unwrap();
    value["blocks"][at]["kind"] = serde_json::json!(kind);

    let mut previous = ContentHash::zero();
    for i in 0..ledger.len() {
        value["blocks"][i]["previous_hash"] = serde_json::to_value(previous).unwrap();
        let block: Block = serde_json::from_value(value["blocks"][i].clone()).unwrap();
        previous = block.recompute_hash();
        value["blocks"][i]["hash"] = serde_json::to_value(previous).unwrap();
    }
    serde_json::from_value(value).unwrap()
}

#[test]
fn data_after_lock_marker_is_rejected() {
    let mut export = relabelled_chain(&["a", "b"], 1, "LockMarker");
    assert!(verify_chain(&export.blocks, None).valid);

    let lock = export.blocks[1].clone();
    export.state = LedgerState::Locked;
    export.lock_receipt = Some(LockReceipt {
        locked_at: lock.timestamp(),
        marker_index: lock.index(),
        marker_hash: lock.hash(),
        block_count: lock.index() + 1,
    });

    let result = export.verify();
    assert!(!result.valid);
    assert_eq!(result.violating_index, Some(2));

    let err = IntegrityLedger::from_export(export, Arc::new(ManualClock::new(0)), 0).unwrap_err();
    assert!(matches!(err, LedgerError::IntegrityViolation { index: 2, .. }));
}

#[test]
fn sealed_snapshot_without_lock_marker_is_rejected() {
    let mut export = relabelled_chain(&["a"], 1, "SealMarker");
    let tail = export.blocks[1].clone();
    let encoded = serde_json::to_vec(&export.blocks).unwrap();
    export.state = LedgerState::Sealed;
    export.certificate = Some(SealCertificate {
        seal_hash: ContentHash::hash_with_domain(SEAL_HASH_DOMAIN, &encoded),
        sealed_at: tail.timestamp(),
        block_count: 2,
        head_hash: tail.hash(),
        algorithm: HashAlgorithm::Blake3V1,
    });

    let result = export.verify();
    assert_eq!(result.seal_valid, Some(true));
    assert!(!result.valid);
    assert_eq!(result.violating_index, Some(0));
}

#[test]
fn receipt_pointing_elsewhere_is_rejected() {
    let mut export = sealed_export();
    if let Some(receipt) = export.lock_receipt.as_mut() {
        receipt.marker_index -= 1;
    }
    let result = export.verify();
    assert!(!result.valid);
    assert!(result.reason.unwrap().contains("lock receipt"));
}

#[test]
fn certificate_head_must_be_the_seal_marker() {
    let mut export = sealed_export();
    if let Some(cert) = export.certificate.as_mut() {
        cert.head_hash = export.blocks[0].hash();
    }
    let result = export.verify();
    assert_eq!(result.seal_valid, Some(true));
    assert!(!result.valid);
    assert!(result.reason.unwrap().contains("head hash"));
}
