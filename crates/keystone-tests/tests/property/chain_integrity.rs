//! Appends keep the chain valid; any single flipped byte is located.

use keystone_ledger::IntegrityLedger;
use proptest::prelude::*;

fn payloads() -> impl Strategy<Value = Vec<Vec<u8>>> {
    proptest::collection::vec(proptest::collection::vec(any::<u8>(), 1..48), 1..24)
}

proptest! {
    #[test]
    fn open_and_sealed_chains_validate(entries in payloads()) {
        let mut ledger = IntegrityLedger::new();
        for entry in &entries {
            ledger.append(entry.clone()).unwrap();
            prop_assert!(ledger.validate_integrity().valid);
        }
        ledger.lock().unwrap();
        ledger.seal().unwrap();
        let result = ledger.validate_integrity();
        prop_assert!(result.valid);
        prop_assert_eq!(result.seal_valid, Some(true));
        prop_assert_eq!(ledger.len(), entries.len() + 3);
    }

    #[test]
    fn flipped_byte_after_seal_is_located(
        entries in payloads(),
        pick in any::<prop::sample::Index>(),
        byte in any::<prop::sample::Index>(),
        mask in 1u8..=255,
    ) {
        let mut ledger = IntegrityLedger::new();
        for entry in &entries {
            ledger.append(entry.clone()).unwrap();
        }
        ledger.lock().unwrap();
        ledger.seal().unwrap();

        let target = pick.index(entries.len()) as u64 + 1;
        let hit = ledger.tamper_payload(target, |p| {
            let i = byte.index(p.len());
            p[i] ^= mask;
        });
        prop_assert!(hit);

        let result = ledger.validate_integrity();
        prop_assert!(!result.valid);
        prop_assert_eq!(result.violating_index, Some(target));
        prop_assert_eq!(result.seal_valid, Some(false));
    }
}
