//! A concurrent host funnels every ledger mutation through one mutex.

use std::sync::Arc;
use std::thread;

use keystone_ledger::{IntegrityLedger, LedgerError, LedgerState, SharedLedger};
use keystone_types::ManualClock;

#[test]
fn writers_racing_a_sealer_never_break_the_chain() {
    let clock = Arc::new(ManualClock::new(0));
    let shared = SharedLedger::new(IntegrityLedger::with_clock(clock, 3));

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let handle = shared.clone();
            thread::spawn(move || {
                let mut accepted = 0usize;
                for n in 0..50 {
                    match handle.append(format!("{w}:{n}").into_bytes()) {
                        Ok(_) => accepted += 1,
                        Err(LedgerError::Locked { .. }) => break,
                        Err(other) => panic!("unexpected {other}"),
                    }
                }
                accepted
            })
        })
        .collect();

    let sealer = {
        let handle = shared.clone();
        thread::spawn(move || {
            handle.lock().unwrap();
            handle.seal().unwrap()
        })
    };

    let accepted: usize = writers.into_iter().map(|w| w.join().unwrap()).sum();
    let certificate = sealer.join().unwrap();

    assert_eq!(shared.state().unwrap(), LedgerState::Sealed);
    assert_eq!(shared.len().unwrap(), 1 + accepted + 2);
    assert_eq!(certificate.block_count as usize, shared.len().unwrap());

    let integrity = shared.validate_integrity().unwrap();
    assert!(integrity.valid);
    assert_eq!(integrity.seal_valid, Some(true));
}
