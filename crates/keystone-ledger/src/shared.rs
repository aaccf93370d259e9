use std::sync::{Arc, Mutex, MutexGuard};

use crate::block::Block;
use crate::error::LedgerError;
use crate::integrity::IntegrityResult;
use crate::ledger::{IntegrityLedger, LedgerState, LockReceipt, SealCertificate};

/// Thread-safe handle to one ledger.
///
/// Every operation goes through the same mutex, so "read tail, build block,
/// publish" for `append` and the `lock`/`seal` transitions form one linear
/// history.
#[derive(Clone, Debug)]
pub struct SharedLedger {
    inner: Arc<Mutex<IntegrityLedger>>,
}

impl SharedLedger {
    pub fn new(ledger: IntegrityLedger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    fn guard(&self) -> Result<MutexGuard<'_, IntegrityLedger>, LedgerError> {
        self.inner.lock().map_err(|_| LedgerError::Poisoned)
    }

    pub fn append(&self, payload: impl Into<Vec<u8>>) -> Result<Block, LedgerError> {
        self.guard()?.append(payload)
    }

    pub fn lock(&self) -> Result<LockReceipt, LedgerError> {
        self.guard()?.lock()
    }

    pub fn seal(&self) -> Result<SealCertificate, LedgerError> {
        self.guard()?.seal()
    }

    pub fn validate_integrity(&self) -> Result<IntegrityResult, LedgerError> {
        Ok(self.guard()?.validate_integrity())
    }

    pub fn state(&self) -> Result<LedgerState, LedgerError> {
        Ok(self.guard()?.state())
    }

    pub fn len(&self) -> Result<usize, LedgerError> {
        Ok(self.guard()?.len())
    }

    /// Run `f` against the ledger while holding the lock.
    pub fn with<R>(&self, f: impl FnOnce(&IntegrityLedger) -> R) -> Result<R, LedgerError> {
        let guard = self.guard()?;
        Ok(f(&guard))
    }

    /// Take the ledger back once no other handle remains.
    pub fn into_inner(self) -> Result<IntegrityLedger, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex.into_inner().map_err(|poisoned| Self {
                inner: Arc::new(Mutex::new(poisoned.into_inner())),
            }),
            Err(inner) => Err(Self { inner }),
        }
    }
}

impl From<IntegrityLedger> for SharedLedger {
    fn from(ledger: IntegrityLedger) -> Self {
        Self::new(ledger)
    }
}
