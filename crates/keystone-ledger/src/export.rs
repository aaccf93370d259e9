use serde::{Deserialize, Serialize};

use crate::block::{Block, BlockKind};
use crate::integrity::{verify_chain, IntegrityResult};
use crate::ledger::{LedgerState, LockReceipt, SealCertificate};

pub const EXPORT_FORMAT_VERSION: u32 = 1;

struct LifecycleMismatch {
    index: Option<u64>,
    reason: String,
}

impl LifecycleMismatch {
    fn new(index: Option<u64>, reason: impl Into<String>) -> Self {
        Self {
            index,
            reason: reason.into(),
        }
    }
}

/// Detached copy of a ledger, verifiable without the original instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerExport {
    pub format_version: u32,
    pub state: LedgerState,
    pub blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_receipt: Option<LockReceipt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<SealCertificate>,
}

impl LedgerExport {
    pub(crate) fn new(
        state: LedgerState,
        blocks: Vec<Block>,
        lock_receipt: Option<LockReceipt>,
        certificate: Option<SealCertificate>,
    ) -> Self {
        Self {
            format_version: EXPORT_FORMAT_VERSION,
            state,
            blocks,
            lock_receipt,
            certificate,
        }
    }

    /// Same chain rules as the live ledger, plus agreement between the
    /// declared state, the marker blocks, the receipt and the certificate.
    pub fn verify(&self) -> IntegrityResult {
        let mut result = verify_chain(&self.blocks, self.certificate.as_ref());
        if !result.valid {
            return result;
        }

        if let Err(mismatch) = self.check_lifecycle() {
            result.valid = false;
            result.violating_index = mismatch.index;
            result.reason = Some(mismatch.reason);
        }
        result
    }

    fn check_lifecycle(&self) -> Result<(), LifecycleMismatch> {
        if self.format_version != EXPORT_FORMAT_VERSION {
            return Err(LifecycleMismatch::new(
                None,
                format!("unsupported export format version {}", self.format_version),
            ));
        }

        let markers: Vec<&Block> = self.blocks.iter().filter(|b| b.kind.is_marker()).collect();
        let len = self.blocks.len();

        match self.state {
            LedgerState::Open => {
                if let Some(marker) = markers.first() {
                    return Err(LifecycleMismatch::new(
                        Some(marker.index),
                        "open ledger contains a lifecycle marker",
                    ));
                }
                if self.lock_receipt.is_some() {
                    return Err(LifecycleMismatch::new(None, "open ledger carries a lock receipt"));
                }
                if self.certificate.is_some() {
                    return Err(LifecycleMismatch::new(
                        None,
                        "open ledger carries a seal certificate",
                    ));
                }
            }
            LedgerState::Locked => {
                let lock = self.marker_at(len.checked_sub(1), BlockKind::LockMarker)?;
                if markers.len() != 1 {
                    return Err(LifecycleMismatch::new(
                        Some(lock.index),
                        "locked ledger must hold exactly one marker, at its tail",
                    ));
                }
                self.check_receipt(lock)?;
                if self.certificate.is_some() {
                    return Err(LifecycleMismatch::new(
                        None,
                        "locked ledger carries a seal certificate",
                    ));
                }
            }
            LedgerState::Sealed => {
                let lock = self.marker_at(len.checked_sub(2), BlockKind::LockMarker)?;
                let seal = self.marker_at(len.checked_sub(1), BlockKind::SealMarker)?;
                if markers.len() != 2 {
                    return Err(LifecycleMismatch::new(
                        Some(lock.index),
                        "sealed ledger must end with exactly one lock and one seal marker",
                    ));
                }
                self.check_receipt(lock)?;
                let Some(cert) = &self.certificate else {
                    return Err(LifecycleMismatch::new(
                        None,
                        "sealed ledger is missing its seal certificate",
                    ));
                };
                if cert.head_hash != seal.hash {
                    return Err(LifecycleMismatch::new(
                        Some(seal.index),
                        "certificate head hash does not match the seal marker",
                    ));
                }
            }
        }
        Ok(())
    }

    fn marker_at(
        &self,
        position: Option<usize>,
        kind: BlockKind,
    ) -> Result<&Block, LifecycleMismatch> {
        match position.and_then(|p| self.blocks.get(p)) {
            Some(block) if block.kind == kind => Ok(block),
            Some(block) => Err(LifecycleMismatch::new(
                Some(block.index),
                format!("expected {kind} at index {}", block.index),
            )),
            None => Err(LifecycleMismatch::new(
                None,
                format!("chain too short to hold a {kind}"),
            )),
        }
    }

    fn check_receipt(&self, lock: &Block) -> Result<(), LifecycleMismatch> {
        let Some(receipt) = &self.lock_receipt else {
            return Err(LifecycleMismatch::new(
                Some(lock.index),
                "lock marker has no lock receipt",
            ));
        };
        if receipt.marker_index != lock.index
            || receipt.marker_hash != lock.hash
            || receipt.block_count != lock.index + 1
        {
            return Err(LifecycleMismatch::new(
                Some(lock.index),
                "lock receipt does not match the lock marker",
            ));
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
