use std::fmt;
use std::sync::Arc;

use keystone_types::{Clock, ContentHash, SystemClock, TemporalAnchor};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::block::{Block, BlockKind};
use crate::error::{LedgerError, SealError};
use crate::export::LedgerExport;
use crate::integrity::{compute_seal_hash, verify_chain, IntegrityResult};

/// Lifecycle state. Transitions only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerState {
    Open,
    Locked,
    Sealed,
}

impl LedgerState {
    pub fn is_open(self) -> bool {
        self == Self::Open
    }
}

impl fmt::Display for LedgerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Locked => write!(f, "locked"),
            Self::Sealed => write!(f, "sealed"),
        }
    }
}

/// Digest used for block and seal hashes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashAlgorithm {
    Blake3V1,
}

/// Issued by [`IntegrityLedger::lock`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockReceipt {
    pub locked_at: TemporalAnchor,
    pub marker_index: u64,
    pub marker_hash: ContentHash,
    /// Blocks in the chain including the lock marker.
    pub block_count: u64,
}

/// Proof that the chain was final at `sealed_at`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealCertificate {
    pub seal_hash: ContentHash,
    pub sealed_at: TemporalAnchor,
    pub block_count: u64,
    pub head_hash: ContentHash,
    pub algorithm: HashAlgorithm,
}

#[derive(Serialize)]
struct MarkerPayload<'a> {
    event: &'a str,
    preceding_blocks: u64,
    head_hash: ContentHash,
}

/// Append-only, hash-linked ledger.
///
/// Owns its blocks exclusively. Mutating operations take `&mut self`; hosts
/// that share a ledger across threads go through [`SharedLedger`](crate::SharedLedger).
pub struct IntegrityLedger {
    blocks: Vec<Block>,
    state: LedgerState,
    lock_receipt: Option<LockReceipt>,
    certificate: Option<SealCertificate>,
    clock: Arc<dyn Clock>,
    node_id: u16,
}

impl IntegrityLedger {
    /// New open ledger on the wall clock, already holding its genesis block.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock), 0)
    }

    pub fn with_clock(clock: Arc<dyn Clock>, node_id: u16) -> Self {
        let mut ledger = Self {
            blocks: Vec::new(),
            state: LedgerState::Open,
            lock_receipt: None,
            certificate: None,
            clock,
            node_id,
        };
        let genesis = ledger.create_genesis();
        info!(hash = %genesis.hash.short(), node_id, "Ledger genesis created");
        ledger
    }

    /// Re-hydrate a ledger from an export. The export must verify.
    pub fn from_export(
        export: LedgerExport,
        clock: Arc<dyn Clock>,
        node_id: u16,
    ) -> Result<Self, LedgerError> {
        let check = export.verify();
        if !check.valid {
            return Err(LedgerError::IntegrityViolation {
                index: check.violating_index.unwrap_or(0),
                reason: check.reason.unwrap_or_else(|| "export failed verification".into()),
            });
        }
        Ok(Self {
            blocks: export.blocks,
            state: export.state,
            lock_receipt: export.lock_receipt,
            certificate: export.certificate,
            clock,
            node_id,
        })
    }

    fn create_genesis(&mut self) -> Block {
        let payload = serde_json::json!({ "event": "genesis", "node_id": self.node_id });
        let timestamp = TemporalAnchor::new(self.clock.now_ms(), 0, self.node_id);
        let genesis = Block::new(
            0,
            timestamp,
            BlockKind::Genesis,
            payload.to_string().into_bytes(),
            ContentHash::zero(),
        );
        self.blocks.push(genesis.clone());
        genesis
    }

    /// Tail of the chain. There is always at least the genesis block.
    fn tail(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    fn next_block(&self, kind: BlockKind, payload: Vec<u8>) -> Block {
        let tail = self.tail();
        let timestamp = tail.timestamp.advance(self.clock.now_ms(), self.node_id);
        Block::new(tail.index + 1, timestamp, kind, payload, tail.hash)
    }

    fn marker_payload(&self, event: &str) -> Result<Vec<u8>, LedgerError> {
        serde_json::to_vec(&MarkerPayload {
            event,
            preceding_blocks: self.blocks.len() as u64,
            head_hash: self.tail().hash,
        })
        .map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    /// Append opaque bytes. Only an open ledger accepts data.
    pub fn append(&mut self, payload: impl Into<Vec<u8>>) -> Result<Block, LedgerError> {
        if !self.state.is_open() {
            return Err(LedgerError::Locked { state: self.state });
        }
        let block = self.next_block(BlockKind::Data, payload.into());
        debug!(index = block.index, hash = %block.hash.short(), "Block appended");
        self.blocks.push(block.clone());
        Ok(block)
    }

    /// Append a JSON-encoded value.
    pub fn append_json<T: Serialize>(&mut self, value: &T) -> Result<Block, LedgerError> {
        if !self.state.is_open() {
            return Err(LedgerError::Locked { state: self.state });
        }
        let payload =
            serde_json::to_vec(value).map_err(|e| LedgerError::Serialization(e.to_string()))?;
        self.append(payload)
    }

    /// Open → Locked. A repeat call fails and leaves the state untouched.
    pub fn lock(&mut self) -> Result<LockReceipt, LedgerError> {
        if !self.state.is_open() {
            return Err(LedgerError::AlreadyLocked { state: self.state });
        }
        let payload = self.marker_payload("lock")?;
        let marker = self.next_block(BlockKind::LockMarker, payload);
        let receipt = LockReceipt {
            locked_at: marker.timestamp,
            marker_index: marker.index,
            marker_hash: marker.hash,
            block_count: marker.index + 1,
        };
        self.blocks.push(marker);
        self.state = LedgerState::Locked;
        self.lock_receipt = Some(receipt.clone());

        info!(
            marker_index = receipt.marker_index,
            blocks = receipt.block_count,
            "Ledger locked"
        );
        Ok(receipt)
    }

    /// Locked → Sealed. Appends the seal marker, then certifies the final chain.
    pub fn seal(&mut self) -> Result<SealCertificate, LedgerError> {
        match self.state {
            LedgerState::Open => return Err(SealError::NotLocked.into()),
            LedgerState::Sealed => return Err(SealError::AlreadySealed.into()),
            LedgerState::Locked => {}
        }

        let payload = self.marker_payload("seal")?;
        let marker = self.next_block(BlockKind::SealMarker, payload);
        self.blocks.push(marker);

        let seal_hash = match compute_seal_hash(&self.blocks) {
            Ok(hash) => hash,
            Err(e) => {
                self.blocks.pop();
                return Err(e);
            }
        };

        let tail = self.tail();
        let certificate = SealCertificate {
            seal_hash,
            sealed_at: tail.timestamp,
            block_count: self.blocks.len() as u64,
            head_hash: tail.hash,
            algorithm: HashAlgorithm::Blake3V1,
        };
        self.state = LedgerState::Sealed;
        self.certificate = Some(certificate.clone());

        info!(
            seal = %certificate.seal_hash.short(),
            blocks = certificate.block_count,
            "Ledger sealed"
        );
        Ok(certificate)
    }

    /// Verify links, hashes and (when sealed) the seal certificate.
    pub fn validate_integrity(&self) -> IntegrityResult {
        let mut result = verify_chain(&self.blocks, self.certificate.as_ref());
        if self.state == LedgerState::Sealed && self.certificate.is_none() {
            result.valid = false;
            result.seal_valid = Some(false);
            result.reason.get_or_insert_with(|| "sealed ledger has no certificate".into());
        }
        result
    }

    pub fn export(&self) -> LedgerExport {
        LedgerExport::new(
            self.state,
            self.blocks.clone(),
            self.lock_receipt.clone(),
            self.certificate.clone(),
        )
    }

    pub fn state(&self) -> LedgerState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Never true: a ledger always holds its genesis block.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn get(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get(i))
    }

    pub fn genesis(&self) -> &Block {
        &self.blocks[0]
    }

    pub fn head(&self) -> &Block {
        self.tail()
    }

    pub fn lock_receipt(&self) -> Option<&LockReceipt> {
        self.lock_receipt.as_ref()
    }

    pub fn certificate(&self) -> Option<&SealCertificate> {
        self.certificate.as_ref()
    }

    pub fn node_id(&self) -> u16 {
        self.node_id
    }

    /// Mutate a stored payload in place, bypassing every guard.
    #[cfg(any(test, feature = "test-hooks"))]
    pub fn tamper_payload(&mut self, index: u64, mutate: impl FnOnce(&mut Vec<u8>)) -> bool {
        match usize::try_from(index).ok().and_then(|i| self.blocks.get_mut(i)) {
            Some(block) => {
                mutate(&mut block.payload);
                true
            }
            None => false,
        }
    }

    /// Mutate any field of a stored block in place, bypassing every guard.
    #[cfg(any(test, feature = "test-hooks"))]
    pub fn tamper_block(&mut self, index: u64, mutate: impl FnOnce(&mut Block)) -> bool {
        match usize::try_from(index).ok().and_then(|i| self.blocks.get_mut(i)) {
            Some(block) => {
                mutate(block);
                true
            }
            None => false,
        }
    }
}

impl Default for IntegrityLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IntegrityLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrityLedger")
            .field("state", &self.state)
            .field("blocks", &self.blocks.len())
            .field("head", &self.tail().hash)
            .field("node_id", &self.node_id)
            .finish()
    }
}
