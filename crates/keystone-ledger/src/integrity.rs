use keystone_types::ContentHash;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::block::{Block, BlockKind};
use crate::error::LedgerError;
use crate::ledger::SealCertificate;

/// Domain prefix for the chain-wide seal digest.
pub const SEAL_HASH_DOMAIN: &[u8] = b"keystone-ledger-seal-v1:";

/// Outcome of a chain walk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityResult {
    pub valid: bool,
    /// First block that broke a link, hash, or ordering rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violating_index: Option<u64>,
    /// `None` while the ledger is unsealed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seal_valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl IntegrityResult {
    fn violation(index: u64, reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            violating_index: Some(index),
            seal_valid: None,
            reason: Some(reason.into()),
        }
    }
}

/// Digest over the deterministic JSON encoding of `blocks`.
pub(crate) fn compute_seal_hash(blocks: &[Block]) -> Result<ContentHash, LedgerError> {
    let encoded =
        serde_json::to_vec(blocks).map_err(|e| LedgerError::Serialization(e.to_string()))?;
    Ok(ContentHash::hash_with_domain(SEAL_HASH_DOMAIN, &encoded))
}

/// Walk `blocks` and, when a certificate is present, recheck the seal.
///
/// The walk stops at the first broken block. The seal is always rechecked so
/// a tampered sealed ledger reports both `valid = false` and
/// `seal_valid = Some(false)`.
pub fn verify_chain(blocks: &[Block], certificate: Option<&SealCertificate>) -> IntegrityResult {
    let mut result = walk(blocks);

    if let Some(cert) = certificate {
        let seal_valid = match compute_seal_hash(blocks) {
            Ok(hash) => hash == cert.seal_hash && cert.block_count == blocks.len() as u64,
            Err(_) => false,
        };
        if !seal_valid {
            warn!(seal = %cert.seal_hash.short(), "Seal certificate no longer matches chain");
            result.valid = false;
            if result.reason.is_none() {
                result.reason = Some("seal hash mismatch".into());
            }
        }
        result.seal_valid = Some(seal_valid);
    }

    result
}

fn walk(blocks: &[Block]) -> IntegrityResult {
    let Some(genesis) = blocks.first() else {
        return IntegrityResult {
            valid: false,
            violating_index: None,
            seal_valid: None,
            reason: Some("chain has no genesis block".into()),
        };
    };
    if genesis.kind != BlockKind::Genesis {
        return IntegrityResult::violation(0, "first block is not a genesis block");
    }

    for (position, block) in blocks.iter().enumerate() {
        let expected_index = position as u64;
        if block.index != expected_index {
            return IntegrityResult::violation(
                expected_index,
                format!("expected index {expected_index}, found {}", block.index),
            );
        }

        let expected_prev = if position == 0 {
            ContentHash::zero()
        } else {
            blocks[position - 1].hash
        };
        if block.previous_hash != expected_prev {
            return IntegrityResult::violation(expected_index, "previous hash link mismatch");
        }

        if position > 0 {
            if block.kind == BlockKind::Genesis {
                return IntegrityResult::violation(expected_index, "genesis block after index 0");
            }
            if block.timestamp < blocks[position - 1].timestamp {
                return IntegrityResult::violation(expected_index, "timestamp moved backwards");
            }
        }

        if !block.verify_hash() {
            return IntegrityResult::violation(expected_index, "block hash mismatch");
        }
    }

    IntegrityResult {
        valid: true,
        violating_index: None,
        seal_valid: None,
        reason: None,
    }
}
