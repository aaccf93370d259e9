use keystone_types::{ContentHash, TemporalAnchor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain prefix for block hashes. Bump the suffix if the encoding changes.
pub const BLOCK_HASH_DOMAIN: &[u8] = b"keystone-ledger-block-v1:";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    Genesis,
    Data,
    LockMarker,
    SealMarker,
}

impl BlockKind {
    fn tag(self) -> u8 {
        match self {
            Self::Genesis => 0,
            Self::Data => 1,
            Self::LockMarker => 2,
            Self::SealMarker => 3,
        }
    }

    pub fn is_marker(self) -> bool {
        matches!(self, Self::LockMarker | Self::SealMarker)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Genesis => write!(f, "genesis"),
            Self::Data => write!(f, "data"),
            Self::LockMarker => write!(f, "lock-marker"),
            Self::SealMarker => write!(f, "seal-marker"),
        }
    }
}

/// One hash-linked record.
///
/// Fields are read-only outside this crate; `hash` always covers every other
/// field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub(crate) index: u64,
    pub(crate) timestamp: TemporalAnchor,
    pub(crate) kind: BlockKind,
    pub(crate) payload: Vec<u8>,
    pub(crate) previous_hash: ContentHash,
    pub(crate) hash: ContentHash,
}

impl Block {
    pub(crate) fn new(
        index: u64,
        timestamp: TemporalAnchor,
        kind: BlockKind,
        payload: Vec<u8>,
        previous_hash: ContentHash,
    ) -> Self {
        let hash = compute_block_hash(index, &timestamp, kind, &payload, &previous_hash);
        Self {
            index,
            timestamp,
            kind,
            payload,
            previous_hash,
            hash,
        }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn timestamp(&self) -> TemporalAnchor {
        self.timestamp
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Decode a JSON payload (as written by `append_json` and marker blocks).
    pub fn payload_json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }

    pub fn previous_hash(&self) -> ContentHash {
        self.previous_hash
    }

    pub fn hash(&self) -> ContentHash {
        self.hash
    }

    pub fn recompute_hash(&self) -> ContentHash {
        compute_block_hash(
            self.index,
            &self.timestamp,
            self.kind,
            &self.payload,
            &self.previous_hash,
        )
    }

    pub fn verify_hash(&self) -> bool {
        self.recompute_hash() == self.hash
    }
}

/// Fixed-width, length-prefixed encoding of every block field under
/// [`BLOCK_HASH_DOMAIN`].
pub(crate) fn compute_block_hash(
    index: u64,
    timestamp: &TemporalAnchor,
    kind: BlockKind,
    payload: &[u8],
    previous_hash: &ContentHash,
) -> ContentHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(BLOCK_HASH_DOMAIN);
    hasher.update(&index.to_le_bytes());
    hasher.update(&timestamp.physical_ms.to_le_bytes());
    hasher.update(&timestamp.logical.to_le_bytes());
    hasher.update(&timestamp.node_id.to_le_bytes());
    hasher.update(&[kind.tag()]);
    hasher.update(&(payload.len() as u64).to_le_bytes());
    hasher.update(payload);
    hasher.update(previous_hash.as_bytes());
    ContentHash::from_bytes(*hasher.finalize().as_bytes())
}
