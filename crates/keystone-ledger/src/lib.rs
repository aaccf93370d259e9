#![deny(unsafe_code)]
//! # keystone-ledger
//!
//! Tamper-evident log for the Keystone kernel.
//!
//! - every block is BLAKE3-hashed over all of its fields and linked to its
//!   predecessor; genesis links to the all-zero digest
//! - the lifecycle is one-way: `Open → Locked → Sealed`, each transition
//!   recorded as a marker block
//! - sealing produces a [`SealCertificate`] over the serialized chain, so any
//!   later edit to any block is caught by [`IntegrityLedger::validate_integrity`]
//! - [`LedgerExport`] carries a detached copy that can be verified offline
//! - [`SharedLedger`] linearizes append/lock/seal for concurrent hosts

pub mod block;
pub mod error;
pub mod export;
pub mod integrity;
pub mod ledger;
pub mod shared;

pub use block::{Block, BlockKind, BLOCK_HASH_DOMAIN};
pub use error::{LedgerError, SealError};
pub use export::{LedgerExport, EXPORT_FORMAT_VERSION};
pub use integrity::{verify_chain, IntegrityResult, SEAL_HASH_DOMAIN};
pub use ledger::{HashAlgorithm, IntegrityLedger, LedgerState, LockReceipt, SealCertificate};
pub use shared::SharedLedger;
