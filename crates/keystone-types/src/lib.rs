#![deny(unsafe_code)]
//! # keystone-types
//!
//! Primitives shared by every Keystone crate:
//!
//! - [`ContentHash`]: 32-byte BLAKE3 digest with hex serde
//! - [`TemporalAnchor`]: hybrid physical/logical timestamp for ledger blocks
//! - [`Clock`]: injectable time source ([`SystemClock`], [`ManualClock`])

pub mod clock;
pub mod hash;
pub mod temporal;

pub use clock::{Clock, ManualClock, SystemClock};
pub use hash::{ContentHash, HashParseError};
pub use temporal::TemporalAnchor;
