use serde::{Deserialize, Serialize};
use std::fmt;

/// Hybrid physical/logical timestamp.
///
/// Blocks created within the same millisecond share `physical_ms` and are
/// ordered by `logical`, so a chain's timestamps never decrease even when the
/// wall clock stalls or steps backwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemporalAnchor {
    /// Milliseconds since the Unix epoch.
    pub physical_ms: u64,
    /// Tie-breaker for events in the same millisecond.
    pub logical: u32,
    pub node_id: u16,
}

impl TemporalAnchor {
    pub fn new(physical_ms: u64, logical: u32, node_id: u16) -> Self {
        Self {
            physical_ms,
            logical,
            node_id,
        }
    }

    /// The zero anchor.
    pub fn genesis() -> Self {
        Self::new(0, 0, 0)
    }

    /// Next anchor after `self` given a fresh clock reading.
    ///
    /// Takes the reading if it moved forward, otherwise stays on the previous
    /// millisecond and bumps the logical counter.
    pub fn advance(&self, now_ms: u64, node_id: u16) -> Self {
        if now_ms > self.physical_ms {
            Self::new(now_ms, 0, node_id)
        } else {
            Self::new(self.physical_ms, self.logical.saturating_add(1), node_id)
        }
    }

    pub fn precedes(&self, other: &TemporalAnchor) -> bool {
        self < other
    }
}

impl PartialOrd for TemporalAnchor {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TemporalAnchor {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.physical_ms, self.logical, self.node_id).cmp(&(
            other.physical_ms,
            other.logical,
            other.node_id,
        ))
    }
}

impl fmt::Display for TemporalAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}@{}", self.physical_ms, self.logical, self.node_id)
    }
}
