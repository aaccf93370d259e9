use serde::{Deserialize, Serialize};

/// One end of the normalized domain, expressed in both units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub value: f64,
    pub percentage: f64,
}

impl Bound {
    pub const UPPER: Bound = Bound {
        value: 1.0,
        percentage: 100.0,
    };
    pub const LOWER: Bound = Bound {
        value: 0.0,
        percentage: 0.0,
    };
}

/// The established constraint set.
///
/// Only the resolver constructs a resolved set; the sentinel flag is flipped
/// once during [`ConstraintResolver::initialize`](crate::ConstraintResolver::initialize)
/// and there is no API to clear it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSet {
    pub(crate) max: Bound,
    pub(crate) min: Bound,
    pub(crate) unbounded_resolved: bool,
}

impl ConstraintSet {
    /// Fixed bounds with the sentinel still open.
    pub fn unresolved() -> Self {
        Self {
            max: Bound::UPPER,
            min: Bound::LOWER,
            unbounded_resolved: false,
        }
    }

    pub fn max(&self) -> Bound {
        self.max
    }

    pub fn min(&self) -> Bound {
        self.min
    }

    pub fn unbounded_resolved(&self) -> bool {
        self.unbounded_resolved
    }

    /// Width of the domain in percentage points.
    pub fn span_percentage(&self) -> f64 {
        self.max.percentage - self.min.percentage
    }

    pub(crate) fn resolve_unbounded(&mut self) {
        self.unbounded_resolved = true;
    }
}

impl Default for ConstraintSet {
    fn default() -> Self {
        Self::unresolved()
    }
}
