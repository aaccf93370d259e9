use crate::error::ConstraintViolation;
use crate::set::{Bound, ConstraintSet};

/// A numeric invariant over a [`ConstraintSet`].
pub trait ConstraintInvariant: Send + Sync {
    /// Stable identifier, e.g. `"C.1"`.
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    /// Fixed invariants must hold before the sentinel may be resolved.
    fn is_fixed(&self) -> bool;

    fn check(&self, set: &ConstraintSet) -> Result<(), ConstraintViolation>;

    fn violation(&self, message: String) -> ConstraintViolation {
        ConstraintViolation {
            invariant_id: self.id().into(),
            message,
        }
    }
}

/// C.1: the upper bound is `1.0` / 100 %.
pub struct UpperBoundInvariant;

impl ConstraintInvariant for UpperBoundInvariant {
    fn id(&self) -> &'static str {
        "C.1"
    }
    fn name(&self) -> &'static str {
        "Upper Bound"
    }
    fn is_fixed(&self) -> bool {
        true
    }
    fn check(&self, set: &ConstraintSet) -> Result<(), ConstraintViolation> {
        if set.max != Bound::UPPER {
            return Err(self.violation(format!(
                "max is {{value: {}, percentage: {}}}, expected {{value: 1, percentage: 100}}",
                set.max.value, set.max.percentage
            )));
        }
        Ok(())
    }
}

/// C.2: the lower bound is `0.0` / 0 %.
pub struct LowerBoundInvariant;

impl ConstraintInvariant for LowerBoundInvariant {
    fn id(&self) -> &'static str {
        "C.2"
    }
    fn name(&self) -> &'static str {
        "Lower Bound"
    }
    fn is_fixed(&self) -> bool {
        true
    }
    fn check(&self, set: &ConstraintSet) -> Result<(), ConstraintViolation> {
        if set.min != Bound::LOWER {
            return Err(self.violation(format!(
                "min is {{value: {}, percentage: {}}}, expected {{value: 0, percentage: 0}}",
                set.min.value, set.min.percentage
            )));
        }
        Ok(())
    }
}

/// C.3: the open-ended sentinel has been resolved.
///
/// Not fixed: it only becomes true once the fixed bounds are in place.
pub struct UnboundedSentinelInvariant;

impl ConstraintInvariant for UnboundedSentinelInvariant {
    fn id(&self) -> &'static str {
        "C.3"
    }
    fn name(&self) -> &'static str {
        "Unbounded Sentinel"
    }
    fn is_fixed(&self) -> bool {
        false
    }
    fn check(&self, set: &ConstraintSet) -> Result<(), ConstraintViolation> {
        if !set.unbounded_resolved {
            return Err(self.violation("unbounded sentinel was never resolved".into()));
        }
        Ok(())
    }
}

/// C.4: the lower bound sits strictly below the upper bound.
pub struct BoundOrderingInvariant;

impl ConstraintInvariant for BoundOrderingInvariant {
    fn id(&self) -> &'static str {
        "C.4"
    }
    fn name(&self) -> &'static str {
        "Bound Ordering"
    }
    fn is_fixed(&self) -> bool {
        true
    }
    fn check(&self, set: &ConstraintSet) -> Result<(), ConstraintViolation> {
        if !(set.min.value < set.max.value && set.min.percentage < set.max.percentage) {
            return Err(self.violation(format!(
                "min ({}, {}%) does not precede max ({}, {}%)",
                set.min.value, set.min.percentage, set.max.value, set.max.percentage
            )));
        }
        Ok(())
    }
}

/// C.5: each bound's value and percentage describe the same point.
pub struct PercentageAlignmentInvariant;

impl ConstraintInvariant for PercentageAlignmentInvariant {
    fn id(&self) -> &'static str {
        "C.5"
    }
    fn name(&self) -> &'static str {
        "Percentage Alignment"
    }
    fn is_fixed(&self) -> bool {
        true
    }
    fn check(&self, set: &ConstraintSet) -> Result<(), ConstraintViolation> {
        for (label, bound) in [("max", set.max), ("min", set.min)] {
            if bound.value * 100.0 != bound.percentage {
                return Err(self.violation(format!(
                    "{label} value {} does not align with {}%",
                    bound.value, bound.percentage
                )));
            }
        }
        Ok(())
    }
}
