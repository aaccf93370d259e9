use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ConstraintError, Domain};
use crate::invariants::{
    BoundOrderingInvariant, ConstraintInvariant, LowerBoundInvariant, PercentageAlignmentInvariant,
    UnboundedSentinelInvariant, UpperBoundInvariant,
};
use crate::set::ConstraintSet;

/// Percentages are normalized to this many decimal places on the way out of
/// [`ConstraintResolver::value_to_percentage`].
pub const PERCENTAGE_DECIMALS: i32 = 9;

/// Outcome of one invariant during [`ConstraintResolver::validate_consistency`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstraintCheck {
    pub invariant_id: String,
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub checks: Vec<ConstraintCheck>,
    pub error_count: usize,
}

/// Establishes and re-derives the constraint invariants.
///
/// Holds nothing but the registered invariants; every operation is a pure
/// function of its arguments.
pub struct ConstraintResolver {
    invariants: Vec<Box<dyn ConstraintInvariant>>,
}

impl ConstraintResolver {
    /// Resolver with the five standard invariants (C.1–C.5).
    pub fn new() -> Self {
        Self {
            invariants: vec![
                Box::new(UpperBoundInvariant),
                Box::new(LowerBoundInvariant),
                Box::new(UnboundedSentinelInvariant),
                Box::new(BoundOrderingInvariant),
                Box::new(PercentageAlignmentInvariant),
            ],
        }
    }

    pub fn invariant_count(&self) -> usize {
        self.invariants.len()
    }

    /// Establish the fixed bounds, then resolve the unbounded sentinel.
    pub fn initialize(&self) -> Result<ConstraintSet, ConstraintError> {
        let mut set = ConstraintSet::unresolved();

        for invariant in self.invariants.iter().filter(|i| i.is_fixed()) {
            invariant.check(&set)?;
            debug!(id = invariant.id(), "Fixed constraint established");
        }

        set.resolve_unbounded();

        for invariant in self.invariants.iter().filter(|i| !i.is_fixed()) {
            invariant.check(&set)?;
        }

        info!(
            invariants = self.invariants.len(),
            "Constraint set established"
        );
        Ok(set)
    }

    /// Re-derive every invariant against `set`.
    pub fn validate_consistency(&self, set: &ConstraintSet) -> ValidationResult {
        let checks: Vec<ConstraintCheck> = self
            .invariants
            .iter()
            .map(|invariant| match invariant.check(set) {
                Ok(()) => ConstraintCheck {
                    invariant_id: invariant.id().into(),
                    name: invariant.name().into(),
                    passed: true,
                    detail: "holds".into(),
                },
                Err(violation) => {
                    warn!(
                        id = invariant.id(),
                        message = %violation.message,
                        "Constraint invariant violated"
                    );
                    ConstraintCheck {
                        invariant_id: invariant.id().into(),
                        name: invariant.name().into(),
                        passed: false,
                        detail: violation.message,
                    }
                }
            })
            .collect();

        let error_count = checks.iter().filter(|c| !c.passed).count();
        ValidationResult {
            valid: error_count == 0,
            checks,
            error_count,
        }
    }

    /// `p / 100` for `p` in `0..=100`.
    pub fn percentage_to_value(&self, percentage: f64) -> Result<f64, ConstraintError> {
        if !percentage.is_finite() || !(0.0..=100.0).contains(&percentage) {
            return Err(ConstraintError::Range {
                domain: Domain::Percentage,
                input: percentage,
            });
        }
        Ok(percentage / 100.0)
    }

    /// `v * 100` for `v` in `0.0..=1.0`, normalized to
    /// [`PERCENTAGE_DECIMALS`] places so that
    /// `value_to_percentage(percentage_to_value(p)) == p`.
    pub fn value_to_percentage(&self, value: f64) -> Result<f64, ConstraintError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ConstraintError::Range {
                domain: Domain::Value,
                input: value,
            });
        }
        Ok(normalize_percentage(value * 100.0))
    }
}

impl Default for ConstraintResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_percentage(raw: f64) -> f64 {
    let scale = 10f64.powi(PERCENTAGE_DECIMALS);
    (raw * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::set::Bound;
    use proptest::prelude::*;

    #[test]
    fn initialize_resolves_sentinel_with_fixed_bounds() {
        let set = ConstraintResolver::new().initialize().unwrap();
        assert!(set.unbounded_resolved());
        assert_eq!(set.max(), Bound::UPPER);
        assert_eq!(set.min(), Bound::LOWER);
    }

    #[test]
    fn healthy_set_has_zero_errors() {
        let resolver = ConstraintResolver::new();
        let set = resolver.initialize().unwrap();
        let result = resolver.validate_consistency(&set);
        assert!(result.valid);
        assert_eq!(result.error_count, 0);
        assert_eq!(result.checks.len(), resolver.invariant_count());
    }

    #[test]
    fn unresolved_set_fails_only_the_sentinel() {
        let resolver = ConstraintResolver::new();
        let result = resolver.validate_consistency(&ConstraintSet::unresolved());
        assert!(!result.valid);
        assert_eq!(result.error_count, 1);
        let failed: Vec<_> = result.checks.iter().filter(|c| !c.passed).collect();
        assert_eq!(failed[0].invariant_id, "C.3");
    }

    #[test]
    fn tampered_set_reports_every_broken_invariant() {
        let resolver = ConstraintResolver::new();
        let mut set = resolver.initialize().unwrap();
        set.min = Bound {
            value: 0.5,
            percentage: 50.0,
        };
        set.max.value = 0.25;
        let result = resolver.validate_consistency(&set);
        // C.1, C.2, C.4, C.5
        assert_eq!(result.error_count, 4);
    }

    #[test]
    fn conversions_at_the_edges() {
        let r = ConstraintResolver::new();
        assert_eq!(r.percentage_to_value(0.0).unwrap(), 0.0);
        assert_eq!(r.percentage_to_value(75.0).unwrap(), 0.75);
        assert_eq!(r.percentage_to_value(100.0).unwrap(), 1.0);
        assert_eq!(r.value_to_percentage(1.0).unwrap(), 100.0);
        assert_eq!(r.value_to_percentage(0.29).unwrap(), 29.0);
    }

    #[test]
    fn out_of_range_inputs_are_range_errors() {
        let r = ConstraintResolver::new();
        for bad in [-1.0, 101.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                r.percentage_to_value(bad),
                Err(ConstraintError::Range {
                    domain: Domain::Percentage,
                    ..
                })
            ));
        }
        for bad in [-0.01, 1.01, f64::NEG_INFINITY] {
            assert!(matches!(
                r.value_to_percentage(bad),
                Err(ConstraintError::Range {
                    domain: Domain::Value,
                    ..
                })
            ));
        }
    }

    #[test]
    fn integer_percentages_round_trip_exactly() {
        let r = ConstraintResolver::new();
        for p in 0..=100 {
            let p = p as f64;
            let back = r.value_to_percentage(r.percentage_to_value(p).unwrap()).unwrap();
            assert_eq!(back, p, "round trip failed for {p}");
        }
    }

    proptest! {
        #[test]
        fn hundredths_round_trip_exactly(k in 0u32..=10_000) {
            let r = ConstraintResolver::new();
            let p = k as f64 / 100.0;
            let back = r.value_to_percentage(r.percentage_to_value(p).unwrap()).unwrap();
            prop_assert_eq!(back, p);
        }

        #[test]
        fn conversion_stays_in_domain(p in 0.0f64..=100.0) {
            let r = ConstraintResolver::new();
            let v = r.percentage_to_value(p).unwrap();
            prop_assert!((0.0..=1.0).contains(&v));
            let back = r.value_to_percentage(v).unwrap();
            prop_assert!((back - p).abs() < 1e-6);
        }
    }
}
