//! value_to_percentage(percentage_to_value(p)) == p across the domain.

use keystone_constraint::{ConstraintError, ConstraintResolver};
use proptest::prelude::*;

proptest! {
    #[test]
    fn hundredths_round_trip(k in 0u32..=10_000) {
        let resolver = ConstraintResolver::new();
        let p = f64::from(k) / 100.0;
        let v = resolver.percentage_to_value(p).unwrap();
        prop_assert!((0.0..=1.0).contains(&v));
        prop_assert_eq!(resolver.value_to_percentage(v).unwrap(), p);
    }

    #[test]
    fn out_of_range_percentages_fail(p in prop_oneof![-1.0e6..-1.0e-9f64, 100.000_001f64..1.0e6]) {
        let resolver = ConstraintResolver::new();
        let is_range_error = matches!(
            resolver.percentage_to_value(p),
            Err(ConstraintError::Range { .. })
        );
        prop_assert!(is_range_error);
    }

    #[test]
    fn every_in_range_value_converts(v in 0.0f64..=1.0) {
        let resolver = ConstraintResolver::new();
        let p = resolver.value_to_percentage(v).unwrap();
        prop_assert!((0.0..=100.0).contains(&p));
    }
}
