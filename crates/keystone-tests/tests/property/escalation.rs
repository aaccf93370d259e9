//! Escalation through the orchestrator is monotonic and keeps the audit clean.

use keystone_capability::{flags_for_level, CapabilityFlag, CapabilityRegistry};
use keystone_kernel::AuditCheck;
use keystone_tests::active_orchestrator;
use proptest::prelude::*;

proptest! {
    #[test]
    fn n_evolutions_reach_level_n(n in 0u32..24) {
        let mut orch = active_orchestrator();
        let mut seen = orch.registry().capabilities().clone();
        for _ in 0..n {
            orch.evolve_capabilities().unwrap();
            let now = orch.registry().capabilities();
            prop_assert!(now.is_superset(&seen));
            prop_assert!(now.len() > seen.len());
            seen = now.clone();
        }
        prop_assert_eq!(orch.registry().level(), n);
        let report = orch.validate_system();
        prop_assert!(report.check(AuditCheck::CapabilityEscalation).unwrap().passed);
    }

    #[test]
    fn each_level_unlocks_its_own_tier(level in 1u32..1_000) {
        let unlocked = flags_for_level(level);
        prop_assert!(unlocked.contains(&CapabilityFlag::EscalationTier(level)));
        prop_assert!(unlocked.is_disjoint(&flags_for_level(0)));
        prop_assert!(unlocked.is_disjoint(&flags_for_level(level + 1)));
    }

    #[test]
    fn history_levels_never_decrease(ops in proptest::collection::vec(any::<bool>(), 1..40)) {
        let mut registry = CapabilityRegistry::new();
        registry.initialize().unwrap();
        for evolve in ops {
            if evolve {
                registry.evolve().unwrap();
            } else {
                let _ = registry.activate(CapabilityFlag::CommandExecution);
            }
        }
        let levels: Vec<u32> = registry.history().iter().map(|e| e.new_level).collect();
        prop_assert!(levels.windows(2).all(|w| w[0] <= w[1]));
    }
}
