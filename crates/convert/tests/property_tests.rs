//! Property coverage for the loss audit and conversion invariants.

use dashgrade_convert::{DashboardStats, detect_data_loss};
use proptest::prelude::*;

fn stats_strategy() -> impl Strategy<Value = DashboardStats> {
    (0u64..50, 0u64..50, 0u64..50, 0u64..50, 0u64..50).prop_map(
        |(panels, queries, annotations, links, variables)| DashboardStats {
            panels,
            queries,
            annotations,
            links,
            variables,
        },
    )
}

proptest! {
    /// The audit passes exactly when no counter decreased.
    #[test]
    fn loss_audit_matches_counter_comparison(
        before in stats_strategy(),
        after in stats_strategy(),
    ) {
        let decreased = after.panels < before.panels
            || after.queries < before.queries
            || after.annotations < before.annotations
            || after.links < before.links
            || after.variables < before.variables;
        let result = detect_data_loss(&before, &after, "v0", "v1");
        prop_assert_eq!(result.is_err(), decreased);
    }

    /// Growth is never reported as loss.
    #[test]
    fn growth_always_passes(stats in stats_strategy(), extra in 0u64..10) {
        let grown = DashboardStats {
            panels: stats.panels + extra,
            queries: stats.queries + extra,
            annotations: stats.annotations,
            links: stats.links,
            variables: stats.variables,
        };
        prop_assert!(detect_data_loss(&stats, &grown, "v0", "v1").is_ok());
    }
}
