use execkpi_core::GroupOutcome;
use execkpi_stats::{evaluate, DEFAULT_ALPHA};
use proptest::prelude::*;

fn tally() -> impl Strategy<Value = GroupOutcome> {
    (1u64..5000).prop_flat_map(|total| {
        (0..=total).prop_map(move |successes| {
            GroupOutcome::new(successes, total).expect("strategy keeps invariants")
        })
    })
}

proptest! {
    #[test]
    fn evaluation_is_bit_identical(control in tally(), treatment in tally()) {
        let first = evaluate(&control, &treatment, DEFAULT_ALPHA).unwrap();
        let second = evaluate(&control, &treatment, DEFAULT_ALPHA).unwrap();

        prop_assert_eq!(first.uplift.to_bits(), second.uplift.to_bits());
        prop_assert_eq!(first.srm_p_value.to_bits(), second.srm_p_value.to_bits());
        prop_assert_eq!(first.p_value.map(f64::to_bits), second.p_value.map(f64::to_bits));
        prop_assert_eq!(first.significant, second.significant);
    }

    #[test]
    fn interval_contains_uplift(control in tally(), treatment in tally()) {
        let report = evaluate(&control, &treatment, DEFAULT_ALPHA).unwrap();
        if let Some(ci) = report.ci95 {
            prop_assert!(ci.low <= report.uplift);
            prop_assert!(report.uplift <= ci.high);
        }
    }

    #[test]
    fn probabilities_stay_in_unit_interval(control in tally(), treatment in tally()) {
        let report = evaluate(&control, &treatment, DEFAULT_ALPHA).unwrap();
        prop_assert!((0.0..=1.0).contains(&report.srm_p_value));
        if let Some(p) = report.p_value {
            prop_assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn equal_totals_pass_srm_exactly(successes_a in 0u64..100, successes_b in 0u64..100) {
        let control = GroupOutcome::new(successes_a, 100).unwrap();
        let treatment = GroupOutcome::new(successes_b, 100).unwrap();
        let report = evaluate(&control, &treatment, DEFAULT_ALPHA).unwrap();
        prop_assert_eq!(report.srm_p_value, 1.0);
    }
}
