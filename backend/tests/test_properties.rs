// Property-based tests for the controller, sampler and calibrator.
// CI: default case counts. Soak: PROPTEST_CASES=10000 cargo test --release

use chrono::NaiveDate;
use proptest::prelude::*;

use expense_simulator_core_rs::basket::{sample_basket, scaled_item_count, GroupWeight};
use expense_simulator_core_rs::{
    adjustment_factor, calibrate, CalibrationOutcome, CalibrationPolicy, Catalog,
    ControllerParams, ExpenseGenerator, GeneratorConfig, Ledger, RngManager, TargetSheet,
    TargetSummary,
};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_with(default_cases: u32) -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(default_cases),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

const SUBS: [&str; 3] = ["A", "B", "C"];

/// Ledger entries across a few sub-categories
fn arb_entries() -> impl Strategy<Value = Vec<(usize, i64)>> {
    prop::collection::vec((0..SUBS.len(), 0i64..500_000), 0..40)
}

/// Targets for the same sub-categories (sometimes missing)
fn arb_targets() -> impl Strategy<Value = Vec<Option<i64>>> {
    prop::collection::vec(prop::option::of(0i64..2_000_000), SUBS.len())
}

fn build_ledger(entries: &[(usize, i64)]) -> Ledger {
    let date = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
    let mut ledger = Ledger::new();
    for (sub, amount) in entries {
        ledger
            .record(date, "Operasional", SUBS[*sub], "x", *amount)
            .unwrap();
    }
    ledger
}

fn build_targets(targets: &[Option<i64>]) -> TargetSheet {
    SUBS.iter()
        .zip(targets)
        .fold(TargetSheet::new(), |sheet, (sub, t)| match t {
            Some(amount) => sheet.with_amount(*sub, *amount),
            None => sheet,
        })
}

fn reconcilable_targets() -> TargetSheet {
    TargetSheet::new()
        .with_amount("Belanja Bahan Baku (COGS)", 10_000_000)
        .with_amount("Operasional|Gaji Pegawai", 3_000_000)
        .with_amount("Operasional|Utilitas", 2_500_000)
        .with_amount("Operasional|Maintenance & Perlengkapan", 1_500_000)
        .with_amount("Operasional|Marketing & Promosi", 300_000)
        .with_amount("Operasional|Sewa Tempat (Cadangan)", 1_000_000)
        .with_amount("Operasional|Beban Penyusutan (Depresiasi)", 250_000)
        .with_amount("Operasional|Iuran Lingkungan", 200_000)
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_with(256))]

    #[test]
    fn factor_always_within_bounds(
        target in 0i64..100_000_000,
        actual in 0i64..200_000_000,
        days in 1usize..32,
        day_seed in 0usize..1_000,
    ) {
        let day = 1 + day_seed % days;
        let params = ControllerParams::default();
        let f = adjustment_factor(target, actual, day, days, &params);
        prop_assert!(f >= params.min_factor && f <= params.max_factor, "factor {}", f);
    }

    #[test]
    fn factor_decreases_with_spend(
        target in 1_000i64..100_000_000,
        actual in 0i64..100_000_000,
        extra in 1i64..10_000_000,
        day in 1usize..31,
    ) {
        let params = ControllerParams::default();
        let lower = adjustment_factor(target, actual, day, 30, &params);
        let higher_spend = adjustment_factor(target, actual + extra, day, 30, &params);
        prop_assert!(higher_spend <= lower);
    }
}

// ---------------------------------------------------------------------------
// Sampler
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_with(256))]

    #[test]
    fn basket_amount_non_negative_and_rounded(
        seed in any::<u64>(),
        desired in 1u32..10,
        factor in 0.1f64..2.0,
        unit in prop_oneof![Just(100i64), Just(1_000i64)],
    ) {
        let catalog = Catalog::standard();
        let weights = vec![
            GroupWeight::new("MAINTENANCE_HABIS_PAKAI", 0.9),
            GroupWeight::new("MAINTENANCE_ALAT", 0.1),
        ];
        let mut rng = RngManager::new(seed);

        let basket = sample_basket(&mut rng, &catalog, &weights, desired, factor, unit).unwrap();
        prop_assert!(basket.amount >= 0);
        prop_assert_eq!(basket.amount % unit, 0);
        prop_assert_eq!(basket.items.len(), scaled_item_count(desired, factor));
        prop_assert!(!basket.items.is_empty());
    }
}

// ---------------------------------------------------------------------------
// Calibrator
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_with(256))]

    #[test]
    fn calibration_never_goes_negative(entries in arb_entries(), targets in arb_targets()) {
        let mut ledger = build_ledger(&entries);
        let sheet = build_targets(&targets);
        calibrate(ledger.as_mut_slice(), &sheet, &CalibrationPolicy::default());
        prop_assert!(ledger.iter().all(|t| t.amount() >= 0));
    }

    #[test]
    fn calibration_touches_at_most_one_per_category(entries in arb_entries(), targets in arb_targets()) {
        let mut ledger = build_ledger(&entries);
        let before = ledger.clone();
        let sheet = build_targets(&targets);
        calibrate(ledger.as_mut_slice(), &sheet, &CalibrationPolicy::default());

        for sub in SUBS {
            let changed = before
                .iter()
                .zip(ledger.iter())
                .filter(|(a, b)| a.sub_category() == sub && a.amount() != b.amount())
                .count();
            prop_assert!(changed <= 1);
        }
    }

    #[test]
    fn calibration_is_idempotent_once_reconciled(entries in arb_entries(), targets in arb_targets()) {
        let mut ledger = build_ledger(&entries);
        let sheet = build_targets(&targets);
        let policy = CalibrationPolicy::default();

        let first = calibrate(ledger.as_mut_slice(), &sheet, &policy);
        let floored = first
            .categories
            .iter()
            .any(|c| matches!(c.outcome, CalibrationOutcome::Floored { .. }));
        prop_assume!(!floored);

        let snapshot = ledger.clone();
        calibrate(ledger.as_mut_slice(), &sheet, &policy);
        prop_assert_eq!(ledger, snapshot);
    }

    #[test]
    fn reachable_targets_are_matched(entries in arb_entries(), targets in arb_targets()) {
        let mut ledger = build_ledger(&entries);
        let sheet = build_targets(&targets);
        let report = calibrate(ledger.as_mut_slice(), &sheet, &CalibrationPolicy::default());

        for row in &report.categories {
            if row.outcome.is_reconciled() {
                prop_assert!((ledger.total_for(&row.category) - row.target).abs() <= 1);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Whole runs
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_with(24))]

    #[test]
    fn seeded_runs_are_reproducible(seed in any::<u64>()) {
        let targets = reconcilable_targets();
        let run = || {
            ExpenseGenerator::new(GeneratorConfig { rng_seed: seed, ..Default::default() })
                .unwrap()
                .generate_month(&targets, 2024, 9)
                .unwrap()
        };
        let a = run();
        let b = run();
        prop_assert_eq!(a.fingerprint, b.fingerprint);
        prop_assert_eq!(a.transactions, b.transactions);
    }

    #[test]
    fn generated_months_reconcile(seed in any::<u64>()) {
        let targets = reconcilable_targets();
        let mut generator =
            ExpenseGenerator::new(GeneratorConfig { rng_seed: seed, ..Default::default() }).unwrap();
        let result = generator.generate_month(&targets, 2024, 9).unwrap();

        let summary = TargetSummary::build(
            &targets,
            &result.transactions,
            &generator.config().calibration_policy(),
        );
        prop_assert!(summary.is_reconciled(1), "{}", summary.to_table());
        prop_assert!(result.transactions.iter().all(|t| t.amount() >= 0));
    }

    #[test]
    fn any_budget_keeps_amounts_non_negative(
        seed in any::<u64>(),
        cogs in 0i64..20_000_000,
        utilities in 0i64..3_000_000,
    ) {
        let targets = TargetSheet::new()
            .with_amount("Belanja Bahan Baku (COGS)", cogs)
            .with_amount("Operasional|Utilitas", utilities);
        let result =
            ExpenseGenerator::new(GeneratorConfig { rng_seed: seed, ..Default::default() })
                .unwrap()
                .generate_month(&targets, 2024, 9)
                .unwrap();

        prop_assert!(result.transactions.iter().all(|t| t.amount() >= 0));
        prop_assert!(result
            .days
            .iter()
            .all(|d| d.factors.iter().all(|f| (0.1..=2.0).contains(f))));
    }
}
