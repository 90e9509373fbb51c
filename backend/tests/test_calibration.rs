//! Calibration tests against generated months

use chrono::NaiveDate;
use expense_simulator_core_rs::calibration::largest_in_category;
use expense_simulator_core_rs::{
    calibrate, CalibrationOutcome, CalibrationPolicy, ExpenseGenerator, GeneratorConfig, Ledger,
    TargetSheet,
};

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
}

fn generated(seed: u64) -> Vec<expense_simulator_core_rs::Transaction> {
    let targets = TargetSheet::new().with_amount("Belanja Bahan Baku (COGS)", 10_000_000);
    let mut generator = ExpenseGenerator::new(GeneratorConfig {
        rng_seed: seed,
        ..Default::default()
    })
    .unwrap();
    generator.generate_month(&targets, 2024, 9).unwrap().transactions
}

#[test]
fn test_shortfall_lands_on_largest_transaction() {
    let mut transactions = generated(5);
    let cogs = "Belanja Bahan Baku (COGS)";
    let idx = largest_in_category(&transactions, cogs).unwrap();
    let before_max = transactions[idx].amount();
    let before_total: i64 = transactions
        .iter()
        .filter(|t| t.sub_category() == cogs)
        .map(|t| t.amount())
        .sum();

    // generated months are already calibrated; ask for 250k more
    let targets = TargetSheet::new().with_amount(cogs, before_total + 250_000);
    let report = calibrate(&mut transactions, &targets, &CalibrationPolicy::default());

    assert_eq!(transactions[idx].amount(), before_max + 250_000);
    assert!(matches!(
        report.get(cogs).unwrap().outcome,
        CalibrationOutcome::Adjusted { delta: 250_000, .. }
    ));
}

#[test]
fn test_generated_month_is_a_fixed_point() {
    let targets = TargetSheet::new().with_amount("Belanja Bahan Baku (COGS)", 10_000_000);
    let mut transactions = generated(11);
    let snapshot = transactions.clone();

    let report = calibrate(&mut transactions, &targets, &CalibrationPolicy::default());

    assert_eq!(transactions, snapshot);
    assert_eq!(report.adjusted_count(), 0);
}

#[test]
fn test_other_categories_untouched() {
    let mut transactions = generated(3);
    let before: Vec<i64> = transactions
        .iter()
        .filter(|t| t.sub_category() != "Operasional|Lain-lain")
        .map(|t| t.amount())
        .collect();

    let targets = TargetSheet::new().with_amount("Operasional|Lain-lain", 1_000_000);
    calibrate(&mut transactions, &targets, &CalibrationPolicy::default());

    let after: Vec<i64> = transactions
        .iter()
        .filter(|t| t.sub_category() != "Operasional|Lain-lain")
        .map(|t| t.amount())
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_unmatched_category_reported_not_fabricated() {
    let mut transactions = generated(1);
    let count = transactions.len();

    let targets = TargetSheet::new().with_amount("Operasional|Renovasi", 750_000);
    let report = calibrate(&mut transactions, &targets, &CalibrationPolicy::default());

    assert_eq!(transactions.len(), count);
    assert_eq!(
        report.get("Operasional|Renovasi").unwrap().outcome,
        CalibrationOutcome::NoTransactions { target: 750_000 }
    );
    assert_eq!(report.unmet().count(), 1);
}

#[test]
fn test_overshoot_beyond_largest_is_floored() {
    let mut ledger = Ledger::new();
    for (d, amount) in [(1, 40_000), (2, 90_000), (3, 60_000)] {
        ledger
            .record(date(d), "Bahan Baku", "Belanja Bahan Baku (COGS)", "pasar", amount)
            .unwrap();
    }

    let targets = TargetSheet::new().with_amount("Belanja Bahan Baku (COGS)", 20_000);
    let report = calibrate(ledger.as_mut_slice(), &targets, &CalibrationPolicy::default());

    // 190k realized, 20k wanted: largest (90k) drops to 0, 80k overshoot remains
    assert_eq!(ledger[1].amount(), 0);
    assert_eq!(ledger.total_for("Belanja Bahan Baku (COGS)"), 100_000);
    match &report.get("Belanja Bahan Baku (COGS)").unwrap().outcome {
        CalibrationOutcome::Floored {
            transaction_id,
            delta,
            residual,
            ..
        } => {
            assert_eq!(transaction_id, "TXN0002");
            assert_eq!(*delta, -90_000);
            assert_eq!(*residual, -80_000);
        }
        other => panic!("expected Floored, got {:?}", other),
    }
}

#[test]
fn test_custom_tolerance() {
    let mut ledger = Ledger::new();
    ledger.record(date(4), "Operasional", "A", "x", 9_950).unwrap();

    let targets = TargetSheet::new().with_amount("A", 10_000);
    let policy = CalibrationPolicy {
        tolerance: 100,
        ..Default::default()
    };
    let report = calibrate(ledger.as_mut_slice(), &targets, &policy);

    assert_eq!(ledger[0].amount(), 9_950);
    assert!(report.get("A").unwrap().outcome.is_reconciled());
}

#[test]
fn test_metadata_prefix_skipped() {
    let mut ledger = Ledger::new();
    ledger.record(date(4), "Operasional", "Tanggal Cetak", "x", 10).unwrap();

    let targets = TargetSheet::new()
        .with_amount("Tanggal Cetak", 20_241_001)
        .with_amount("Bulan", 9)
        .with_amount("Tahun", 2024);
    let report = calibrate(ledger.as_mut_slice(), &targets, &CalibrationPolicy::default());

    assert!(report.categories.is_empty());
    assert_eq!(ledger[0].amount(), 10);
}
