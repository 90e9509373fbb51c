//! Fixed-schedule transactions
//!
//! Everything that happens on a calendar rule rather than probabilistically:
//! payroll, promotion budget, rent reserve, depreciation entry, neighbourhood
//! dues (monthly plus a weekly Saturday waste fee) and the two fixed utility
//! bills. The emitter returns the residual flexible targets (currently the
//! electricity budget left over after the fixed utility bills).
//!
//! # Draw order
//!
//! promo day → depreciation day → monthly dues day → PDAM amount → WIFI day →
//! PDAM day. Saturdays and the salary date consume no draws.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::basket::round_to_unit;
use crate::core::calendar::{day_in_month, payment_date};
use crate::core::Period;
use crate::models::{Ledger, TargetSheet};
use crate::orchestrator::GenerationError;
use crate::rng::RandomSource;
use crate::scheduler::ELECTRICITY_BUDGET_KEY;

pub const CATEGORY_OPERASIONAL: &str = "Operasional";
pub const SALARY_KEY: &str = "Operasional|Gaji Pegawai";
pub const PROMO_KEY: &str = "Operasional|Marketing & Promosi";
pub const RENT_RESERVE_KEY: &str = "Operasional|Sewa Tempat (Cadangan)";
pub const DEPRECIATION_KEY: &str = "Operasional|Beban Penyusutan (Depresiasi)";
pub const DUES_KEY: &str = "Operasional|Iuran Lingkungan";
pub const UTILITIES_KEY: &str = "Operasional|Utilitas";

/// Inclusive range of days of the month
pub type DayWindow = (u32, u32);

/// Amounts and dates of the fixed schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedScheduleConfig {
    /// Nominal payroll day (moved to a business day)
    pub salary_day: u32,

    /// Window for the promotion budget entry
    pub promo_days: DayWindow,

    /// Day of the rent reserve allocation
    pub rent_reserve_day: u32,

    /// Window for the depreciation entry
    pub depreciation_days: DayWindow,

    /// Monthly neighbourhood dues
    pub monthly_dues: i64,

    /// Window for the monthly dues payment
    pub monthly_dues_days: DayWindow,

    /// Weekly waste collection fee, paid every Saturday
    pub weekly_waste_fee: i64,

    /// Internet bill
    pub wifi_bill: i64,

    /// Window for the internet bill
    pub wifi_days: DayWindow,

    /// Water bill range [min, max)
    pub water_bill: (f64, f64),

    /// Window for the water bill
    pub water_days: DayWindow,
}

impl Default for FixedScheduleConfig {
    fn default() -> Self {
        Self {
            salary_day: 10,
            promo_days: (1, 5),
            rent_reserve_day: 1,
            depreciation_days: (1, 5),
            monthly_dues: 80_000,
            monthly_dues_days: (1, 5),
            weekly_waste_fee: 20_000,
            wifi_bill: 425_000,
            wifi_days: (15, 20),
            water_bill: (500_000.0, 620_000.0),
            water_days: (15, 20),
        }
    }
}

impl FixedScheduleConfig {
    pub fn validate(&self) -> Result<(), String> {
        let windows = [
            ("promo_days", self.promo_days),
            ("depreciation_days", self.depreciation_days),
            ("monthly_dues_days", self.monthly_dues_days),
            ("wifi_days", self.wifi_days),
            ("water_days", self.water_days),
        ];
        for (name, (lo, hi)) in windows {
            if lo == 0 || lo > hi || hi > 31 {
                return Err(format!("{} {:?} must satisfy 1 <= min <= max <= 31", name, (lo, hi)));
            }
        }
        for (name, day) in [("salary_day", self.salary_day), ("rent_reserve_day", self.rent_reserve_day)] {
            if day == 0 || day > 31 {
                return Err(format!("{} {} must lie in 1..=31", name, day));
            }
        }
        for (name, amount) in [
            ("monthly_dues", self.monthly_dues),
            ("weekly_waste_fee", self.weekly_waste_fee),
            ("wifi_bill", self.wifi_bill),
        ] {
            if amount < 0 {
                return Err(format!("{} must be non-negative, got {}", name, amount));
            }
        }
        let (lo, hi) = self.water_bill;
        if !lo.is_finite() || !hi.is_finite() || lo < 0.0 || lo > hi {
            return Err(format!("water_bill {:?} must satisfy 0 <= min <= max", self.water_bill));
        }
        Ok(())
    }
}

/// Emits the calendar-driven part of the month
pub struct FixedSchedule<'a> {
    config: &'a FixedScheduleConfig,
}

impl<'a> FixedSchedule<'a> {
    pub fn new(config: &'a FixedScheduleConfig) -> Self {
        Self { config }
    }

    /// Append the fixed transactions for the period's month to `ledger`
    ///
    /// Returns residual targets for flexible categories whose budget is what
    /// remains after the fixed entries (the electricity budget).
    pub fn emit<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        targets: &TargetSheet,
        period: &Period,
        ledger: &mut Ledger,
    ) -> Result<BTreeMap<String, i64>, GenerationError> {
        let cfg = self.config;
        let (year, month) = (period.year(), period.month_number());
        let date = |day: u32| -> Result<NaiveDate, GenerationError> {
            day_in_month(year, month, day).ok_or_else(|| {
                GenerationError::InvalidConfig(format!("no day {} in {}-{:02}", day, year, month))
            })
        };
        let mut book = |date: NaiveDate, key: &str, amount: i64, description: String| {
            ledger
                .record(date, CATEGORY_OPERASIONAL, key, description, amount)
                .map(|_| ())
                .map_err(|e| GenerationError::Internal(e.to_string()))
        };

        // Payroll
        let pay_date = salary_date(year, month, cfg.salary_day).ok_or_else(|| {
            GenerationError::InvalidConfig(format!("invalid payroll month {}-{:02}", year, month))
        })?;
        book(
            pay_date,
            SALARY_KEY,
            targets.amount(SALARY_KEY),
            format!("Gaji Pegawai {}", period.start().format("%B")),
        )?;

        // Promotion
        let promo_day = draw_day(rng, cfg.promo_days);
        book(
            date(promo_day)?,
            PROMO_KEY,
            targets.amount(PROMO_KEY),
            "Budget Promosi & Pemasaran".to_string(),
        )?;

        // Rent reserve
        book(
            date(cfg.rent_reserve_day)?,
            RENT_RESERVE_KEY,
            targets.amount(RENT_RESERVE_KEY),
            "Alokasi Dana Cadangan Sewa".to_string(),
        )?;

        // Depreciation
        let depreciation_day = draw_day(rng, cfg.depreciation_days);
        book(
            date(depreciation_day)?,
            DEPRECIATION_KEY,
            targets.amount(DEPRECIATION_KEY),
            "Pencatatan Beban Penyusutan".to_string(),
        )?;

        // Neighbourhood dues
        let dues_day = draw_day(rng, cfg.monthly_dues_days);
        book(
            date(dues_day)?,
            DUES_KEY,
            cfg.monthly_dues,
            "Pembayaran Iuran Warga Bulanan".to_string(),
        )?;
        for saturday in period.saturdays() {
            book(
                saturday,
                DUES_KEY,
                cfg.weekly_waste_fee,
                "Pembayaran Uang Sampah Mingguan".to_string(),
            )?;
        }

        // Fixed utility bills
        let water_amount = round_to_unit(rng.uniform(cfg.water_bill.0, cfg.water_bill.1), 1);
        let wifi_day = draw_day(rng, cfg.wifi_days);
        let water_day = draw_day(rng, cfg.water_days);
        book(
            date(wifi_day)?,
            UTILITIES_KEY,
            cfg.wifi_bill,
            "Pembayaran Tagihan WIFI Bulanan".to_string(),
        )?;
        book(
            date(water_day)?,
            UTILITIES_KEY,
            water_amount,
            "Pembayaran Tagihan Air PDAM".to_string(),
        )?;

        let electricity = (targets.amount(UTILITIES_KEY) - cfg.wifi_bill - water_amount).max(0);

        let mut residual = BTreeMap::new();
        residual.insert(ELECTRICITY_BUDGET_KEY.to_string(), electricity);
        Ok(residual)
    }
}

/// Payroll date kept inside the month: a weekend shift that would cross the
/// month boundary goes to the nearest weekday on the other side instead
fn salary_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let date = payment_date(year, month, day)?;
    if date.month() == month {
        return Some(date);
    }
    let nominal = day_in_month(year, month, day)?;
    Some(if date > nominal {
        date - Duration::days(3)
    } else {
        date + Duration::days(3)
    })
}

fn draw_day<R: RandomSource + ?Sized>(rng: &mut R, window: DayWindow) -> u32 {
    rng.range_inclusive(window.0 as i64, window.1 as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngManager, SequenceRng};

    fn targets() -> TargetSheet {
        TargetSheet::new()
            .with_amount(SALARY_KEY, 500_000)
            .with_amount(PROMO_KEY, 100_000)
            .with_amount(RENT_RESERVE_KEY, 200_000)
            .with_amount(DEPRECIATION_KEY, 50_000)
            .with_amount(UTILITIES_KEY, 1_500_000)
    }

    fn count(ledger: &Ledger, description: &str) -> usize {
        ledger.iter().filter(|t| t.description() == description).count()
    }

    #[test]
    fn test_one_of_each_monthly_item() {
        let config = FixedScheduleConfig::default();
        let period = Period::month(2024, 9).unwrap();
        let mut ledger = Ledger::new();
        let mut rng = RngManager::new(42);

        FixedSchedule::new(&config)
            .emit(&mut rng, &targets(), &period, &mut ledger)
            .unwrap();

        for sub in [SALARY_KEY, PROMO_KEY, RENT_RESERVE_KEY, DEPRECIATION_KEY] {
            assert_eq!(ledger.iter().filter(|t| t.sub_category() == sub).count(), 1, "{}", sub);
        }
        assert_eq!(count(&ledger, "Pembayaran Iuran Warga Bulanan"), 1);
        assert_eq!(count(&ledger, "Pembayaran Tagihan WIFI Bulanan"), 1);
        assert_eq!(count(&ledger, "Pembayaran Tagihan Air PDAM"), 1);
        assert!(ledger.iter().all(|t| t.category() == CATEGORY_OPERASIONAL));
    }

    #[test]
    fn test_weekly_fee_every_saturday() {
        let config = FixedScheduleConfig::default();
        // August 2024 has five Saturdays (3, 10, 17, 24, 31)
        let period = Period::month(2024, 8).unwrap();
        let mut ledger = Ledger::new();
        let mut rng = RngManager::new(1);

        FixedSchedule::new(&config)
            .emit(&mut rng, &targets(), &period, &mut ledger)
            .unwrap();

        let fees: Vec<_> = ledger
            .iter()
            .filter(|t| t.description() == "Pembayaran Uang Sampah Mingguan")
            .collect();
        assert_eq!(fees.len(), 5);
        assert!(fees.iter().all(|t| t.amount() == 20_000));
        assert!(fees
            .iter()
            .all(|t| chrono::Datelike::weekday(&t.date()) == chrono::Weekday::Sat));
    }

    #[test]
    fn test_salary_uses_business_day_and_month_name() {
        let config = FixedScheduleConfig::default();
        // 2024-08-10 is a Saturday → Monday 12th
        let period = Period::month(2024, 8).unwrap();
        let mut ledger = Ledger::new();
        let mut rng = RngManager::new(1);

        FixedSchedule::new(&config)
            .emit(&mut rng, &targets(), &period, &mut ledger)
            .unwrap();

        let salary = ledger.iter().find(|t| t.sub_category() == SALARY_KEY).unwrap();
        assert_eq!(salary.date(), NaiveDate::from_ymd_opt(2024, 8, 12).unwrap());
        assert_eq!(salary.description(), "Gaji Pegawai August");
        assert_eq!(salary.amount(), 500_000);
    }

    #[test]
    fn test_salary_stays_inside_month() {
        // 2024-11-30 is a Saturday; Monday would be in December
        let config = FixedScheduleConfig {
            salary_day: 30,
            ..Default::default()
        };
        let period = Period::month(2024, 11).unwrap();
        let mut ledger = Ledger::new();
        let mut rng = RngManager::new(3);

        FixedSchedule::new(&config)
            .emit(&mut rng, &targets(), &period, &mut ledger)
            .unwrap();

        let salary = ledger.iter().find(|t| t.sub_category() == SALARY_KEY).unwrap();
        assert_eq!(salary.date(), NaiveDate::from_ymd_opt(2024, 11, 29).unwrap());
        assert!(period.contains(salary.date()));
    }

    #[test]
    fn test_salary_date_first_day_sunday() {
        // 2024-09-01 is a Sunday; Friday would be in August
        assert_eq!(salary_date(2024, 9, 1), NaiveDate::from_ymd_opt(2024, 9, 2));
        assert_eq!(salary_date(2024, 9, 10), NaiveDate::from_ymd_opt(2024, 9, 10));
    }

    #[test]
    fn test_missing_targets_default_to_zero() {
        let config = FixedScheduleConfig::default();
        let period = Period::month(2024, 9).unwrap();
        let mut ledger = Ledger::new();
        let mut rng = RngManager::new(1);

        let residual = FixedSchedule::new(&config)
            .emit(&mut rng, &TargetSheet::new(), &period, &mut ledger)
            .unwrap();

        let salary = ledger.iter().find(|t| t.sub_category() == SALARY_KEY).unwrap();
        assert_eq!(salary.amount(), 0);
        // utility target below the fixed bills → no electricity budget
        assert_eq!(residual[ELECTRICITY_BUDGET_KEY], 0);
    }

    #[test]
    fn test_residual_electricity_target() {
        let config = FixedScheduleConfig {
            water_bill: (550_000.0, 550_000.0),
            ..Default::default()
        };
        let period = Period::month(2024, 9).unwrap();
        let mut ledger = Ledger::new();
        let mut rng = SequenceRng::new(vec![0.5]);

        let residual = FixedSchedule::new(&config)
            .emit(&mut rng, &targets(), &period, &mut ledger)
            .unwrap();

        assert_eq!(residual[ELECTRICITY_BUDGET_KEY], 1_500_000 - 425_000 - 550_000);
        let water = ledger
            .iter()
            .find(|t| t.description() == "Pembayaran Tagihan Air PDAM")
            .unwrap();
        assert_eq!(water.amount(), 550_000);
        // promo, depreciation, dues, water amount, wifi day, water day
        assert_eq!(rng.draws(), 6);
    }

    #[test]
    fn test_random_days_within_windows() {
        let config = FixedScheduleConfig::default();
        let period = Period::month(2024, 9).unwrap();

        for seed in 1..50 {
            let mut ledger = Ledger::new();
            let mut rng = RngManager::new(seed);
            FixedSchedule::new(&config)
                .emit(&mut rng, &targets(), &period, &mut ledger)
                .unwrap();

            let day_of = |desc: &str| {
                let tx = ledger.iter().find(|t| t.description() == desc).unwrap();
                chrono::Datelike::day(&tx.date())
            };
            assert!((1..=5).contains(&day_of("Budget Promosi & Pemasaran")));
            assert!((1..=5).contains(&day_of("Pencatatan Beban Penyusutan")));
            assert!((15..=20).contains(&day_of("Pembayaran Tagihan WIFI Bulanan")));
            assert!((15..=20).contains(&day_of("Pembayaran Tagihan Air PDAM")));
            assert_eq!(day_of("Alokasi Dana Cadangan Sewa"), 1);
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(FixedScheduleConfig::default().validate().is_ok());
        let bad = FixedScheduleConfig {
            wifi_days: (20, 15),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = FixedScheduleConfig {
            monthly_dues: -1,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
