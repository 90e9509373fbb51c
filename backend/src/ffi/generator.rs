//! PyO3 wrapper for ExpenseGenerator

use chrono::NaiveDate;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::types::{dict_to_json, generation_err, json_to_py, target_err};
use crate::orchestrator::{ExpenseGenerator, GeneratorConfig};
use crate::report::{export_records, TargetSummary};
use crate::TargetSheet;

/// Python wrapper for the expense generator
///
/// # Example (from Python)
///
/// ```python
/// from expense_simulator_core_rs import ExpenseGenerator
///
/// gen = ExpenseGenerator({"rng_seed": 7})
/// rows = gen.generate({"Belanja Bahan Baku (COGS)": 6_000_000}, "2024-09-01", "2024-09-30")
/// print(rows[0]["ID_Transaksi"], rows[0]["Nominal"])
/// ```
#[pyclass(name = "ExpenseGenerator")]
pub struct PyExpenseGenerator {
    inner: ExpenseGenerator,
}

fn parse_date(value: &str) -> PyResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
        PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
            "Invalid date '{}': {}",
            value, e
        ))
    })
}

#[pymethods]
impl PyExpenseGenerator {
    /// Create a generator; `config` may be omitted or partial
    #[new]
    #[pyo3(signature = (config=None))]
    fn new(config: Option<&Bound<'_, PyDict>>) -> PyResult<Self> {
        let config = match config {
            Some(dict) => GeneratorConfig::from_json_str(&dict_to_json(dict)?).map_err(generation_err)?,
            None => GeneratorConfig::default(),
        };
        let inner = ExpenseGenerator::new(config).map_err(generation_err)?;
        Ok(Self { inner })
    }

    /// Generate export rows (list of dicts) for `start..=end`
    fn generate<'py>(
        &mut self,
        py: Python<'py>,
        targets: &Bound<'py, PyDict>,
        start: &str,
        end: &str,
    ) -> PyResult<Bound<'py, PyAny>> {
        let sheet = TargetSheet::from_json_str(&dict_to_json(targets)?).map_err(target_err)?;
        let result = self
            .inner
            .generate(&sheet, parse_date(start)?, parse_date(end)?)
            .map_err(generation_err)?;

        let records = export_records(&result.transactions, &self.inner.config().pic);
        let text = serde_json::to_string(&records).map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(e.to_string())
        })?;
        json_to_py(py, &text)
    }

    /// Target vs actual summary for a set of export rows
    fn summary<'py>(
        &mut self,
        py: Python<'py>,
        targets: &Bound<'py, PyDict>,
        start: &str,
        end: &str,
    ) -> PyResult<Bound<'py, PyAny>> {
        let sheet = TargetSheet::from_json_str(&dict_to_json(targets)?).map_err(target_err)?;
        let result = self
            .inner
            .generate(&sheet, parse_date(start)?, parse_date(end)?)
            .map_err(generation_err)?;

        let summary = TargetSummary::build(
            &sheet,
            &result.transactions,
            &self.inner.config().calibration_policy(),
        );
        let text = serde_json::to_string(&summary).map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(e.to_string())
        })?;
        json_to_py(py, &text)
    }

    /// Current RNG state
    fn rng_state(&self) -> u64 {
        self.inner.rng_state()
    }
}
