//! Conversion helpers for the FFI boundary

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyModule};

use crate::models::TargetError;
use crate::orchestrator::GenerationError;

/// Serialize a Python dict with the stdlib `json` module
pub fn dict_to_json(dict: &Bound<'_, PyDict>) -> PyResult<String> {
    let json = PyModule::import_bound(dict.py(), "json")?;
    json.call_method1("dumps", (dict,))?.extract()
}

/// Parse a JSON string into Python objects
pub fn json_to_py<'py>(py: Python<'py>, text: &str) -> PyResult<Bound<'py, PyAny>> {
    let json = PyModule::import_bound(py, "json")?;
    json.call_method1("loads", (text,))
}

pub fn generation_err(e: GenerationError) -> PyErr {
    match e {
        GenerationError::InvalidConfig(_) | GenerationError::InvalidPeriod { .. } => {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string())
        }
        other => PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(other.to_string()),
    }
}

pub fn target_err(e: TargetError) -> PyErr {
    PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Invalid targets: {}", e))
}
