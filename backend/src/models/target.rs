//! Monthly target sheet
//!
//! A target sheet maps category keys to the amount that must be spent over
//! the period. Sheets arrive as flat JSON objects that may also carry report
//! metadata (`"Tanggal Laporan": "2024-09-30"`); numeric values become
//! targets, string values are kept as metadata.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TargetError {
    #[error("Target sheet must be a JSON object")]
    NotAnObject,

    #[error("Target '{key}' has negative amount {amount}")]
    NegativeAmount { key: String, amount: f64 },

    #[error("Target '{key}' must be a number or a string")]
    InvalidValue { key: String },

    #[error("Invalid target JSON: {0}")]
    Json(String),
}

/// Immutable set of per-category targets plus report metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSheet {
    amounts: BTreeMap<String, i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<String, String>,
}

impl TargetSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of one target amount
    pub fn with_amount(mut self, key: impl Into<String>, amount: i64) -> Self {
        self.amounts.insert(key.into(), amount.max(0));
        self
    }

    /// Builder-style insert of one metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Parse a flat JSON object
    ///
    /// Numbers are rounded to whole currency units; strings are metadata;
    /// `null` entries are skipped.
    ///
    /// # Example
    /// ```
    /// use expense_simulator_core_rs::TargetSheet;
    /// use serde_json::json;
    ///
    /// let sheet = TargetSheet::from_json_value(&json!({
    ///     "Belanja Bahan Baku (COGS)": 1_000_000,
    ///     "Operasional|Utilitas": 1_500_000.4,
    ///     "Tanggal Laporan": "2024-09-30"
    /// }))
    /// .unwrap();
    /// assert_eq!(sheet.amount("Operasional|Utilitas"), 1_500_000);
    /// assert_eq!(sheet.amount("Operasional|Lain-lain"), 0);
    /// assert_eq!(sheet.metadata("Tanggal Laporan"), Some("2024-09-30"));
    /// ```
    pub fn from_json_value(value: &Value) -> Result<Self, TargetError> {
        let object = value.as_object().ok_or(TargetError::NotAnObject)?;
        let mut sheet = Self::new();

        for (key, entry) in object {
            match entry {
                Value::Number(n) => {
                    let amount = n.as_f64().ok_or_else(|| TargetError::InvalidValue {
                        key: key.clone(),
                    })?;
                    if !amount.is_finite() {
                        return Err(TargetError::InvalidValue { key: key.clone() });
                    }
                    if amount < 0.0 {
                        return Err(TargetError::NegativeAmount {
                            key: key.clone(),
                            amount,
                        });
                    }
                    sheet.amounts.insert(key.clone(), amount.round() as i64);
                }
                Value::String(s) => {
                    sheet.metadata.insert(key.clone(), s.clone());
                }
                Value::Null => {}
                _ => return Err(TargetError::InvalidValue { key: key.clone() }),
            }
        }

        Ok(sheet)
    }

    /// Parse a JSON document (see [`TargetSheet::from_json_value`])
    pub fn from_json_str(json: &str) -> Result<Self, TargetError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| TargetError::Json(e.to_string()))?;
        Self::from_json_value(&value)
    }

    /// Target for `key`; missing keys mean "no budget" and return 0
    pub fn amount(&self, key: &str) -> i64 {
        self.amounts.get(key).copied().unwrap_or(0)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.amounts.contains_key(key)
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// All numeric targets in key order
    pub fn amounts(&self) -> impl Iterator<Item = (&str, i64)> {
        self.amounts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}
