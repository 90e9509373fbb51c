//! Run fingerprints
//!
//! SHA-256 over a canonical JSON rendering. Object keys are sorted before
//! hashing so the digest does not depend on field order.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::models::Transaction;
use crate::orchestrator::GenerationError;

/// Hex SHA-256 of any serializable value, with object keys sorted
pub fn canonical_hash<T: Serialize + ?Sized>(value: &T) -> Result<String, GenerationError> {
    let value = serde_json::to_value(value)
        .map_err(|e| GenerationError::Serialization(format!("hash input: {}", e)))?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value))
        .map_err(|e| GenerationError::Serialization(format!("hash input: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Fingerprint of an ordered transaction sequence
///
/// Covers id, date, category, sub-category, description and amount, in
/// order. Two runs with equal fingerprints produced identical output.
pub fn fingerprint(transactions: &[Transaction]) -> Result<String, GenerationError> {
    canonical_hash(transactions)
}
