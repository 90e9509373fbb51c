//! Python bindings (feature `pyo3`)
//!
//! Dicts cross the boundary as JSON so the Rust side parses them with the
//! same serde types the CLI uses.

pub mod generator;
pub mod types;
