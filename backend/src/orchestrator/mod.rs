//! Orchestrator - one generation run end to end
//!
//! See `engine.rs` for the run sequence.

pub mod engine;

pub use engine::{ExpenseGenerator, GenerationError, GenerationResult, GeneratorConfig};
