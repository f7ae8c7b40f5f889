//! Compliance Gate.
//!
//! Stateless audit of a script plus its seed metadata. Applied twice per
//! job: once before any provider call (fail fast, spend nothing) and again
//! on the final script before an artifact may reach `done`.

pub mod gate;
pub mod lexicon;

pub use gate::{apply_safe_language, ComplianceConfig, ComplianceGate};
