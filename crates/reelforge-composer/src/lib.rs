//! Script Composer.
//!
//! Turns (strategy, seed, intensity, variation seed) into a fully timed
//! [`Script`]. Composition is deterministic for a given variation seed and
//! registry snapshot, which is what makes A/B variations reproducible.

pub mod composer;
pub mod config;
pub mod score;

pub use composer::{seed_bindings, ScriptComposer};
pub use config::ComposerConfig;
