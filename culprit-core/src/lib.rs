//! Core types, traits, errors, and configuration for Culprit.
//!
//! Culprit performs statistical fault localization over recorded
//! execution traces. This crate holds everything the analysis crate
//! needs that is not algorithmic: the probability configuration,
//! subsystem error enums, pluggable-policy traits, and shared
//! collection aliases.

pub mod config;
pub mod errors;
pub mod traits;
pub mod types;

pub use config::ProbabilityConfig;
pub use errors::{ConfigError, CulpritErrorCode, InferenceError};
pub use traits::{StaticUseWeights, UseWeightPolicy, VarRole};
