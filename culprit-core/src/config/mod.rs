//! Configuration for Culprit.
//! TOML-based, serde-derived, validated before use.

pub mod probability_config;

pub use probability_config::ProbabilityConfig;
