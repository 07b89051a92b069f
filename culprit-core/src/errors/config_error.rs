//! Configuration errors.

use super::error_code::{self, CulpritErrorCode};

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid threshold `{name}`: {value} (expected {expected})")]
    InvalidThreshold {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("Threshold ordering violated: low {low} < uncertain {uncertain} < high {high} required")]
    ThresholdOrdering { low: f64, uncertain: f64, high: f64 },

    #[error("max_encoded_variables {0} exceeds the 30-bit joint-table limit")]
    EncodingCapTooLarge(u32),
}

impl CulpritErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }
}
