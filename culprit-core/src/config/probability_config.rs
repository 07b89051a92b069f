//! Probability thresholds for the inference algorithms.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Thresholds shared by the constraint encoder and the propagation
/// engine.
///
/// HIGH is the belief assigned to values the user marked correct, LOW
/// to values marked wrong, and UNCERTAIN the non-informative midpoint
/// every variable starts from. Threaded explicitly through both
/// algorithms' entry points; there are no process-wide constants, so
/// tests can run with varied thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProbabilityConfig {
    /// Belief assigned to known-correct values. Default: 0.95.
    pub high: Option<f64>,
    /// Belief assigned to known-wrong values. Default: 0.05.
    pub low: Option<f64>,
    /// Non-informative midpoint. Default: 0.5.
    pub uncertain: Option<f64>,
    /// Encoder fixed-point delta: a marginal that moves by less than
    /// this counts as unchanged. Default: 0.01.
    pub convergence_threshold: Option<f64>,
    /// Per-node cap on joint-table bits (reads + writes + predicate).
    /// The table has 2^k entries, so this is a hard memory bound.
    /// Default: 30. Values above 30 are rejected by `validate`.
    pub max_encoded_variables: Option<u32>,
}

impl ProbabilityConfig {
    /// Returns the effective HIGH belief, defaulting to 0.95.
    pub fn effective_high(&self) -> f64 {
        self.high.unwrap_or(0.95)
    }

    /// Returns the effective LOW belief, defaulting to 0.05.
    pub fn effective_low(&self) -> f64 {
        self.low.unwrap_or(0.05)
    }

    /// Returns the effective UNCERTAIN midpoint, defaulting to 0.5.
    pub fn effective_uncertain(&self) -> f64 {
        self.uncertain.unwrap_or(0.5)
    }

    /// Returns the effective convergence threshold, defaulting to 0.01.
    pub fn effective_convergence_threshold(&self) -> f64 {
        self.convergence_threshold.unwrap_or(0.01)
    }

    /// Returns the effective joint-table bit cap, defaulting to 30.
    pub fn effective_max_encoded_variables(&self) -> u32 {
        self.max_encoded_variables.unwrap_or(30)
    }

    /// Parse a configuration from a TOML string and validate it.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate threshold ranges and ordering.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let high = self.effective_high();
        let low = self.effective_low();
        let uncertain = self.effective_uncertain();

        if !(0.5..=1.0).contains(&high) || high == 0.5 {
            return Err(ConfigError::InvalidThreshold {
                name: "high",
                value: high,
                expected: "a value in (0.5, 1.0]",
            });
        }
        if !(0.0..0.5).contains(&low) {
            return Err(ConfigError::InvalidThreshold {
                name: "low",
                value: low,
                expected: "a value in [0.0, 0.5)",
            });
        }
        if !(low < uncertain && uncertain < high) {
            return Err(ConfigError::ThresholdOrdering {
                low,
                uncertain,
                high,
            });
        }

        let threshold = self.effective_convergence_threshold();
        if threshold <= 0.0 || !threshold.is_finite() {
            return Err(ConfigError::InvalidThreshold {
                name: "convergence_threshold",
                value: threshold,
                expected: "a finite positive value",
            });
        }

        let cap = self.effective_max_encoded_variables();
        if cap > 30 {
            return Err(ConfigError::EncodingCapTooLarge(cap));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ProbabilityConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.effective_high(), 0.95);
        assert_eq!(config.effective_low(), 0.05);
        assert_eq!(config.effective_uncertain(), 0.5);
        assert_eq!(config.effective_max_encoded_variables(), 30);
    }

    #[test]
    fn parses_partial_toml() {
        let config = ProbabilityConfig::from_toml_str("high = 0.9\nlow = 0.1\n").unwrap();
        assert_eq!(config.effective_high(), 0.9);
        assert_eq!(config.effective_low(), 0.1);
        // Unset fields fall back to defaults.
        assert_eq!(config.effective_uncertain(), 0.5);
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let config = ProbabilityConfig {
            uncertain: Some(0.96),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdOrdering { .. })
        ));
    }

    #[test]
    fn rejects_oversized_encoding_cap() {
        let config = ProbabilityConfig {
            max_encoded_variables: Some(31),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EncodingCapTooLarge(31))
        ));
    }

    #[test]
    fn rejects_low_out_of_range() {
        let config = ProbabilityConfig {
            low: Some(0.6),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
