//! Probability aggregation policy.

use crate::trace::VarValue;

/// Which directional probability to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Combines the probabilities of a set of occurrences into one scalar.
///
/// The propagation engine treats this as a replaceable policy; min,
/// max, or weighted variants are legitimate alternatives, but the
/// arithmetic mean is the default and the behavior everything else is
/// calibrated against.
pub trait ProbAggregator: Send + Sync {
    fn aggregate(&self, vars: &[&VarValue], direction: Direction) -> f64;
}

/// Arithmetic mean; returns its configured fallback on empty input.
#[derive(Debug, Clone, Copy)]
pub struct MeanAggregator {
    empty_value: f64,
}

impl MeanAggregator {
    /// `empty_value` is returned for an empty input set; callers pass
    /// the configured UNCERTAIN midpoint.
    pub fn new(empty_value: f64) -> Self {
        Self { empty_value }
    }
}

impl ProbAggregator for MeanAggregator {
    fn aggregate(&self, vars: &[&VarValue], direction: Direction) -> f64 {
        if vars.is_empty() {
            return self.empty_value;
        }
        let sum: f64 = vars
            .iter()
            .map(|value| match direction {
                Direction::Forward => value.forward_prob(),
                Direction::Backward => value.backward_prob(),
            })
            .sum();
        sum / vars.len() as f64
    }
}
