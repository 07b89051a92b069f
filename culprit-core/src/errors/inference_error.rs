//! Inference errors.
//!
//! Only modeling-invariant violations surface as errors. Recoverable
//! conditions (missing data dependency, oversized node, empty variable
//! lists) are resolved locally by falling back to the UNCERTAIN value
//! and never reach this enum.

use super::error_code::{self, CulpritErrorCode};

/// Fatal invariant violations during probability inference.
///
/// Both variants indicate a modeling bug, not bad input; the run is
/// aborted with the execution order of the offending node.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Negative probability {value} at trace node {order}")]
    NegativeProbability { order: usize, value: f64 },

    #[error("Joint table has zero total mass at trace node {order}")]
    ZeroJointMass { order: usize },
}

impl CulpritErrorCode for InferenceError {
    fn error_code(&self) -> &'static str {
        error_code::INFERENCE_ERROR
    }
}
