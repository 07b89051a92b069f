//! Stable error codes for diagnostics and logging.

pub const CONFIG_ERROR: &str = "CULPRIT_CONFIG_ERROR";
pub const INFERENCE_ERROR: &str = "CULPRIT_INFERENCE_ERROR";

/// Every Culprit error carries a stable code so downstream tooling can
/// match on errors without parsing display strings.
pub trait CulpritErrorCode {
    fn error_code(&self) -> &'static str;
}
