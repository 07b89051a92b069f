//! UseWeightPolicy trait: per-role USE-constraint weights.
//!
//! How strongly a read variable's correctness follows from the
//! correctness of the statement that uses it depends on the syntactic
//! role of the occurrence: an arithmetic operand is tightly coupled to
//! the result, an array index or invocation argument much less so.
//! The exact weights are domain-tuned, so the mapping is a trait with
//! a static default rather than a fixed table.

use serde::{Deserialize, Serialize};

use crate::config::ProbabilityConfig;

/// Syntactic role of a read variable occurrence in its statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarRole {
    /// Operand of an arithmetic expression.
    ArithmeticOperand,
    /// Operand of a logical (boolean) expression.
    LogicalOperand,
    /// Operand of a comparison.
    ComparisonOperand,
    /// Index of an array access.
    ArrayIndex,
    /// Argument of a method invocation.
    InvocationArgument,
    /// Receiver of a field access or invocation (`this`-like).
    Receiver,
    /// The condition expression of a branch.
    Condition,
    /// Right-hand side of a plain assignment.
    AssignmentSource,
    /// Role could not be determined from the instrumentation data.
    Unknown,
}

impl VarRole {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ArithmeticOperand => "arithmetic_operand",
            Self::LogicalOperand => "logical_operand",
            Self::ComparisonOperand => "comparison_operand",
            Self::ArrayIndex => "array_index",
            Self::InvocationArgument => "invocation_argument",
            Self::Receiver => "receiver",
            Self::Condition => "condition",
            Self::AssignmentSource => "assignment_source",
            Self::Unknown => "unknown",
        }
    }
}

/// Provider of USE-constraint weights by variable role.
///
/// The default implementation returns the static table. A trace
/// frontend with richer syntax information can implement this trait to
/// supply tuned weights.
pub trait UseWeightPolicy: Send + Sync {
    /// Weight of the USE constraint for a read occurrence in `role`.
    fn use_weight(&self, role: VarRole, config: &ProbabilityConfig) -> f64 {
        StaticUseWeights.static_weight(role, config)
    }
}

/// Static default weights: arithmetic/logical/comparison/assignment
/// operands propagate strongly, index/invocation/receiver operands
/// weakly.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticUseWeights;

impl StaticUseWeights {
    fn static_weight(&self, role: VarRole, config: &ProbabilityConfig) -> f64 {
        let high = config.effective_high();
        let uncertain = config.effective_uncertain();
        match role {
            VarRole::ArithmeticOperand
            | VarRole::LogicalOperand
            | VarRole::ComparisonOperand
            | VarRole::Condition
            | VarRole::AssignmentSource => high,
            VarRole::ArrayIndex | VarRole::InvocationArgument | VarRole::Receiver => {
                (high + uncertain) / 2.0
            }
            VarRole::Unknown => high,
        }
    }
}

impl UseWeightPolicy for StaticUseWeights {}
