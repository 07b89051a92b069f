//! Per-node Bayesian constraint encoding.
//!
//! For each trace node, a set of weighted boolean constraints over the
//! node's variables (one bit per read, one per write, and, when the node is
//! control-dominated, one for its predicate) induces a joint distribution
//! over all 2^k correct/incorrect assignments. Exact marginalization
//! over that table yields every variable's probability of holding a
//! correct value. The pass is repeatable: iterating over all nodes
//! until nothing moves by more than the convergence threshold reaches
//! a fixed point.

pub mod bits;
pub mod constraint;
pub mod variable_encoder;

pub use bits::indices_with_bit;
pub use constraint::{Constraint, ConstraintKind};
pub use variable_encoder::VariableEncoder;
