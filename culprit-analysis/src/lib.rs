//! Inference engine for Culprit.
//!
//! Given a recorded trace graph (executed statement occurrences with
//! their read/written variables, control-dominance links, and data
//! dependencies) plus partial human feedback about which values are
//! correct or wrong, this crate computes a probability of correctness
//! for every variable occurrence and every branch predicate.
//!
//! Two cooperating algorithms:
//! 1. [`encoder::VariableEncoder`]: per-node Bayesian constraint
//!    encoding with exact marginalization over the joint assignment
//!    space, iterable to a fixed point.
//! 2. [`propagation::ProbPropagator`]: trace-wide forward/backward
//!    belief propagation discounted by a computational-cost metric.
//!
//! Both mutate probabilities in place on the [`trace::Trace`] they are
//! given; a downstream recommender reads those fields to pick the next
//! step to present.

pub mod encoder;
pub mod feedback;
pub mod propagation;
pub mod trace;

pub use encoder::VariableEncoder;
pub use feedback::{FeedbackRecord, UserFeedback};
pub use propagation::{Direction, MeanAggregator, ProbAggregator, ProbPropagator};
pub use trace::{NodeId, OpCategory, Trace, TraceBuilder, TraceNode, VarId, VarValue};
