//! Trace-wide belief propagation.
//!
//! Forward pass: "this value is derived from believed-correct inputs."
//! Backward pass: "this value contributed to a believed-wrong output."
//! Both are discounted by a computational-cost metric and combined
//! into one probability per variable occurrence.

pub mod aggregator;
pub mod propagator;

pub use aggregator::{Direction, MeanAggregator, ProbAggregator};
pub use propagator::ProbPropagator;
