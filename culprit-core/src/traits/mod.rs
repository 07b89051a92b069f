//! Pluggable policy traits.

pub mod use_weight;

pub use use_weight::{StaticUseWeights, UseWeightPolicy, VarRole};
