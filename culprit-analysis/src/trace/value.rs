//! Variable occurrences and their mutable inference state.

use culprit_core::VarRole;

/// Stable variable identity.
///
/// Two occurrences with equal `VarId` are reads/writes of the same
/// runtime value: a write followed by reads of that write. The
/// correct/wrong boundary sets supplied by the feedback collaborator
/// are sets of `VarId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(u32);

impl VarId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

/// One occurrence of a variable being read or written by a trace node.
///
/// Carries the per-occurrence inference state: directional and combined
/// probabilities plus the normalized computational cost. Probabilities
/// start at 0.5; the propagation engine re-seeds them from its
/// configured UNCERTAIN value before every run.
#[derive(Debug, Clone)]
pub struct VarValue {
    /// Variable identity.
    pub var: VarId,
    /// True for the implicit receiver (`this`) occurrence.
    pub implicit: bool,
    /// Syntactic role of this occurrence, drives the USE weight.
    pub role: VarRole,
    forward_prob: f64,
    backward_prob: f64,
    probability: f64,
    cost: f64,
}

impl VarValue {
    pub fn new(var: VarId, role: VarRole) -> Self {
        Self {
            var,
            implicit: false,
            role,
            forward_prob: 0.5,
            backward_prob: 0.5,
            probability: 0.5,
            cost: 0.0,
        }
    }

    /// Mark this occurrence as the implicit receiver.
    pub fn with_implicit(mut self) -> Self {
        self.implicit = true;
        self
    }

    pub fn forward_prob(&self) -> f64 {
        self.forward_prob
    }

    pub fn set_forward_prob(&mut self, prob: f64) {
        self.forward_prob = prob;
    }

    pub fn backward_prob(&self) -> f64 {
        self.backward_prob
    }

    pub fn set_backward_prob(&mut self, prob: f64) {
        self.backward_prob = prob;
    }

    /// Combined probability of holding a correct value.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn set_probability(&mut self, prob: f64) {
        self.probability = prob;
    }

    /// Set forward, backward, and combined probability at once.
    pub fn set_all_probability(&mut self, prob: f64) {
        self.forward_prob = prob;
        self.backward_prob = prob;
        self.probability = prob;
    }

    /// Computational cost, normalized to [0, 1] after the cost phase.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn set_cost(&mut self, cost: f64) {
        self.cost = cost;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_all_probability_touches_every_field() {
        let mut value = VarValue::new(VarId::new(7), VarRole::Unknown);
        value.set_all_probability(0.95);
        assert_eq!(value.forward_prob(), 0.95);
        assert_eq!(value.backward_prob(), 0.95);
        assert_eq!(value.probability(), 0.95);
    }

    #[test]
    fn implicit_builder_flag() {
        let value = VarValue::new(VarId::new(1), VarRole::Receiver).with_implicit();
        assert!(value.implicit);
    }
}
