//! Weighted boolean constraints over a node's joint assignment space.

/// The structural rule a constraint encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// A write is believed correct unless all of its inputs are
    /// correct while it is wrong.
    Define,
    /// A read's correctness follows from the correctness of the
    /// statement outcome that used it, with role-derived strength.
    Use,
    /// The branch outcome ties all of the node's variables together.
    Predicate,
    /// External belief inherited from a neighboring node or feedback.
    Prior,
}

/// A weighted boolean proposition over a node-local bit vector.
///
/// Positions are LSB-indexed: reads first, then writes, then the
/// predicate bit when the node is control-dominated. A set bit means
/// "this variable holds a correct value".
#[derive(Debug, Clone)]
pub struct Constraint {
    /// Bitmask of the positions this constraint is defined over.
    pub bits: u32,
    /// The position the constraint concerns.
    pub target: usize,
    /// Probability weight in [0, 1].
    pub weight: f64,
    pub kind: ConstraintKind,
}

impl Constraint {
    pub fn new(bits: u32, target: usize, weight: f64, kind: ConstraintKind) -> Self {
        debug_assert!(bits & (1 << target) != 0, "target must be an included bit");
        Self {
            bits,
            target,
            weight,
            kind,
        }
    }

    /// Likelihood this constraint assigns to one joint assignment.
    ///
    /// `Define`, `Use`, and `Predicate` are implications: the
    /// assignment is penalized (`1 − w`) exactly when every included
    /// premise bit is correct but the target is wrong, and accepted
    /// (`w`) otherwise. `Prior` weights the target bit directly.
    pub fn likelihood(&self, assignment: u32) -> f64 {
        let target_mask = 1u32 << self.target;
        match self.kind {
            ConstraintKind::Define | ConstraintKind::Use | ConstraintKind::Predicate => {
                let premises = self.bits & !target_mask;
                let violated = assignment & self.bits == premises;
                if violated {
                    1.0 - self.weight
                } else {
                    self.weight
                }
            }
            ConstraintKind::Prior => {
                if assignment & target_mask != 0 {
                    self.weight
                } else {
                    1.0 - self.weight
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_penalizes_correct_inputs_wrong_output() {
        // Two reads (bits 0, 1), one write (bit 2).
        let constraint = Constraint::new(0b111, 2, 0.95, ConstraintKind::Define);

        // Both reads correct, write wrong: violated.
        assert_eq!(constraint.likelihood(0b011), 1.0 - 0.95);
        // Both reads correct, write correct: satisfied.
        assert_eq!(constraint.likelihood(0b111), 0.95);
        // A read wrong: the implication holds vacuously.
        assert_eq!(constraint.likelihood(0b001), 0.95);
        assert_eq!(constraint.likelihood(0b000), 0.95);
    }

    #[test]
    fn use_penalizes_correct_outcome_wrong_operand() {
        // Read at bit 0, statement outcome at bit 3.
        let constraint = Constraint::new(0b1001, 0, 0.8, ConstraintKind::Use);

        assert_eq!(constraint.likelihood(0b1000), 1.0 - 0.8);
        assert_eq!(constraint.likelihood(0b1001), 0.8);
        // Outcome wrong: no penalty regardless of the operand.
        assert_eq!(constraint.likelihood(0b0000), 0.8);
    }

    #[test]
    fn prior_weights_target_bit_directly() {
        let constraint = Constraint::new(0b010, 1, 0.7, ConstraintKind::Prior);
        assert_eq!(constraint.likelihood(0b010), 0.7);
        assert!((constraint.likelihood(0b000) - 0.3).abs() < 1e-12);
        // Other bits are irrelevant.
        assert_eq!(constraint.likelihood(0b111), 0.7);
    }

    #[test]
    fn likelihoods_stay_in_unit_interval() {
        let constraint = Constraint::new(0b11, 1, 0.95, ConstraintKind::Predicate);
        for assignment in 0..4u32 {
            let value = constraint.likelihood(assignment);
            assert!((0.0..=1.0).contains(&value));
        }
    }
}
