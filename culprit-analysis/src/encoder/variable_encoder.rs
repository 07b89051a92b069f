//! Per-node exact marginalization over the joint assignment space.

use rayon::prelude::*;
use tracing::{debug, trace};

use culprit_core::types::collections::FxHashSet;
use culprit_core::{InferenceError, ProbabilityConfig, UseWeightPolicy};

use crate::trace::{NodeId, Trace, VarId};

use super::bits::indices_with_bit;
use super::constraint::{Constraint, ConstraintKind};

/// Derives per-variable correctness probabilities for each trace node
/// from weighted boolean constraints, by enumerating the node's joint
/// assignment space exactly.
///
/// The pass is independent across nodes within a round and repeatable:
/// callers iterate [`encode`](Self::encode) until no node reports a
/// change, or bound the iteration with
/// [`encode_to_fixed_point`](Self::encode_to_fixed_point).
pub struct VariableEncoder<'a> {
    trace: &'a mut Trace,
    correct_vars: &'a FxHashSet<VarId>,
    wrong_vars: &'a FxHashSet<VarId>,
    config: &'a ProbabilityConfig,
    policy: &'a dyn UseWeightPolicy,
}

impl<'a> VariableEncoder<'a> {
    pub fn new(
        trace: &'a mut Trace,
        correct_vars: &'a FxHashSet<VarId>,
        wrong_vars: &'a FxHashSet<VarId>,
        config: &'a ProbabilityConfig,
        policy: &'a dyn UseWeightPolicy,
    ) -> Self {
        Self {
            trace,
            correct_vars,
            wrong_vars,
            config,
            policy,
        }
    }

    /// One encoding round over every node in execution order.
    ///
    /// Returns whether any marginal moved by more than the convergence
    /// threshold.
    pub fn encode(&mut self) -> Result<bool, InferenceError> {
        let mut changed = false;
        let ids: Vec<NodeId> = self.trace.node_ids().collect();
        for id in ids {
            let node_changed = self.encode_node(id)?;
            changed |= node_changed;
        }
        Ok(changed)
    }

    /// Iterate encoding rounds until a fixed point or `max_rounds`.
    ///
    /// Returns the number of rounds run. The round budget is the
    /// caller's latency bound; the algorithm itself has no timeout.
    pub fn encode_to_fixed_point(&mut self, max_rounds: usize) -> Result<usize, InferenceError> {
        let mut rounds = 0;
        while rounds < max_rounds {
            rounds += 1;
            if !self.encode()? {
                break;
            }
        }
        debug!(rounds, "encoder fixed-point iteration finished");
        Ok(rounds)
    }

    /// Encode one node, updating its variables' combined probabilities
    /// and, when control-dominated, its dominator's predicate
    /// probability in place.
    ///
    /// Returns `Ok(false)` without touching anything when the node has
    /// no variables at all or its joint table would exceed the
    /// configured bit cap.
    pub fn encode_node(&mut self, id: NodeId) -> Result<bool, InferenceError> {
        let node = self.trace.node(id);
        let read_len = node.reads.len();
        let write_len = node.writes.len();
        if read_len == 0 && write_len == 0 {
            // No-op line: nothing to infer about.
            return Ok(false);
        }

        let total = node.encoded_variable_count();
        if total > self.config.effective_max_encoded_variables() as usize {
            // Hard cap: the joint table has 2^total entries. Skipping
            // preserves the node's previous probabilities.
            trace!(order = node.order, variables = total, "skipping oversized node");
            return Ok(false);
        }

        let order = node.order;
        let control_dom = node.control_dom;
        let constraints = self.build_constraints(id, read_len, write_len, total);

        // Memoized per-assignment products: each entry is reused when
        // marginalizing every bit position.
        let size = 1usize << total;
        let products: Vec<f64> = (0..size as u32)
            .into_par_iter()
            .map(|assignment| {
                constraints
                    .iter()
                    .map(|constraint| constraint.likelihood(assignment))
                    .product()
            })
            .collect();
        let denominator: f64 = products.iter().sum();
        if denominator == 0.0 {
            // Every assignment has zero mass: the constraints
            // contradict each other, which is a modeling bug.
            return Err(InferenceError::ZeroJointMass { order });
        }

        let threshold = self.config.effective_convergence_threshold();
        let mut changed = false;
        for position in 0..total {
            let masked_sum: f64 = indices_with_bit(total as u32, position as u32)
                .iter()
                .map(|&index| products[index as usize])
                .sum();
            let marginal = masked_sum / denominator;

            if position < read_len + write_len {
                let node = self.trace.node_mut(id);
                let value = if position < read_len {
                    &mut node.reads[position]
                } else {
                    &mut node.writes[position - read_len]
                };
                if (value.probability() - marginal).abs() > threshold {
                    changed = true;
                }
                value.set_probability(marginal);
            } else if let Some(dom_id) = control_dom {
                // The predicate position belongs to the dominator.
                let dom = self.trace.node_mut(dom_id);
                if (dom.predicate_prob - marginal).abs() > threshold {
                    changed = true;
                }
                dom.predicate_prob = marginal;
            }
        }
        Ok(changed)
    }

    /// Structural constraints (DEFINE / USE / PREDICATE) plus priors
    /// inherited from neighbors and from the pinned boundary sets.
    ///
    /// Positions are LSB-indexed: reads, then writes, then the
    /// predicate bit when the node is control-dominated.
    fn build_constraints(
        &self,
        id: NodeId,
        read_len: usize,
        write_len: usize,
        total: usize,
    ) -> Vec<Constraint> {
        let node = self.trace.node(id);
        let high = self.config.effective_high();
        let low = self.config.effective_low();
        let uncertain = self.config.effective_uncertain();
        let has_dom = node.control_dom.is_some();

        let all_reads: u32 = (1 << read_len) - 1;
        let predicate_bit: u32 = if has_dom { 1 << (total - 1) } else { 0 };
        let mut constraints = Vec::new();

        // DEFINE: a write is correct unless all of its inputs (and the
        // governing predicate) are correct while it is wrong.
        for write_idx in 0..write_len {
            let target = read_len + write_idx;
            let bits = all_reads | (1 << target) | predicate_bit;
            constraints.push(Constraint::new(bits, target, high, ConstraintKind::Define));
        }

        // USE: a read is tied to the statement outcome, the predicate
        // bit when present, otherwise the last variable position,
        // with a strength derived from its syntactic role.
        let outcome = total - 1;
        for (read_idx, read) in node.reads.iter().enumerate() {
            let weight = self.policy.use_weight(read.role, self.config);
            let bits = (1 << read_idx) | (1 << outcome);
            constraints.push(Constraint::new(bits, read_idx, weight, ConstraintKind::Use));
        }

        // PREDICATE: the branch outcome ties every variable together.
        if has_dom {
            let bits = (1 << total) - 1;
            constraints.push(Constraint::new(bits, total - 1, high, ConstraintKind::Predicate));
        }

        // Prior from the dominator's current predicate probability.
        if let Some(dom) = node.control_dom {
            constraints.push(Constraint::new(
                predicate_bit,
                total - 1,
                self.trace.node(dom).predicate_prob,
                ConstraintKind::Prior,
            ));
        }

        // Per-read priors: pinned boundary values, else the matching
        // written occurrence at the definition node when informative.
        for (read_idx, read) in node.reads.iter().enumerate() {
            let bits = 1 << read_idx;
            if self.correct_vars.contains(&read.var) {
                constraints.push(Constraint::new(bits, read_idx, high, ConstraintKind::Prior));
            } else if self.wrong_vars.contains(&read.var) {
                constraints.push(Constraint::new(bits, read_idx, low, ConstraintKind::Prior));
            } else if let Some((def, write_idx)) = self.trace.find_data_dom_var(id, read_idx) {
                let prob = self.trace.node(def).writes[write_idx].probability();
                if prob != uncertain {
                    constraints.push(Constraint::new(bits, read_idx, prob, ConstraintKind::Prior));
                }
            }
        }

        // Per-write priors: pinned boundary values, else one prior per
        // dependent node whose matching read is informative.
        for (write_idx, write) in node.writes.iter().enumerate() {
            let target = read_len + write_idx;
            let bits = 1 << target;
            if self.correct_vars.contains(&write.var) {
                constraints.push(Constraint::new(bits, target, high, ConstraintKind::Prior));
                continue;
            }
            if self.wrong_vars.contains(&write.var) {
                constraints.push(Constraint::new(bits, target, low, ConstraintKind::Prior));
                continue;
            }
            for &dependent in self.trace.data_dependents(id, write_idx) {
                if let Some(read) = self.trace.read_var(dependent, write.var) {
                    let prob = read.probability();
                    if prob != uncertain {
                        constraints.push(Constraint::new(bits, target, prob, ConstraintKind::Prior));
                    }
                }
            }
        }

        constraints
    }
}
