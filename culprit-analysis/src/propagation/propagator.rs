//! The forward/backward propagation engine.

use tracing::debug;

use culprit_core::types::collections::FxHashSet;
use culprit_core::{InferenceError, ProbabilityConfig};

use crate::feedback::FeedbackRecord;
use crate::trace::{NodeId, Trace, VarId, VarValue};

use super::aggregator::{Direction, MeanAggregator, ProbAggregator};

/// Spreads correctness belief across the whole trace.
///
/// Five strictly ordered phases over one trace: initialize, cost
/// computation, forward pass (execution order), backward pass (reverse
/// execution order), and combination. Each phase reads state written
/// by the previous one, so no phase is re-entrant and the node order
/// within a phase is a hard requirement.
///
/// The engine mutates probabilities and costs in place on the trace it
/// borrows; it creates no new structures. Variables pinned by the
/// correct/wrong boundary sets are never overwritten, and nodes with
/// recorded feedback are excluded from both passes.
pub struct ProbPropagator<'a> {
    trace: &'a mut Trace,
    sliced: Vec<NodeId>,
    slice_set: FxHashSet<NodeId>,
    correct_vars: &'a FxHashSet<VarId>,
    wrong_vars: &'a FxHashSet<VarId>,
    feedback_nodes: FxHashSet<NodeId>,
    config: &'a ProbabilityConfig,
    aggregator: Box<dyn ProbAggregator>,
    /// Maximum raw node cost observed during the cost phase; the
    /// normalization divisor and the scale for per-node op costs.
    max_cost: f64,
}

impl<'a> ProbPropagator<'a> {
    /// `sliced` is the subset of nodes relevant to the current
    /// analysis, in execution order; pass every node id for a full
    /// trace analysis.
    pub fn new(
        trace: &'a mut Trace,
        sliced: &[NodeId],
        correct_vars: &'a FxHashSet<VarId>,
        wrong_vars: &'a FxHashSet<VarId>,
        feedback_records: &[FeedbackRecord],
        config: &'a ProbabilityConfig,
    ) -> Self {
        let slice_set = sliced.iter().copied().collect();
        let feedback_nodes = feedback_records.iter().map(|record| record.node).collect();
        let aggregator = Box::new(MeanAggregator::new(config.effective_uncertain()));
        Self {
            trace,
            sliced: sliced.to_vec(),
            slice_set,
            correct_vars,
            wrong_vars,
            feedback_nodes,
            config,
            aggregator,
            max_cost: 0.0,
        }
    }

    /// Replace the aggregation policy (default: arithmetic mean).
    pub fn with_aggregator(mut self, aggregator: Box<dyn ProbAggregator>) -> Self {
        self.aggregator = aggregator;
        self
    }

    /// Run all five phases in order.
    pub fn propagate(&mut self) -> Result<(), InferenceError> {
        self.init_prob();
        self.compute_computational_cost();
        self.forward_propagate()?;
        self.backward_propagate();
        self.combine_prob();
        Ok(())
    }

    /// Phase 1: seed every occurrence with UNCERTAIN, then apply the
    /// boundary conditions: correct-set members get forward = HIGH,
    /// wrong-set members get backward = LOW. Covers the full trace,
    /// not just the slice.
    fn init_prob(&mut self) {
        let high = self.config.effective_high();
        let low = self.config.effective_low();
        let uncertain = self.config.effective_uncertain();

        for node in &mut self.trace.nodes {
            for value in node.reads.iter_mut().chain(node.writes.iter_mut()) {
                value.set_all_probability(uncertain);
                if self.correct_vars.contains(&value.var) {
                    value.set_forward_prob(high);
                }
                if self.wrong_vars.contains(&value.var) {
                    value.set_backward_prob(low);
                }
            }
        }
    }

    /// Phase 2: computational cost, in execution order.
    ///
    /// Reads inherit cost from the matching write at their definition
    /// node; a node's cost is the sum of its read costs plus its
    /// modifying-operation count; every write receives the node cost.
    /// Costs are then normalized by the maximum so they lie in [0, 1].
    /// The op-count unit is 1.0; only ratios to the maximum matter
    /// downstream.
    fn compute_computational_cost(&mut self) {
        let mut max_cost = 0.0f64;
        for &id in &self.sliced {
            for read_idx in 0..self.trace.node(id).reads.len() {
                if let Some((def, write_idx)) = self.trace.find_data_dom_var(id, read_idx) {
                    let inherited = self.trace.node(def).writes[write_idx].cost();
                    self.trace.node_mut(id).reads[read_idx].set_cost(inherited);
                }
            }

            let node = self.trace.node(id);
            let cumulated: f64 = node.reads.iter().map(VarValue::cost).sum();
            let cost = cumulated + node.modifying_op_count() as f64;
            max_cost = max_cost.max(cost);

            for write in self.trace.node_mut(id).writes.iter_mut() {
                write.set_cost(cost);
            }
        }
        self.max_cost = max_cost;

        if max_cost > 0.0 {
            for &id in &self.sliced {
                let node = self.trace.node_mut(id);
                for value in node.reads.iter_mut().chain(node.writes.iter_mut()) {
                    value.set_cost(value.cost() / max_cost);
                }
            }
        }
    }

    /// A node's operation cost on the normalized scale.
    fn op_cost(&self, id: NodeId) -> f64 {
        if self.max_cost == 0.0 {
            return 0.0;
        }
        self.trace.node(id).modifying_op_count() as f64 / self.max_cost
    }

    /// Phase 3: forward pass, execution order.
    fn forward_propagate(&mut self) -> Result<(), InferenceError> {
        let high = self.config.effective_high();
        let low = self.config.effective_low();
        let uncertain = self.config.effective_uncertain();

        for index in 0..self.sliced.len() {
            let id = self.sliced[index];
            if self.feedback_nodes.contains(&id) {
                continue;
            }
            // Nothing to propagate through without both sides.
            if self.trace.node(id).reads.is_empty() || self.trace.node(id).writes.is_empty() {
                continue;
            }

            self.pass_forward_prob(id);

            let node = self.trace.node(id);
            let informative: Vec<&VarValue> =
                node.reads.iter().filter(|read| !read.implicit).collect();
            if informative.is_empty() {
                continue;
            }
            let avg_prob = self.aggregator.aggregate(&informative, Direction::Forward);

            if avg_prob <= uncertain {
                // Already-uncertain inputs carry no optimism forward.
                for write in self.trace.node_mut(id).writes.iter_mut() {
                    if self.correct_vars.contains(&write.var) {
                        write.set_all_probability(high);
                    } else if self.wrong_vars.contains(&write.var) {
                        write.set_all_probability(low);
                    } else {
                        write.set_forward_prob(uncertain);
                    }
                }
                continue;
            }

            if self.trace.node(id).is_branch() {
                for write in self.trace.node_mut(id).writes.iter_mut() {
                    if self.wrong_vars.contains(&write.var) {
                        write.set_all_probability(low);
                    } else {
                        write.set_forward_prob(avg_prob);
                    }
                }
            } else {
                let written_cost = self.trace.node(id).writes[0].cost();
                let op_cost = self.op_cost(id);
                let mut discount = if written_cost == 0.0 {
                    1.0
                } else {
                    1.0 - op_cost / written_cost
                };
                if discount == 0.0 {
                    discount = 1.0;
                }
                let raw = avg_prob * discount;
                if raw < 0.0 {
                    return Err(InferenceError::NegativeProbability {
                        order: self.trace.node(id).order,
                        value: raw,
                    });
                }
                let prob = raw.max(uncertain);
                for write in self.trace.node_mut(id).writes.iter_mut() {
                    if self.correct_vars.contains(&write.var) {
                        write.set_all_probability(high);
                    } else if self.wrong_vars.contains(&write.var) {
                        write.set_all_probability(low);
                    } else {
                        write.set_forward_prob(prob);
                    }
                }
            }
        }
        Ok(())
    }

    /// Pull each read's forward probability from the matching write at
    /// its definition node. Pinned reads snap to their boundary value;
    /// reads without a definition fall back to UNCERTAIN.
    fn pass_forward_prob(&mut self, id: NodeId) {
        let high = self.config.effective_high();
        let low = self.config.effective_low();
        let uncertain = self.config.effective_uncertain();

        for read_idx in 0..self.trace.node(id).reads.len() {
            let var = self.trace.node(id).reads[read_idx].var;
            if self.correct_vars.contains(&var) {
                self.trace.node_mut(id).reads[read_idx].set_all_probability(high);
                continue;
            }
            if self.wrong_vars.contains(&var) {
                self.trace.node_mut(id).reads[read_idx].set_all_probability(low);
                continue;
            }
            let pulled = match self.trace.find_data_dom_var(id, read_idx) {
                Some((def, write_idx)) => self.trace.node(def).writes[write_idx].forward_prob(),
                None => uncertain,
            };
            self.trace.node_mut(id).reads[read_idx].set_forward_prob(pulled);
        }
    }

    /// Phase 4: backward pass, reverse execution order.
    fn backward_propagate(&mut self) {
        let high = self.config.effective_high();
        let uncertain = self.config.effective_uncertain();

        for index in (0..self.sliced.len()).rev() {
            let id = self.sliced[index];
            if self.feedback_nodes.contains(&id) {
                continue;
            }

            // Writes pull from their dependents even when the node
            // itself is skipped below.
            self.pass_backward_prob(id);

            if self.trace.node(id).reads.is_empty() || self.trace.node(id).writes.is_empty() {
                continue;
            }

            // A correct branch outcome carries no blame.
            if let Some(condition) = self.trace.node(id).condition_result() {
                if !self.wrong_vars.contains(&condition.var) {
                    continue;
                }
            }

            let node = self.trace.node(id);
            let writes: Vec<&VarValue> = node.writes.iter().collect();
            let avg_prob = self.aggregator.aggregate(&writes, Direction::Backward);
            let cumulative_cost = node.writes[0].cost();
            let op_cost = self.op_cost(id);

            // How much of the blame this node's own work could explain.
            let gain = if cumulative_cost != 0.0 {
                (uncertain - avg_prob) * (op_cost / cumulative_cost)
            } else {
                0.0
            };
            self.trace.node_mut(id).gain = gain;

            let total_cost: f64 = self.trace.node(id).reads.iter().map(VarValue::cost).sum();

            for read_idx in 0..self.trace.node(id).reads.len() {
                let var = self.trace.node(id).reads[read_idx].var;
                if self.wrong_vars.contains(&var) || self.correct_vars.contains(&var) {
                    continue;
                }

                let read = &mut self.trace.node_mut(id).reads[read_idx];
                if read.implicit {
                    // The receiver is never blamed.
                    read.set_backward_prob(high);
                    continue;
                }

                let mut factor = 1.0;
                if total_cost != 0.0 && read.cost() != total_cost {
                    factor = 1.0 - read.cost() / total_cost;
                }
                read.set_backward_prob(avg_prob + gain * factor);
            }
        }

        self.log_backward_diagnostics();
    }

    /// Pull each write's backward probability from its in-slice
    /// dependents, and a branch's condition result from the writes of
    /// its in-slice control dependents.
    fn pass_backward_prob(&mut self, id: NodeId) {
        let high = self.config.effective_high();
        let low = self.config.effective_low();
        let uncertain = self.config.effective_uncertain();

        for write_idx in 0..self.trace.node(id).writes.len() {
            let var = self.trace.node(id).writes[write_idx].var;
            if self.wrong_vars.contains(&var) {
                self.trace.node_mut(id).writes[write_idx].set_all_probability(low);
                continue;
            }

            // Largest backward probability among the dependents still
            // inside the analyzed slice.
            let mut pulled: Option<f64> = None;
            for &dependent in self.trace.data_dependents(id, write_idx) {
                if !self.slice_set.contains(&dependent) {
                    continue;
                }
                if let Some(read) = self.trace.read_var(dependent, var) {
                    let prob = read.backward_prob();
                    pulled = Some(pulled.map_or(prob, |best| best.max(prob)));
                }
            }
            self.trace
                .node_mut(id)
                .writes[write_idx]
                .set_backward_prob(pulled.unwrap_or(uncertain));
        }

        // A branch's condition result averages the backward belief of
        // everything it controlled.
        if let Some(condition) = self.trace.node(id).condition_result() {
            let var = condition.var;
            if self.correct_vars.contains(&var) {
                if let Some(condition) = self.trace.node_mut(id).condition_result_mut() {
                    condition.set_all_probability(high);
                }
                return;
            }
            if self.wrong_vars.contains(&var) {
                if let Some(condition) = self.trace.node_mut(id).condition_result_mut() {
                    condition.set_all_probability(low);
                }
                return;
            }

            let mut sum = 0.0;
            let mut count = 0usize;
            for &dependent in &self.trace.node(id).control_dependents {
                if !self.slice_set.contains(&dependent) {
                    continue;
                }
                for write in &self.trace.node(dependent).writes {
                    sum += write.backward_prob();
                    count += 1;
                }
            }
            let avg = if count == 0 { uncertain } else { sum / count as f64 };
            if let Some(condition) = self.trace.node_mut(id).condition_result_mut() {
                condition.set_backward_prob(avg);
            }
        }
    }

    /// Phase 5: combined probability = (forward + backward) / 2.
    fn combine_prob(&mut self) {
        for &id in &self.sliced {
            let node = self.trace.node_mut(id);
            for value in node.reads.iter_mut().chain(node.writes.iter_mut()) {
                let avg = (value.forward_prob() + value.backward_prob()) / 2.0;
                value.set_probability(avg);
            }
        }
    }

    /// The most explanatory node and the busiest node, for debugging
    /// recommendation quality.
    fn log_backward_diagnostics(&self) {
        let mut max_gain = f64::NEG_INFINITY;
        let mut max_gain_order = 0;
        let mut max_ops = 0usize;
        let mut max_ops_order = 0;
        for &id in &self.sliced {
            let node = self.trace.node(id);
            if node.gain > max_gain {
                max_gain = node.gain;
                max_gain_order = node.order;
            }
            let ops = node.modifying_op_count();
            if ops > max_ops {
                max_ops = ops;
                max_ops_order = node.order;
            }
        }
        debug!(
            max_gain,
            max_gain_order, max_ops, max_ops_order, "backward pass finished"
        );
    }
}
