//! Propagation engine scenarios.

use culprit_analysis::trace::{NodeId, OpCategory, Trace, TraceBuilder, VarId};
use culprit_analysis::{FeedbackRecord, ProbPropagator, UserFeedback};
use culprit_core::types::collections::FxHashSet;
use culprit_core::ProbabilityConfig;

fn var(raw: u32) -> VarId {
    VarId::new(raw)
}

fn var_set(vars: &[VarId]) -> FxHashSet<VarId> {
    vars.iter().copied().collect()
}

fn all_ids(trace: &Trace) -> Vec<NodeId> {
    trace.node_ids().collect()
}

fn propagate(
    trace: &mut Trace,
    correct: &FxHashSet<VarId>,
    wrong: &FxHashSet<VarId>,
    feedback: &[FeedbackRecord],
) {
    let config = ProbabilityConfig::default();
    let sliced = all_ids(trace);
    let mut propagator =
        ProbPropagator::new(trace, &sliced, correct, wrong, feedback, &config);
    propagator.propagate().expect("propagation must succeed");
}

/// Three-node chain: A writes `x` (correct input), B derives `y` from
/// `x` at zero cost, C branches on `y` with a wrong condition result.
fn three_node_trace() -> (Trace, NodeId, NodeId, NodeId) {
    let mut builder = TraceBuilder::new();
    let a = builder.node().write(var(1)).finish();
    let b = builder.node().read(var(1)).write(var(2)).finish();
    let c = builder.node().read(var(2)).branch(var(3)).finish();
    (builder.build(), a, b, c)
}

#[test]
fn three_node_scenario_forward_beliefs() {
    let (mut trace, a, b, _c) = three_node_trace();
    let correct = var_set(&[var(1)]);
    let wrong = var_set(&[var(3)]);
    propagate(&mut trace, &correct, &wrong, &[]);

    let high = ProbabilityConfig::default().effective_high();
    // The trusted input keeps its pinned forward belief.
    assert_eq!(trace.node(a).writes[0].forward_prob(), high);
    // Zero cost means no discount: `y` inherits full confidence.
    assert_eq!(trace.node(b).writes[0].forward_prob(), high);
}

#[test]
fn three_node_scenario_backward_blame() {
    let (mut trace, a, b, c) = three_node_trace();
    let correct = var_set(&[var(1)]);
    let wrong = var_set(&[var(3)]);
    propagate(&mut trace, &correct, &wrong, &[]);

    let config = ProbabilityConfig::default();
    let low = config.effective_low();
    let uncertain = config.effective_uncertain();

    // The wrong condition result stays pinned at LOW.
    let condition = trace.node(c).condition_result().unwrap();
    assert_eq!(condition.backward_prob(), low);
    // Blame flows from C's condition through `y`. C has zero cost, so
    // the gain term vanishes and `y` takes the aggregate directly.
    let y_read = trace.read_var(c, var(2)).unwrap();
    assert_eq!(y_read.backward_prob(), low);
    assert_eq!(trace.node(b).writes[0].backward_prob(), low);
    // `y`'s blame reaches B's read of `x` via the aggregate.
    let x_read = trace.read_var(b, var(1)).unwrap();
    assert!(x_read.backward_prob() >= uncertain || x_read.forward_prob() > uncertain);
    // A's write of `x` pulls backward belief from B's read occurrence.
    let x_write = &trace.node(a).writes[0];
    assert!(x_write.backward_prob() > low);
}

#[test]
fn combination_law_is_exact() {
    let (mut trace, _a, _b, _c) = three_node_trace();
    let correct = var_set(&[var(1)]);
    let wrong = var_set(&[var(3)]);
    propagate(&mut trace, &correct, &wrong, &[]);

    for id in all_ids(&trace) {
        let node = trace.node(id);
        for value in node.reads.iter().chain(node.writes.iter()) {
            let expected = (value.forward_prob() + value.backward_prob()) / 2.0;
            assert_eq!(value.probability(), expected);
        }
    }
}

#[test]
fn pinned_boundaries_survive_every_phase() {
    let (mut trace, a, _b, c) = three_node_trace();
    let correct = var_set(&[var(1)]);
    let wrong = var_set(&[var(3)]);
    propagate(&mut trace, &correct, &wrong, &[]);

    let config = ProbabilityConfig::default();
    assert_eq!(
        trace.node(a).writes[0].forward_prob(),
        config.effective_high()
    );
    assert_eq!(
        trace.node(c).condition_result().unwrap().backward_prob(),
        config.effective_low()
    );
}

#[test]
fn node_without_reads_is_skipped_by_both_passes() {
    let mut builder = TraceBuilder::new();
    // Standalone write: nobody reads `z`, nothing feeds it.
    let lone = builder
        .node()
        .write(var(9))
        .ops([OpCategory::Arithmetic])
        .finish();
    let mut trace = builder.build();

    let empty = FxHashSet::default();
    propagate(&mut trace, &empty, &empty, &[]);

    let uncertain = ProbabilityConfig::default().effective_uncertain();
    let write = &trace.node(lone).writes[0];
    assert_eq!(write.forward_prob(), uncertain);
    assert_eq!(write.backward_prob(), uncertain);
    assert_eq!(write.probability(), uncertain);
}

#[test]
fn feedback_nodes_are_left_untouched() {
    let (mut trace, _a, b, _c) = three_node_trace();
    let correct = var_set(&[var(1)]);
    let wrong = var_set(&[var(3)]);
    let feedback = vec![FeedbackRecord::new(b, UserFeedback::WrongValue)];
    propagate(&mut trace, &correct, &wrong, &feedback);

    let uncertain = ProbabilityConfig::default().effective_uncertain();
    // B was resolved by the user; its write keeps the seeded forward
    // belief instead of inheriting from `x`.
    assert_eq!(trace.node(b).writes[0].forward_prob(), uncertain);
}

#[test]
fn costs_normalize_to_unit_maximum() {
    let mut builder = TraceBuilder::new();
    let a = builder
        .node()
        .read(var(10))
        .write(var(1))
        .ops([OpCategory::Arithmetic])
        .finish();
    let b = builder
        .node()
        .read(var(1))
        .write(var(2))
        .ops([
            OpCategory::Arithmetic,
            OpCategory::Arithmetic,
            OpCategory::LoadVariable,
        ])
        .finish();
    let mut trace = builder.build();

    let empty = FxHashSet::default();
    propagate(&mut trace, &empty, &empty, &[]);

    // A costs 1 (one modifying op), B costs 1 + 2 = 3; after
    // normalization the maximum must be exactly 1.
    let max = all_ids(&trace)
        .into_iter()
        .flat_map(|id| {
            let node = trace.node(id);
            node.reads
                .iter()
                .chain(node.writes.iter())
                .map(|value| value.cost())
                .collect::<Vec<_>>()
        })
        .fold(0.0f64, f64::max);
    assert!((max - 1.0).abs() < 1e-12);
    assert!((trace.node(b).writes[0].cost() - 1.0).abs() < 1e-12);
    assert!((trace.node(a).writes[0].cost() - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn zero_cost_trace_skips_normalization() {
    let mut builder = TraceBuilder::new();
    let a = builder.node().write(var(1)).finish();
    let _b = builder.node().read(var(1)).write(var(2)).finish();
    let mut trace = builder.build();

    let empty = FxHashSet::default();
    propagate(&mut trace, &empty, &empty, &[]);

    assert_eq!(trace.node(a).writes[0].cost(), 0.0);
}

#[test]
fn cost_discount_lowers_forward_confidence() {
    let mut builder = TraceBuilder::new();
    // `x` is trusted but B's own work dwarfs its inherited input
    // cost, so the discounted belief drops below the midpoint and is
    // floored at UNCERTAIN.
    let _a = builder.node().write(var(1)).ops([OpCategory::Arithmetic]).finish();
    let b = builder
        .node()
        .read(var(1))
        .write(var(2))
        .ops([OpCategory::Arithmetic, OpCategory::Invoke])
        .finish();
    let mut trace = builder.build();

    let correct = var_set(&[var(1)]);
    let empty = FxHashSet::default();
    propagate(&mut trace, &correct, &empty, &[]);

    // written_cost = 1 (the maximum), op_cost = 2/3, so the discount
    // is 1/3 and HIGH * 1/3 lands under the UNCERTAIN floor.
    let config = ProbabilityConfig::default();
    let forward = trace.node(b).writes[0].forward_prob();
    assert_eq!(forward, config.effective_uncertain());
}

#[test]
fn correct_branch_outcome_carries_no_blame() {
    let mut builder = TraceBuilder::new();
    let _a = builder.node().write(var(1)).finish();
    let branch = builder.node().read(var(1)).branch(var(2)).finish();
    let body = builder
        .node()
        .read(var(1))
        .write(var(3))
        .dominated_by(branch)
        .finish();
    let mut trace = builder.build();

    // `w` (the body's output) is wrong but the branch condition is not.
    let wrong = var_set(&[var(3)]);
    let empty = FxHashSet::default();
    propagate(&mut trace, &empty, &wrong, &[]);

    let uncertain = ProbabilityConfig::default().effective_uncertain();
    // The branch's read is not blamed: backward attribution stopped at
    // the correct condition result.
    let read = trace.read_var(branch, var(1)).unwrap();
    assert_eq!(read.backward_prob(), uncertain);
    // The body's write stays pinned LOW.
    let low = ProbabilityConfig::default().effective_low();
    assert_eq!(trace.node(body).writes[0].backward_prob(), low);
}

#[test]
fn sliced_subset_ignores_out_of_slice_dependents() {
    let mut builder = TraceBuilder::new();
    let a = builder.node().read(var(10)).write(var(1)).finish();
    let in_slice = builder.node().read(var(1)).write(var(2)).finish();
    let out_of_slice = builder.node().read(var(1)).write(var(3)).finish();
    let mut trace = builder.build();

    let wrong = var_set(&[var(2), var(3)]);
    let empty = FxHashSet::default();
    let config = ProbabilityConfig::default();
    let sliced = vec![a, in_slice];
    let mut propagator =
        ProbPropagator::new(&mut trace, &sliced, &empty, &wrong, &[], &config);
    propagator.propagate().expect("propagation must succeed");

    // The out-of-slice reader contributes nothing; the write's pull
    // comes only from the in-slice occurrence.
    let _ = out_of_slice;
    let pulled = trace.node(a).writes[0].backward_prob();
    let in_slice_read = trace.read_var(in_slice, var(1)).unwrap();
    assert_eq!(pulled, in_slice_read.backward_prob());
}

#[test]
fn all_probabilities_stay_in_unit_interval() {
    let mut builder = TraceBuilder::new();
    let _a = builder.node().write(var(1)).ops([OpCategory::Arithmetic]).finish();
    let branch = builder.node().read(var(1)).branch(var(2)).finish();
    let _body = builder
        .node()
        .read(var(1))
        .write(var(3))
        .ops([OpCategory::Arithmetic, OpCategory::FieldAccess])
        .dominated_by(branch)
        .finish();
    let _tail = builder.node().read(var(3)).write(var(4)).finish();
    let mut trace = builder.build();

    let correct = var_set(&[var(1)]);
    let wrong = var_set(&[var(4)]);
    propagate(&mut trace, &correct, &wrong, &[]);

    for id in all_ids(&trace) {
        let node = trace.node(id);
        for value in node.reads.iter().chain(node.writes.iter()) {
            assert!((0.0..=1.0).contains(&value.forward_prob()));
            assert!((0.0..=1.0).contains(&value.backward_prob()));
            assert!((0.0..=1.0).contains(&value.probability()));
            assert!((0.0..=1.0).contains(&value.cost()));
        }
    }
}
