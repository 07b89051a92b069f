//! Trace nodes, one executed statement occurrence each.

use smallvec::SmallVec;

use super::opcode::OpCategory;
use super::value::VarValue;

/// Arena handle of a trace node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// One executed statement occurrence.
///
/// Invariants, enforced by [`super::TraceBuilder`]:
/// - a node is a branch iff `condition_idx` is `Some`, and the
///   condition result is one of its written occurrences;
/// - every node in `control_dependents` references this node as its
///   `control_dom`, and vice versa.
#[derive(Debug, Clone)]
pub struct TraceNode {
    /// Execution order, unique and ascending, starting at 1.
    pub order: usize,
    /// Read variable occurrences, in source order.
    pub reads: SmallVec<[VarValue; 4]>,
    /// Written variable occurrences, in source order.
    pub writes: SmallVec<[VarValue; 2]>,
    /// Nearest enclosing branch that determined this node executed.
    pub control_dom: Option<NodeId>,
    /// Nodes whose execution this node's branch outcome determined.
    /// Populated only for branch nodes.
    pub control_dependents: Vec<NodeId>,
    /// Index into `writes` of the condition result. `Some` iff this
    /// node is a branch.
    pub(crate) condition_idx: Option<usize>,
    /// Bytecode operations this node performed, for the cost model.
    pub ops: Vec<OpCategory>,
    /// Probability that this node's branch predicate is correct.
    pub predicate_prob: f64,
    /// Backward-pass gain: how much blame this node could explain.
    pub gain: f64,
}

impl TraceNode {
    pub(crate) fn new(order: usize) -> Self {
        Self {
            order,
            reads: SmallVec::new(),
            writes: SmallVec::new(),
            control_dom: None,
            control_dependents: Vec::new(),
            condition_idx: None,
            ops: Vec::new(),
            predicate_prob: 0.5,
            gain: 0.0,
        }
    }

    /// True iff this node is a branch (has a condition-result variable).
    pub fn is_branch(&self) -> bool {
        self.condition_idx.is_some()
    }

    /// The condition-result occurrence of a branch node.
    pub fn condition_result(&self) -> Option<&VarValue> {
        self.condition_idx.map(|idx| &self.writes[idx])
    }

    pub fn condition_result_mut(&mut self) -> Option<&mut VarValue> {
        self.condition_idx.map(|idx| &mut self.writes[idx])
    }

    /// Number of modifying bytecode operations this node performed.
    pub fn modifying_op_count(&self) -> usize {
        self.ops.iter().filter(|op| op.is_modifying()).count()
    }

    /// Joint-table bit count for the constraint encoder:
    /// reads + writes + one predicate bit when control-dominated.
    pub fn encoded_variable_count(&self) -> usize {
        self.reads.len() + self.writes.len() + usize::from(self.control_dom.is_some())
    }
}
