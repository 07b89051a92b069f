//! The trace arena and its precomputed dependency indices.

use super::node::{NodeId, TraceNode};
use super::value::{VarId, VarValue};

/// A full recorded execution: trace nodes in execution order plus the
/// two data-dependency indices.
///
/// Both dependency queries are lookups into indices computed once at
/// construction ([`super::TraceBuilder::build`]): O(1) for the
/// definition query, O(out-degree) for the use query.
#[derive(Debug, Clone)]
pub struct Trace {
    pub(crate) nodes: Vec<TraceNode>,
    /// Per node, per read occurrence: the node whose write produced
    /// the value, if any.
    pub(crate) read_defs: Vec<Vec<Option<NodeId>>>,
    /// Per node, per write occurrence: the nodes that read the value
    /// before it was redefined.
    pub(crate) write_uses: Vec<Vec<Vec<NodeId>>>,
}

impl Trace {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &TraceNode {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut TraceNode {
        &mut self.nodes[id.index()]
    }

    /// All node ids in execution order.
    pub fn node_ids(&self) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }

    /// Data-dependency predecessor: the node whose write produced the
    /// value read at `read_idx` of `id`, or `None` for trace inputs.
    pub fn data_dependency(&self, id: NodeId, read_idx: usize) -> Option<NodeId> {
        self.read_defs[id.index()][read_idx]
    }

    /// Data-dependency successors: all nodes that read the value
    /// written at `write_idx` of `id` before it was redefined.
    pub fn data_dependents(&self, id: NodeId, write_idx: usize) -> &[NodeId] {
        &self.write_uses[id.index()][write_idx]
    }

    /// The written occurrence that produced the value read at
    /// `read_idx` of `id`: the matching write at the definition node.
    pub fn find_data_dom_var(&self, id: NodeId, read_idx: usize) -> Option<(NodeId, usize)> {
        let var = self.node(id).reads[read_idx].var;
        let def = self.data_dependency(id, read_idx)?;
        self.write_index_of(def, var).map(|write_idx| (def, write_idx))
    }

    /// Index into `writes` of the occurrence of `var` at `id`.
    pub fn write_index_of(&self, id: NodeId, var: VarId) -> Option<usize> {
        self.node(id).writes.iter().position(|w| w.var == var)
    }

    /// The written occurrence of `var` at `id`.
    pub fn written_var(&self, id: NodeId, var: VarId) -> Option<&VarValue> {
        self.node(id).writes.iter().find(|w| w.var == var)
    }

    /// The read occurrence of `var` at `id`.
    pub fn read_var(&self, id: NodeId, var: VarId) -> Option<&VarValue> {
        self.node(id).reads.iter().find(|r| r.var == var)
    }
}
