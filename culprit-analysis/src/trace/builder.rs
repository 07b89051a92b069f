//! Trace construction.
//!
//! The builder is the single place where cross-node links are created:
//! it assigns execution orders, wires control dominator/dependent
//! links in both directions, and precomputes the definition and use
//! indices the inference algorithms query. After `build` the graph
//! structure is immutable; only per-occurrence probabilities and costs
//! are mutated by the algorithms.

use culprit_core::types::collections::FxHashMap;
use culprit_core::VarRole;

use super::graph::Trace;
use super::node::{NodeId, TraceNode};
use super::opcode::OpCategory;
use super::value::{VarId, VarValue};

/// Builds a [`Trace`] node by node, in execution order.
#[derive(Debug, Default)]
pub struct TraceBuilder {
    nodes: Vec<TraceNode>,
}

impl TraceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the next node in execution order.
    pub fn node(&mut self) -> NodeBuilder<'_> {
        let order = self.nodes.len() + 1;
        NodeBuilder {
            builder: self,
            node: TraceNode::new(order),
        }
    }

    /// Finalize: wire dominator/dependent links bidirectionally and
    /// precompute both data-dependency indices.
    pub fn build(mut self) -> Trace {
        // Bidirectional control links. Dominators always precede their
        // dependents in execution order, so a single pass suffices.
        let doms: Vec<Option<NodeId>> = self.nodes.iter().map(|n| n.control_dom).collect();
        for (index, dom) in doms.iter().enumerate() {
            if let Some(dom) = dom {
                self.nodes[dom.index()]
                    .control_dependents
                    .push(NodeId::new(index));
            }
        }

        // Definition and use indices: track the most recent writer of
        // every variable while walking forward.
        let mut last_write: FxHashMap<VarId, (NodeId, usize)> = FxHashMap::default();
        let mut read_defs: Vec<Vec<Option<NodeId>>> = Vec::with_capacity(self.nodes.len());
        let mut write_uses: Vec<Vec<Vec<NodeId>>> = self
            .nodes
            .iter()
            .map(|n| vec![Vec::new(); n.writes.len()])
            .collect();

        for (index, node) in self.nodes.iter().enumerate() {
            let id = NodeId::new(index);
            let mut defs = Vec::with_capacity(node.reads.len());
            for read in &node.reads {
                match last_write.get(&read.var) {
                    Some(&(def, write_idx)) => {
                        write_uses[def.index()][write_idx].push(id);
                        defs.push(Some(def));
                    }
                    None => defs.push(None),
                }
            }
            read_defs.push(defs);
            for (write_idx, write) in node.writes.iter().enumerate() {
                last_write.insert(write.var, (id, write_idx));
            }
        }

        Trace {
            nodes: self.nodes,
            read_defs,
            write_uses,
        }
    }
}

/// Builder for one trace node.
pub struct NodeBuilder<'a> {
    builder: &'a mut TraceBuilder,
    node: TraceNode,
}

impl NodeBuilder<'_> {
    /// Add a read occurrence with an explicit role.
    pub fn read_as(mut self, var: VarId, role: VarRole) -> Self {
        self.node.reads.push(VarValue::new(var, role));
        self
    }

    /// Add a read occurrence with an unknown role.
    pub fn read(self, var: VarId) -> Self {
        self.read_as(var, VarRole::Unknown)
    }

    /// Add an implicit-receiver read occurrence.
    pub fn read_receiver(mut self, var: VarId) -> Self {
        self.node
            .reads
            .push(VarValue::new(var, VarRole::Receiver).with_implicit());
        self
    }

    /// Add a write occurrence.
    pub fn write(mut self, var: VarId) -> Self {
        self.node
            .writes
            .push(VarValue::new(var, VarRole::Unknown));
        self
    }

    /// Mark this node as a branch whose condition result is `var`.
    /// The condition result is written by the node.
    pub fn branch(mut self, var: VarId) -> Self {
        self.node
            .writes
            .push(VarValue::new(var, VarRole::Condition));
        self.node.condition_idx = Some(self.node.writes.len() - 1);
        self
    }

    /// Record the node's bytecode operations.
    pub fn ops(mut self, ops: impl IntoIterator<Item = OpCategory>) -> Self {
        self.node.ops.extend(ops);
        self
    }

    /// Set the control dominator. Must reference an earlier node.
    pub fn dominated_by(mut self, dom: NodeId) -> Self {
        debug_assert!(dom.index() < self.builder.nodes.len());
        self.node.control_dom = Some(dom);
        self
    }

    /// Append the node to the trace and return its id.
    pub fn finish(self) -> NodeId {
        let id = NodeId::new(self.builder.nodes.len());
        self.builder.nodes.push(self.node);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(raw: u32) -> VarId {
        VarId::new(raw)
    }

    #[test]
    fn orders_are_unique_and_ascending() {
        let mut builder = TraceBuilder::new();
        let a = builder.node().write(var(1)).finish();
        let b = builder.node().read(var(1)).write(var(2)).finish();
        let trace = builder.build();
        assert_eq!(trace.node(a).order, 1);
        assert_eq!(trace.node(b).order, 2);
    }

    #[test]
    fn definition_index_points_at_most_recent_writer() {
        let mut builder = TraceBuilder::new();
        let first = builder.node().write(var(1)).finish();
        let second = builder.node().write(var(1)).finish();
        let reader = builder.node().read(var(1)).finish();
        let trace = builder.build();

        assert_eq!(trace.data_dependency(reader, 0), Some(second));
        assert!(trace.data_dependents(first, 0).is_empty());
        assert_eq!(trace.data_dependents(second, 0), &[reader]);
    }

    #[test]
    fn reads_without_definition_have_no_dependency() {
        let mut builder = TraceBuilder::new();
        let reader = builder.node().read(var(9)).finish();
        let trace = builder.build();
        assert_eq!(trace.data_dependency(reader, 0), None);
    }

    #[test]
    fn control_links_are_bidirectional() {
        let mut builder = TraceBuilder::new();
        let branch = builder.node().read(var(1)).branch(var(2)).finish();
        let body = builder
            .node()
            .read(var(1))
            .write(var(3))
            .dominated_by(branch)
            .finish();
        let trace = builder.build();

        assert_eq!(trace.node(body).control_dom, Some(branch));
        assert_eq!(trace.node(branch).control_dependents, vec![body]);
        assert!(trace.node(branch).is_branch());
    }

    #[test]
    fn use_index_stops_at_redefinition() {
        let mut builder = TraceBuilder::new();
        let writer = builder.node().write(var(1)).finish();
        let early_reader = builder.node().read(var(1)).finish();
        let _redefiner = builder.node().write(var(1)).finish();
        let _late_reader = builder.node().read(var(1)).finish();
        let trace = builder.build();

        assert_eq!(trace.data_dependents(writer, 0), &[early_reader]);
    }

    #[test]
    fn find_data_dom_var_matches_identity() {
        let mut builder = TraceBuilder::new();
        let writer = builder.node().write(var(5)).write(var(6)).finish();
        let reader = builder.node().read(var(6)).finish();
        let trace = builder.build();

        let (def, write_idx) = trace.find_data_dom_var(reader, 0).unwrap();
        assert_eq!(def, writer);
        assert_eq!(write_idx, 1);
    }
}
