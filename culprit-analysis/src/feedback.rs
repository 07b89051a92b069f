//! Human feedback on trace nodes.
//!
//! A node with a recorded feedback is already resolved (the user has
//! looked at it), so both propagation passes leave it untouched.

use crate::trace::{NodeId, VarId};

/// The verdict a user (or automated oracle) gave on a trace node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFeedback {
    /// The node's output value is correct.
    Correct,
    /// The node's output value is wrong.
    WrongValue,
    /// The node should not have executed at all (wrong branch taken).
    WrongPath,
    /// A specific variable at this node holds a wrong value.
    WrongVariable(VarId),
}

/// A resolved (node, feedback) pair.
#[derive(Debug, Clone)]
pub struct FeedbackRecord {
    pub node: NodeId,
    pub feedback: UserFeedback,
}

impl FeedbackRecord {
    pub fn new(node: NodeId, feedback: UserFeedback) -> Self {
        Self { node, feedback }
    }
}
