//! The trace graph data model.
//!
//! A trace is an arena of executed statement occurrences addressed by
//! [`NodeId`]. Control-dominance and data-dependency links are stored
//! as id references, never owning pointers, so the naturally cyclic
//! structure (dominator ↔ dependents, definition ↔ uses) carries no
//! ownership cycles. Dependency queries are precomputed indices built
//! once by [`TraceBuilder`], not graph searches.

pub mod builder;
pub mod graph;
pub mod node;
pub mod opcode;
pub mod value;

pub use builder::TraceBuilder;
pub use graph::Trace;
pub use node::{NodeId, TraceNode};
pub use opcode::OpCategory;
pub use value::{VarId, VarValue};
