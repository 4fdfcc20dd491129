pub mod contractor;
pub mod edge_filter;
pub mod witness_search;

pub use contractor::Contractor;

use thiserror::Error;

use crate::graphs::{flags::EdgeFlags, Vertex, Weight};

/// A shortcut candidate produced while contracting a vertex: a single edge
/// standing in for the path tail -> contracted vertex -> head.
#[derive(Clone, Debug, PartialEq)]
pub struct Shortcut {
    pub tail: Vertex,
    pub head: Vertex,
    pub weight: Weight,
    pub flags: EdgeFlags,
    pub original_edges: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrepareError {
    /// The graph has no edges; there is nothing to prepare.
    #[error("the graph has no edges")]
    EmptyGraph,

    /// No uncontracted vertex is left to seed the queue with. Also the
    /// outcome of re-running the preparation on an already prepared graph.
    #[error("no uncontracted vertex to seed the queue with")]
    EmptyQueue,
}
