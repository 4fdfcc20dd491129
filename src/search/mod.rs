pub mod ch_dijkstra;
pub mod dijkstra;

pub use ch_dijkstra::ChDijkstra;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graphs::{EdgeId, LevelGraph, Vertex, Weight};

/// A shortest path, unrolled down to original edges.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub vertices: Vec<Vertex>,
    /// Weight under the weighting the hierarchy was prepared with.
    pub weight: Weight,
    /// Geographic distance, recovered by reverting the overlay weights of
    /// the original edges.
    pub distance: f64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    /// A prepared hierarchy is only valid under the weighting it was built
    /// with.
    #[error("the hierarchy is only valid for the weighting it was prepared with")]
    WeightingFixed,
}

/// Expands `edge`, traversed tail -> head, into its original edges, pushed
/// onto `out` in travel order as (edge id, far endpoint) pairs. Shortcuts
/// recurse into the two component edges they stand for; the components are
/// identified by their exact weight sum, which preparation guarantees.
pub(crate) fn unpack_edge<G: LevelGraph>(
    graph: &G,
    edge: EdgeId,
    tail: Vertex,
    head: Vertex,
    out: &mut Vec<(EdgeId, Vertex)>,
) {
    match graph.skipped_vertex(edge) {
        None => out.push((edge, head)),
        Some(via) => {
            let weight = graph.edge_weight(edge);
            let Some((first, second)) = component_edges(graph, tail, via, head, weight) else {
                panic!("no component edges for shortcut {tail} -> {head} via {via}");
            };
            unpack_edge(graph, first, tail, via, out);
            unpack_edge(graph, second, via, head, out);
        }
    }
}

fn component_edges<G: LevelGraph>(
    graph: &G,
    tail: Vertex,
    via: Vertex,
    head: Vertex,
    weight: Weight,
) -> Option<(EdgeId, EdgeId)> {
    for first in graph.out_edges(tail) {
        if first.head != via {
            continue;
        }
        for second in graph.out_edges(via) {
            if second.head == head && first.weight + second.weight == weight {
                return Some((first.id, second.id));
            }
        }
    }
    None
}
