use std::{cmp::Reverse, collections::BinaryHeap};

use ahash::{HashMap, HashMapExt};
use ordered_float::OrderedFloat;

use super::{unpack_edge, Path};
use crate::{
    graphs::{EdgeId, LevelGraph, Vertex, Weight},
    weighting::Weighting,
};

/// Plain one-to-one Dijkstra over the stored weights, ignoring levels. The
/// reference every hierarchy query must agree with; expects the weights to
/// have been rewritten by the preparation.
pub fn dijkstra_one_to_one<G: LevelGraph, W: Weighting>(
    graph: &G,
    weighting: &W,
    source: Vertex,
    target: Vertex,
) -> Option<Path> {
    if source >= graph.number_of_vertices() || target >= graph.number_of_vertices() {
        return None;
    }

    let mut weights: HashMap<Vertex, Weight> = HashMap::new();
    let mut predecessors: HashMap<Vertex, (Vertex, EdgeId)> = HashMap::new();
    let mut queue = BinaryHeap::new();

    weights.insert(source, 0.0);
    queue.push(Reverse((OrderedFloat(0.0), source)));

    while let Some(Reverse((OrderedFloat(weight), vertex))) = queue.pop() {
        if weight > weights[&vertex] {
            continue;
        }
        if vertex == target {
            break;
        }

        for edge in graph.out_edges(vertex) {
            let alternative = weight + edge.weight;
            if alternative < *weights.get(&edge.head).unwrap_or(&Weight::INFINITY) {
                weights.insert(edge.head, alternative);
                predecessors.insert(edge.head, (vertex, edge.id));
                queue.push(Reverse((OrderedFloat(alternative), edge.head)));
            }
        }
    }

    let &weight = weights.get(&target)?;

    let mut chain = Vec::new();
    let mut current = target;
    while current != source {
        let &(previous, edge) = predecessors.get(&current)?;
        chain.push((edge, previous, current));
        current = previous;
    }
    chain.reverse();

    let mut unpacked = Vec::new();
    for (edge, tail, head) in chain {
        unpack_edge(graph, edge, tail, head, &mut unpacked);
    }

    let mut vertices = vec![source];
    let mut distance = 0.0;
    for (edge, head) in unpacked {
        vertices.push(head);
        distance += weighting.revert(graph.edge_weight(edge), graph.edge_flags(edge));
    }

    Some(Path {
        vertices,
        weight,
        distance,
    })
}
