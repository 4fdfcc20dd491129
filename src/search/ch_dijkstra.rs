use std::{cmp::Reverse, collections::BinaryHeap};

use ahash::{HashMap, HashMapExt};
use log::warn;
use ordered_float::OrderedFloat;

use super::{unpack_edge, Path, QueryError};
use crate::{
    graphs::{EdgeId, LevelGraph, Vertex, Weight},
    weighting::Weighting,
};

/// Bidirectional Dijkstra over a prepared hierarchy. Both frontiers only
/// relax edges towards strictly higher levels, and the search keeps going
/// until neither frontier's cheapest key can beat the best meeting weight,
/// which is the finish rule shortcuts require.
pub struct ChDijkstra<'a, G, W> {
    graph: &'a G,
    weighting: W,
}

struct SearchResult {
    meeting_vertex: Vertex,
    weight: Weight,
    forward_predecessors: HashMap<Vertex, (Vertex, EdgeId)>,
    backward_predecessors: HashMap<Vertex, (Vertex, EdgeId)>,
}

impl<'a, G: LevelGraph, W: Weighting> ChDijkstra<'a, G, W> {
    pub fn new(graph: &'a G, weighting: W) -> ChDijkstra<'a, G, W> {
        ChDijkstra { graph, weighting }
    }

    /// A prepared hierarchy is only valid under the weighting it was built
    /// with; swapping it afterwards is not supported.
    pub fn set_weighting(&mut self, _weighting: W) -> Result<(), QueryError> {
        warn!("ignoring attempt to change the weighting of a prepared hierarchy");
        Err(QueryError::WeightingFixed)
    }

    pub fn shortest_path_weight(&self, source: Vertex, target: Vertex) -> Option<Weight> {
        self.search(source, target).map(|search| search.weight)
    }

    pub fn shortest_path(&self, source: Vertex, target: Vertex) -> Option<Path> {
        let search = self.search(source, target)?;

        // Walk the meeting vertex back to both endpoints, collecting the
        // traversed edges in travel order.
        let mut chain = Vec::new();
        let mut current = search.meeting_vertex;
        while current != source {
            let &(previous, edge) = search.forward_predecessors.get(&current)?;
            chain.push((edge, previous, current));
            current = previous;
        }
        chain.reverse();

        let mut current = search.meeting_vertex;
        while current != target {
            let &(next, edge) = search.backward_predecessors.get(&current)?;
            chain.push((edge, current, next));
            current = next;
        }

        let mut unpacked = Vec::new();
        for (edge, tail, head) in chain {
            unpack_edge(self.graph, edge, tail, head, &mut unpacked);
        }

        let mut vertices = vec![source];
        let mut distance = 0.0;
        for (edge, head) in unpacked {
            vertices.push(head);
            distance += self
                .weighting
                .revert(self.graph.edge_weight(edge), self.graph.edge_flags(edge));
        }

        Some(Path {
            vertices,
            weight: search.weight,
            distance,
        })
    }

    fn search(&self, source: Vertex, target: Vertex) -> Option<SearchResult> {
        if source >= self.graph.number_of_vertices() || target >= self.graph.number_of_vertices() {
            return None;
        }

        let mut forward_weights: HashMap<Vertex, Weight> = HashMap::new();
        let mut backward_weights: HashMap<Vertex, Weight> = HashMap::new();
        let mut forward_predecessors = HashMap::new();
        let mut backward_predecessors = HashMap::new();
        let mut forward_queue = BinaryHeap::new();
        let mut backward_queue = BinaryHeap::new();

        forward_weights.insert(source, 0.0);
        backward_weights.insert(target, 0.0);
        forward_queue.push(Reverse((OrderedFloat(0.0), source)));
        backward_queue.push(Reverse((OrderedFloat(0.0), target)));

        let mut best_weight = Weight::INFINITY;
        let mut meeting_vertex = None;

        loop {
            let forward_active = forward_queue
                .peek()
                .map_or(false, |&Reverse((weight, _))| weight.0 < best_weight);
            let backward_active = backward_queue
                .peek()
                .map_or(false, |&Reverse((weight, _))| weight.0 < best_weight);
            if !forward_active && !backward_active {
                break;
            }

            if forward_active {
                if let Some(Reverse((OrderedFloat(weight), vertex))) = forward_queue.pop() {
                    if weight <= forward_weights[&vertex] {
                        if let Some(&backward_weight) = backward_weights.get(&vertex) {
                            if weight + backward_weight < best_weight {
                                best_weight = weight + backward_weight;
                                meeting_vertex = Some(vertex);
                            }
                        }

                        let level = self.graph.level(vertex);
                        for edge in self.graph.out_edges(vertex) {
                            if self.graph.level(edge.head) <= level {
                                continue;
                            }
                            let alternative = weight + edge.weight;
                            if alternative
                                < *forward_weights.get(&edge.head).unwrap_or(&Weight::INFINITY)
                            {
                                forward_weights.insert(edge.head, alternative);
                                forward_predecessors.insert(edge.head, (vertex, edge.id));
                                forward_queue.push(Reverse((OrderedFloat(alternative), edge.head)));
                            }
                        }
                    }
                }
            }

            if backward_active {
                if let Some(Reverse((OrderedFloat(weight), vertex))) = backward_queue.pop() {
                    if weight <= backward_weights[&vertex] {
                        if let Some(&forward_weight) = forward_weights.get(&vertex) {
                            if weight + forward_weight < best_weight {
                                best_weight = weight + forward_weight;
                                meeting_vertex = Some(vertex);
                            }
                        }

                        let level = self.graph.level(vertex);
                        for edge in self.graph.in_edges(vertex) {
                            if self.graph.level(edge.head) <= level {
                                continue;
                            }
                            let alternative = weight + edge.weight;
                            if alternative
                                < *backward_weights.get(&edge.head).unwrap_or(&Weight::INFINITY)
                            {
                                backward_weights.insert(edge.head, alternative);
                                backward_predecessors.insert(edge.head, (vertex, edge.id));
                                backward_queue
                                    .push(Reverse((OrderedFloat(alternative), edge.head)));
                            }
                        }
                    }
                }
            }
        }

        let meeting_vertex = meeting_vertex?;
        Some(SearchResult {
            meeting_vertex,
            weight: best_weight,
            forward_predecessors,
            backward_predecessors,
        })
    }
}
