use std::{cmp::Reverse, collections::BinaryHeap};

use ahash::{HashMap, HashMapExt, HashSet};
use ordered_float::OrderedFloat;

use super::edge_filter::EdgeLevelFilter;
use crate::graphs::{LevelGraph, Vertex, Weight};

/// One-to-many Dijkstra from `source` over the uncontracted subgraph minus
/// `skip`, bounded by `max_weight`. Stops as soon as every target has been
/// settled or the next settled weight would exceed the bound; paths longer
/// than the bound cannot invalidate any shortcut candidate.
///
/// Returns the weights reached so far. A target present in the map with a
/// weight no greater than its via-candidate weight has a witness path.
pub fn witness_search<G: LevelGraph>(
    graph: &G,
    source: Vertex,
    skip: Vertex,
    max_weight: Weight,
    targets: &HashSet<Vertex>,
) -> HashMap<Vertex, Weight> {
    let filter = EdgeLevelFilter::skipping(skip);

    let mut weights: HashMap<Vertex, Weight> = HashMap::new();
    let mut remaining = targets.clone();
    let mut queue = BinaryHeap::new();

    weights.insert(source, 0.0);
    queue.push(Reverse((OrderedFloat(0.0), source)));

    while let Some(Reverse((OrderedFloat(weight), vertex))) = queue.pop() {
        if weight > max_weight {
            break;
        }
        if weight > weights[&vertex] {
            // stale entry
            continue;
        }
        if remaining.remove(&vertex) && remaining.is_empty() {
            break;
        }

        for edge in graph.out_edges(vertex) {
            if !filter.accept(graph, &edge) {
                continue;
            }
            let alternative = weight + edge.weight;
            if alternative < *weights.get(&edge.head).unwrap_or(&Weight::INFINITY) {
                weights.insert(edge.head, alternative);
                queue.push(Reverse((OrderedFloat(alternative), edge.head)));
            }
        }
    }

    weights
}

#[cfg(test)]
mod tests {
    use ahash::{HashSet, HashSetExt};

    use super::witness_search;
    use crate::graphs::{graph_functions::add_one_way, vec_level_graph::VecLevelGraph, LevelGraph};

    fn targets(vertices: &[u32]) -> HashSet<u32> {
        let mut set = HashSet::new();
        set.extend(vertices.iter().copied());
        set
    }

    #[test]
    fn finds_path_around_skipped_vertex() {
        // 0 -> 1 -> 2 with a direct 0 -> 2 alternative.
        let mut graph = VecLevelGraph::new(3);
        add_one_way(&mut graph, 0, 1, 1.0);
        add_one_way(&mut graph, 1, 2, 1.0);
        add_one_way(&mut graph, 0, 2, 1.5);

        let weights = witness_search(&graph, 0, 1, 2.0, &targets(&[2]));
        assert_eq!(weights.get(&2), Some(&1.5));
    }

    #[test]
    fn does_not_route_through_skipped_vertex() {
        let mut graph = VecLevelGraph::new(3);
        add_one_way(&mut graph, 0, 1, 1.0);
        add_one_way(&mut graph, 1, 2, 1.0);

        let weights = witness_search(&graph, 0, 1, 2.0, &targets(&[2]));
        assert_eq!(weights.get(&2), None);
    }

    #[test]
    fn respects_weight_limit() {
        // Chain where everything beyond the limit stays unexplored.
        let mut graph = VecLevelGraph::new(5);
        add_one_way(&mut graph, 0, 1, 2.0);
        add_one_way(&mut graph, 1, 2, 2.0);
        add_one_way(&mut graph, 2, 3, 2.0);

        let weights = witness_search(&graph, 0, 4, 3.0, &targets(&[3]));
        assert_eq!(weights.get(&3), None);
        assert_eq!(weights.get(&1), Some(&2.0));
    }

    #[test]
    fn ignores_contracted_vertices() {
        let mut graph = VecLevelGraph::new(4);
        add_one_way(&mut graph, 0, 1, 1.0);
        add_one_way(&mut graph, 1, 3, 1.0);
        add_one_way(&mut graph, 0, 3, 5.0);
        graph.set_level(1, 1);

        let weights = witness_search(&graph, 0, 2, 10.0, &targets(&[3]));
        assert_eq!(weights.get(&3), Some(&5.0));
    }
}
