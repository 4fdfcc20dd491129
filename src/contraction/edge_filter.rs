use crate::graphs::{EdgeRef, LevelGraph, Vertex};

/// Accepts edges whose far endpoint is still uncontracted. The skipping
/// variant additionally rejects one designated vertex, which is how the
/// witness search refuses to route through the contraction candidate.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeLevelFilter {
    skip: Option<Vertex>,
}

impl EdgeLevelFilter {
    pub fn new() -> EdgeLevelFilter {
        EdgeLevelFilter { skip: None }
    }

    pub fn skipping(vertex: Vertex) -> EdgeLevelFilter {
        EdgeLevelFilter { skip: Some(vertex) }
    }

    pub fn accept<G: LevelGraph>(&self, graph: &G, edge: &EdgeRef) -> bool {
        self.skip != Some(edge.head) && graph.level(edge.head) == 0
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::EdgeLevelFilter;
    use crate::graphs::{graph_functions::add_one_way, vec_level_graph::VecLevelGraph, LevelGraph};

    #[test]
    fn rejects_contracted_and_skipped() {
        let mut graph = VecLevelGraph::new(4);
        add_one_way(&mut graph, 0, 1, 1.0);
        add_one_way(&mut graph, 0, 2, 1.0);
        add_one_way(&mut graph, 0, 3, 1.0);
        graph.set_level(2, 1);

        let plain = EdgeLevelFilter::new();
        let accepted = graph
            .out_edges(0)
            .filter(|edge| plain.accept(&graph, edge))
            .map(|edge| edge.head)
            .collect_vec();
        assert_eq!(accepted, vec![1, 3]);

        let skipping = EdgeLevelFilter::skipping(3);
        let accepted = graph
            .out_edges(0)
            .filter(|edge| skipping.accept(&graph, edge))
            .map(|edge| edge.head)
            .collect_vec();
        assert_eq!(accepted, vec![1]);
    }
}
