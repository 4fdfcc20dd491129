use serde::{Deserialize, Serialize};

use super::{
    flags::{self, EdgeFlags},
    EdgeId, EdgeRef, Level, LevelGraph, Vertex, Weight,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct EdgeData {
    tail: Vertex,
    head: Vertex,
    weight: Weight,
    flags: EdgeFlags,
    original_edges: u32,
    skipped: Option<Vertex>,
}

/// In-memory level graph. Edges live in a flat arena; every vertex keeps the
/// ids of its incident edges. One record covers both directions of a
/// bidirectional road, the direction bits in the flags decide how it may be
/// traversed.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VecLevelGraph {
    levels: Vec<Level>,
    edges: Vec<EdgeData>,
    adjacency: Vec<Vec<EdgeId>>,
}

impl VecLevelGraph {
    pub fn new(number_of_vertices: u32) -> VecLevelGraph {
        VecLevelGraph {
            levels: vec![0; number_of_vertices as usize],
            edges: Vec::new(),
            adjacency: vec![Vec::new(); number_of_vertices as usize],
        }
    }

    fn edge_ref(&self, id: EdgeId, from: Vertex) -> EdgeRef {
        let edge = &self.edges[id as usize];
        let head = if edge.tail == from { edge.head } else { edge.tail };
        EdgeRef {
            id,
            head,
            weight: edge.weight,
            flags: edge.flags,
            original_edges: edge.original_edges,
            skipped: edge.skipped,
        }
    }

    fn push_edge(&mut self, edge: EdgeData) -> EdgeId {
        assert_ne!(edge.tail, edge.head, "self loops are not supported");
        let id = self.edges.len() as EdgeId;
        self.adjacency[edge.tail as usize].push(id);
        self.adjacency[edge.head as usize].push(id);
        self.edges.push(edge);
        id
    }
}

impl LevelGraph for VecLevelGraph {
    fn number_of_vertices(&self) -> u32 {
        self.levels.len() as u32
    }

    fn number_of_edges(&self) -> u32 {
        self.edges.len() as u32
    }

    fn edges(&self, vertex: Vertex) -> impl Iterator<Item = EdgeRef> + '_ {
        self.adjacency[vertex as usize]
            .iter()
            .map(move |&id| self.edge_ref(id, vertex))
    }

    fn out_edges(&self, vertex: Vertex) -> impl Iterator<Item = EdgeRef> + '_ {
        self.adjacency[vertex as usize].iter().filter_map(move |&id| {
            let edge = &self.edges[id as usize];
            let traversable = (edge.tail == vertex && flags::is_forward(edge.flags))
                || (edge.head == vertex && flags::is_backward(edge.flags));
            traversable.then(|| self.edge_ref(id, vertex))
        })
    }

    fn in_edges(&self, vertex: Vertex) -> impl Iterator<Item = EdgeRef> + '_ {
        self.adjacency[vertex as usize].iter().filter_map(move |&id| {
            let edge = &self.edges[id as usize];
            let traversable = (edge.head == vertex && flags::is_forward(edge.flags))
                || (edge.tail == vertex && flags::is_backward(edge.flags));
            traversable.then(|| self.edge_ref(id, vertex))
        })
    }

    fn level(&self, vertex: Vertex) -> Level {
        self.levels[vertex as usize]
    }

    fn set_level(&mut self, vertex: Vertex, level: Level) {
        self.levels[vertex as usize] = level;
    }

    fn edge_tail(&self, edge: EdgeId) -> Vertex {
        self.edges[edge as usize].tail
    }

    fn edge_head(&self, edge: EdgeId) -> Vertex {
        self.edges[edge as usize].head
    }

    fn edge_weight(&self, edge: EdgeId) -> Weight {
        self.edges[edge as usize].weight
    }

    fn set_edge_weight(&mut self, edge: EdgeId, weight: Weight) {
        self.edges[edge as usize].weight = weight;
    }

    fn edge_flags(&self, edge: EdgeId) -> EdgeFlags {
        self.edges[edge as usize].flags
    }

    fn set_edge_flags(&mut self, edge: EdgeId, flags: EdgeFlags) {
        self.edges[edge as usize].flags = flags;
    }

    fn original_edges(&self, edge: EdgeId) -> u32 {
        self.edges[edge as usize].original_edges
    }

    fn set_original_edges(&mut self, edge: EdgeId, count: u32) {
        self.edges[edge as usize].original_edges = count;
    }

    fn skipped_vertex(&self, edge: EdgeId) -> Option<Vertex> {
        self.edges[edge as usize].skipped
    }

    fn set_skipped_vertex(&mut self, edge: EdgeId, skipped: Option<Vertex>) {
        self.edges[edge as usize].skipped = skipped;
    }

    fn add_edge(&mut self, tail: Vertex, head: Vertex, distance: f64, flags: EdgeFlags) -> EdgeId {
        self.push_edge(EdgeData {
            tail,
            head,
            weight: distance,
            flags,
            original_edges: 1,
            skipped: None,
        })
    }

    fn shortcut(
        &mut self,
        tail: Vertex,
        head: Vertex,
        weight: Weight,
        flags: EdgeFlags,
        skipped: Vertex,
    ) -> EdgeId {
        self.push_edge(EdgeData {
            tail,
            head,
            weight,
            flags,
            original_edges: 0,
            skipped: Some(skipped),
        })
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::VecLevelGraph;
    use crate::graphs::{flags, LevelGraph};

    #[test]
    fn one_way_edges_respect_direction() {
        let mut graph = VecLevelGraph::new(3);
        graph.add_edge(0, 1, 10.0, flags::flags(50, false));
        graph.add_edge(2, 1, 20.0, flags::flags(50, false));

        let heads = graph.out_edges(0).map(|edge| edge.head).collect_vec();
        assert_eq!(heads, vec![1]);
        assert_eq!(graph.out_edges(1).count(), 0);

        let sources = graph.in_edges(1).map(|edge| edge.head).collect_vec();
        assert_eq!(sources, vec![0, 2]);
        assert_eq!(graph.in_edges(0).count(), 0);
    }

    #[test]
    fn bidirectional_edge_is_one_record() {
        let mut graph = VecLevelGraph::new(2);
        graph.add_edge(0, 1, 10.0, flags::flags(50, true));

        assert_eq!(graph.number_of_edges(), 1);
        assert_eq!(graph.out_edges(0).next().unwrap().head, 1);
        assert_eq!(graph.out_edges(1).next().unwrap().head, 0);
        assert_eq!(graph.in_edges(0).next().unwrap().head, 1);
        assert_eq!(graph.edges(1).count(), 1);
    }

    #[test]
    fn shortcut_record_and_mutators() {
        let mut graph = VecLevelGraph::new(3);
        graph.add_edge(0, 1, 1.0, flags::flags(50, false));
        graph.add_edge(1, 2, 1.0, flags::flags(50, false));

        let shortcut = graph.shortcut(0, 2, 2.0, flags::SHORTCUT_ONE_DIR, 1);
        assert_eq!(graph.skipped_vertex(shortcut), Some(1));
        assert_eq!(graph.original_edges(shortcut), 0);

        graph.set_original_edges(shortcut, 2);
        graph.set_edge_weight(shortcut, 1.5);
        graph.set_edge_flags(shortcut, flags::SHORTCUT_BOTH_DIR);
        graph.set_skipped_vertex(shortcut, Some(1));

        let edge = graph.out_edges(0).find(|edge| edge.id == shortcut).unwrap();
        assert_eq!(edge.weight, 1.5);
        assert_eq!(edge.original_edges, 2);
        assert_eq!(edge.skipped, Some(1));
        assert_eq!(graph.edge_tail(shortcut), 0);
        assert_eq!(graph.edge_head(shortcut), 2);
    }

    #[test]
    fn levels_start_uncontracted() {
        let mut graph = VecLevelGraph::new(2);
        assert_eq!(graph.level(0), 0);
        graph.set_level(0, 7);
        assert_eq!(graph.level(0), 7);
        assert_eq!(graph.level(1), 0);
    }
}
