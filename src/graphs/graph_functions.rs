use super::{flags, EdgeId, LevelGraph, Vertex};

/// Speed class used when a caller does not care about travel speeds, e.g.
/// when building graphs for the shortest weighting.
pub const DEFAULT_SPEED: u32 = 50;

pub fn add_one_way<G: LevelGraph>(graph: &mut G, tail: Vertex, head: Vertex, distance: f64) -> EdgeId {
    graph.add_edge(tail, head, distance, flags::flags(DEFAULT_SPEED, false))
}

pub fn add_bidirectional<G: LevelGraph>(
    graph: &mut G,
    tail: Vertex,
    head: Vertex,
    distance: f64,
) -> EdgeId {
    graph.add_edge(tail, head, distance, flags::flags(DEFAULT_SPEED, true))
}
