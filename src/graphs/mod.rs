pub mod flags;
pub mod graph_functions;
pub mod vec_level_graph;

use flags::EdgeFlags;

pub type Vertex = u32;
pub type EdgeId = u32;
pub type Level = u32;
pub type Weight = f64;

/// Read-only snapshot of an edge as seen while traversing from one of its
/// endpoints. `head` is always the far endpoint of the traversal, no matter
/// how the edge is stored; mutation goes through the [LevelGraph] accessors
/// keyed by `id`.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeRef {
    pub id: EdgeId,
    pub head: Vertex,
    pub weight: Weight,
    pub flags: EdgeFlags,
    pub original_edges: u32,
    pub skipped: Option<Vertex>,
}

/// A weighted directed graph with a contraction level per vertex and
/// shortcut support. Before preparation every level is 0; afterwards the
/// levels encode the contraction order and the `weight` slot of every edge
/// holds the overlay weight instead of the geographic distance.
pub trait LevelGraph {
    fn number_of_vertices(&self) -> u32;

    fn number_of_edges(&self) -> u32;

    /// Every stored edge incident to `vertex`, once each, regardless of
    /// direction flags.
    fn edges(&self, vertex: Vertex) -> impl Iterator<Item = EdgeRef> + '_;

    /// Edges traversable away from `vertex`.
    fn out_edges(&self, vertex: Vertex) -> impl Iterator<Item = EdgeRef> + '_;

    /// Edges traversable into `vertex`; `head` is the far endpoint the edge
    /// comes from.
    fn in_edges(&self, vertex: Vertex) -> impl Iterator<Item = EdgeRef> + '_;

    fn level(&self, vertex: Vertex) -> Level;

    fn set_level(&mut self, vertex: Vertex, level: Level);

    fn edge_tail(&self, edge: EdgeId) -> Vertex;

    fn edge_head(&self, edge: EdgeId) -> Vertex;

    fn edge_weight(&self, edge: EdgeId) -> Weight;

    fn set_edge_weight(&mut self, edge: EdgeId, weight: Weight);

    fn edge_flags(&self, edge: EdgeId) -> EdgeFlags;

    fn set_edge_flags(&mut self, edge: EdgeId, flags: EdgeFlags);

    fn original_edges(&self, edge: EdgeId) -> u32;

    fn set_original_edges(&mut self, edge: EdgeId, count: u32);

    fn skipped_vertex(&self, edge: EdgeId) -> Option<Vertex>;

    fn set_skipped_vertex(&mut self, edge: EdgeId, skipped: Option<Vertex>);

    /// Installs an original edge carrying a geographic distance.
    fn add_edge(&mut self, tail: Vertex, head: Vertex, distance: f64, flags: EdgeFlags) -> EdgeId;

    /// Installs a shortcut edge bypassing `skipped`. The caller sets the
    /// original-edges count afterwards.
    fn shortcut(
        &mut self,
        tail: Vertex,
        head: Vertex,
        weight: Weight,
        flags: EdgeFlags,
        skipped: Vertex,
    ) -> EdgeId;
}
