pub mod contraction;
pub mod graphs;
pub mod queue;
pub mod search;
pub mod utility;
pub mod weighting;

pub use contraction::{Contractor, PrepareError};
pub use search::{ChDijkstra, Path, QueryError};
