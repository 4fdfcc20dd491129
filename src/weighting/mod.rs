pub mod fastest;
pub mod shortest;

pub use fastest::FastestWeighting;
pub use shortest::ShortestWeighting;

use crate::graphs::{flags::EdgeFlags, Weight};

/// Maps an edge to the scalar weight the hierarchy is built over, and back.
///
/// During preparation every edge's stored distance is replaced by its weight,
/// so `revert` is what turns a stored weight back into a geographic distance
/// when a path is reported.
pub trait Weighting: Send + Sync {
    fn weight(&self, distance: f64, flags: EdgeFlags) -> Weight;

    fn revert(&self, weight: Weight, flags: EdgeFlags) -> f64;
}
