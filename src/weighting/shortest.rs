use super::Weighting;
use crate::graphs::{flags::EdgeFlags, Weight};

/// Weight equals geographic distance.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShortestWeighting;

impl Weighting for ShortestWeighting {
    fn weight(&self, distance: f64, _flags: EdgeFlags) -> Weight {
        distance
    }

    fn revert(&self, weight: Weight, _flags: EdgeFlags) -> f64 {
        weight
    }
}
