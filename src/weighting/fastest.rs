use super::Weighting;
use crate::graphs::{
    flags::{self, EdgeFlags},
    Weight,
};

/// Weight equals travel time, distance divided by the speed class of the
/// edge. The speed class is clamped to 1 so weights stay finite even on
/// flags without one.
#[derive(Clone, Copy, Debug, Default)]
pub struct FastestWeighting;

fn speed(edge_flags: EdgeFlags) -> f64 {
    flags::speed_of(edge_flags).max(1) as f64
}

impl Weighting for FastestWeighting {
    fn weight(&self, distance: f64, edge_flags: EdgeFlags) -> Weight {
        distance / speed(edge_flags)
    }

    fn revert(&self, weight: Weight, edge_flags: EdgeFlags) -> f64 {
        weight * speed(edge_flags)
    }
}

#[cfg(test)]
mod tests {
    use super::FastestWeighting;
    use crate::{graphs::flags, weighting::Weighting};

    #[test]
    fn weight_scales_with_speed() {
        let weighting = FastestWeighting;
        let slow = flags::flags(25, false);
        let fast = flags::flags(100, true);

        assert_eq!(weighting.weight(100.0, slow), 4.0);
        assert_eq!(weighting.weight(100.0, fast), 1.0);
    }

    #[test]
    fn revert_restores_distance() {
        let weighting = FastestWeighting;
        let edge_flags = flags::flags(80, false);

        let weight = weighting.weight(160.0, edge_flags);
        assert_eq!(weighting.revert(weight, edge_flags), 160.0);
    }
}
