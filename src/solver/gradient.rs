use common::structs::SensorAngles;

use super::{fitness, RadiusVector};
use crate::pairs::PointPair;

/// Forward-difference estimate of the fitness gradient, scaled by `step`.
///
/// Each component is `fitness(radii + step * e_i) - fitness(radii)`. The baseline is evaluated
/// once. `step` should follow the size of the steps the caller is going to take.
pub fn gradient(
    angles: &[SensorAngles],
    radii: &RadiusVector,
    pairs: &[PointPair],
    step: f64,
) -> RadiusVector {
    forward_difference(radii, step, |r| fitness(r, angles, pairs))
}

pub(super) fn forward_difference(
    radii: &RadiusVector,
    step: f64,
    f: impl Fn(&RadiusVector) -> f64,
) -> RadiusVector {
    let baseline = f(radii);

    let mut probe = radii.clone();
    let mut out = RadiusVector::zeros(radii.len());
    for i in 0..radii.len() {
        probe[i] += step;
        out[i] = f(&probe) - baseline;
        probe[i] = radii[i];
    }

    out
}
