use common::maths::cos_separation;
use common::structs::SensorAngles;

use super::RadiusVector;
use crate::pairs::PointPair;

/// How badly `radii` disagree with the known distances (less is better, zero is a perfect fit).
///
/// For every pair, the distance implied by the two radii and the angle between the bearings is
/// compared to the known one, in squares. The result is the root of the summed squared
/// residuals. It is not divided by the number of pairs, so only values computed over the same
/// pairs are comparable.
pub fn fitness(radii: &RadiusVector, angles: &[SensorAngles], pairs: &[PointPair]) -> f64 {
    assert_eq!(
        radii.len(),
        angles.len(),
        "one radius per sensor expected"
    );
    residual_norm(
        radii,
        pairs.iter().map(|pair| (pair, pair_cosine(angles, pair))),
    )
}

/// Cosine of the angle between the bearings of the two sensors of `pair`
pub(super) fn pair_cosine(angles: &[SensorAngles], pair: &PointPair) -> f64 {
    let a1 = angles[pair.index1];
    let a2 = angles[pair.index2];
    cos_separation(a1.horizontal, a1.vertical, a2.horizontal, a2.vertical)
}

/// The fitness over pairs whose bearing cosines are already known
pub(super) fn residual_norm<'a>(
    radii: &RadiusVector,
    pairs: impl Iterator<Item = (&'a PointPair, f64)>,
) -> f64 {
    let mut sum = 0.0;
    for (pair, cos_sep) in pairs {
        let r1 = radii[pair.index1];
        let r2 = radii[pair.index2];

        let est_sq = r1 * r1 + r2 * r2 - 2.0 * r1 * r2 * cos_sep;
        let residual = est_sq - pair.known_distance * pair.known_distance;

        sum += residual * residual;
    }

    sum.sqrt()
}
