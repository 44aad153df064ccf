//! Known distances between sensors of the rigid body

use common::structs::SensorPoint;
use serde::{Deserialize, Serialize};

/// Two sensors and the physical distance between them
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PointPair {
    pub index1: usize,
    pub index2: usize,
    pub known_distance: f64,
}

/// Every unordered pair of valid sensors with the distance between them.
///
/// Fewer than two valid sensors give an empty list, which means the radii cannot be solved for.
pub fn build_pairs(points: &[SensorPoint], valid: &[bool]) -> Vec<PointPair> {
    assert_eq!(
        points.len(),
        valid.len(),
        "validity mask does not match the number of points"
    );

    let mut pairs = Vec::new();
    for i in 0..points.len() {
        if !valid[i] {
            continue;
        }
        for j in (i + 1)..points.len() {
            if !valid[j] {
                continue;
            }
            pairs.push(PointPair {
                index1: i,
                index2: j,
                known_distance: (points[i].position - points[j].position).norm(),
            });
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use common::structs::Vec3;

    fn point(x: f64, y: f64, z: f64) -> SensorPoint {
        SensorPoint {
            position: Vec3::new(x, y, z),
            normal: Vec3::z(),
        }
    }

    #[test]
    fn all_pairs() {
        let points = [
            point(0.0, 0.0, 0.0),
            point(3.0, 4.0, 0.0),
            point(0.0, 0.0, 1.0),
            point(1.0, 1.0, 1.0),
        ];
        let pairs = build_pairs(&points, &[true; 4]);
        assert_eq!(pairs.len(), 6);
        assert!(pairs.iter().all(|p| p.index1 < p.index2));
        assert_eq!((pairs[0].index1, pairs[0].index2), (0, 1));
        assert_approx_eq!(pairs[0].known_distance, 5.0);
        assert_approx_eq!(pairs[5].known_distance, 1.0);
    }

    #[test]
    fn invalid_points_are_skipped() {
        let points = [
            point(0.0, 0.0, 0.0),
            point(1.0, 0.0, 0.0),
            point(0.0, 2.0, 0.0),
            point(0.0, 0.0, 3.0),
        ];
        let pairs = build_pairs(&points, &[true, false, true, true]);
        assert_eq!(pairs.len(), 3);
        assert!(pairs.iter().all(|p| p.index1 != 1 && p.index2 != 1));
    }

    #[test]
    fn not_enough_points() {
        let points = [point(0.0, 0.0, 0.0), point(1.0, 0.0, 0.0)];
        assert!(build_pairs(&points, &[true, false]).is_empty());
        assert!(build_pairs(&points[..1], &[true]).is_empty());
        assert!(build_pairs(&[], &[]).is_empty());
    }

    #[test]
    #[should_panic]
    fn mask_length_mismatch() {
        build_pairs(&[point(0.0, 0.0, 0.0)], &[true, true]);
    }

    proptest::proptest! {
        #[test]
        fn one_pair_per_two_valid_points(
            valid in proptest::collection::vec(proptest::bool::ANY, 0..20)
        ) {
            let points: Vec<_> = (0..valid.len()).map(|i| point(i as f64, 0.0, 0.0)).collect();
            let k = valid.iter().filter(|v| **v).count();
            let pairs = build_pairs(&points, &valid);
            proptest::prop_assert_eq!(pairs.len(), k * k.saturating_sub(1) / 2);
            for p in &pairs {
                proptest::prop_assert!(p.index1 < p.index2);
                proptest::prop_assert!(valid[p.index1] && valid[p.index2]);
                proptest::prop_assert_eq!(p.known_distance, (p.index2 - p.index1) as f64);
            }
        }
    }
}
