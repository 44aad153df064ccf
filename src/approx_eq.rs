//! Compare two objects with some tolerance

use common::nalgebra::DVector;

/// f64 tolerance.
/// Equals to `f64::EPSILON.sqrt()`
pub const F64_TOLERANCE: f64 = 0.000000014901161193847656_f64;

pub trait ApproxEq {
    /// Compare two objects with some tolerance
    fn approx_eq(&self, rhs: &Self) -> bool;
}

impl ApproxEq for f64 {
    #[inline]
    fn approx_eq(&self, rhs: &f64) -> bool {
        (self - rhs).abs() < F64_TOLERANCE
    }
}

impl ApproxEq for DVector<f64> {
    fn approx_eq(&self, rhs: &Self) -> bool {
        self.len() == rhs.len() && self.iter().zip(rhs).all(|(a, b)| a.approx_eq(b))
    }
}

/// Largest relative difference between matching components
pub fn max_rel_error(a: &DVector<f64>, b: &DVector<f64>) -> f64 {
    assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| ((x - y) / y).abs())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vectors() {
        let a = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let mut b = a.clone();
        assert!(a.approx_eq(&b));
        b[1] += 1e-10;
        assert!(a.approx_eq(&b));
        b[1] += 1e-3;
        assert!(!a.approx_eq(&b));
        assert!(!a.approx_eq(&DVector::from_vec(vec![1.0, 2.0])));
    }

    #[test]
    fn relative_error() {
        let a = DVector::from_vec(vec![1.01, 4.0]);
        let b = DVector::from_vec(vec![1.0, 5.0]);
        assert!((max_rel_error(&a, &b) - 0.2).abs() < 1e-12);
    }
}
