//! Find the distance from a lighthouse base station to every sensor of a tracked object.
//!
//! Angles alone do not determine scale, so the known distances between sensors of the rigid body
//! are used as constraints. The radii are found by a gradient descent over a least-squares
//! fitness built from the spherical law of cosines.

pub mod approx_eq;
pub mod pairs;
pub mod params;
pub mod solver;

pub use pairs::{build_pairs, PointPair};
pub use params::Params;
pub use solver::{fitness, gradient, optimize, optimize_multistart, RadiusVector, Solution, Solver};
