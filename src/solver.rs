//! The implementation itself
//!
//! The radii are found with a gradient descent that takes three steps per iteration: two plain
//! gradient steps and a third, shorter one that corrects for the zigzag the first two make.
//! Solving the lighthouse problem presents a very narrow valley, and the zigzag of a basic
//! gradient descent is horrible there. The correction step cuts across it.

mod fitness;
mod gradient;

pub use fitness::fitness;
pub use gradient::gradient;

use fitness::{pair_cosine, residual_norm};
use gradient::forward_difference;

use common::nalgebra::DVector;
use common::rand::rngs::SmallRng;
use common::rand::{Rng, SeedableRng};
use common::structs::SensorAngles;
use rayon::prelude::*;

use crate::pairs::PointPair;
use crate::params::Params;

/// Distance from the base station to every sensor
pub type RadiusVector = DVector<f64>;

/// Contains all necessary information to solve the problem
#[derive(Clone)]
pub struct Solver<'a> {
    angles: &'a [SensorAngles],
    pairs: &'a [PointPair],
    /// Cosine of the angle between the bearings of each pair
    cosines: Vec<f64>,
    params: Params,
}

/// The answer
#[derive(Debug, Clone)]
pub struct Solution {
    pub radii: RadiusVector,
    pub fitness: f64,
    pub iterations: usize,
    /// How many iterations improved the estimate
    pub accepted: usize,
    /// The trust radius the descent ended with
    pub trust_radius: f64,
    /// Best fitness after each iteration
    pub history: Vec<f64>,
}

impl Solution {
    /// All radii are finite and within `[min, max]`
    pub fn is_plausible(&self, min: f64, max: f64) -> bool {
        self.radii
            .iter()
            .all(|r| r.is_finite() && (min..=max).contains(r))
    }
}

impl<'a> Solver<'a> {
    /// Construct new solver given the bearings, the pair constraints and the parameters.
    ///
    /// Panics if a pair refers to a sensor outside of `angles`, joins a sensor with itself, or if
    /// any bearing or known distance is not finite.
    pub fn new(angles: &'a [SensorAngles], pairs: &'a [PointPair], params: Params) -> Self {
        assert!(
            angles.iter().all(|a| a.is_finite()),
            "bearings must be finite"
        );
        for pair in pairs {
            assert!(
                pair.index1 < angles.len() && pair.index2 < angles.len(),
                "pair ({}, {}) is out of range for {} sensors",
                pair.index1,
                pair.index2,
                angles.len()
            );
            assert_ne!(pair.index1, pair.index2, "a pair must join two sensors");
            assert!(
                pair.known_distance.is_finite(),
                "known distances must be finite"
            );
        }
        Self {
            angles,
            pairs,
            cosines: pairs.iter().map(|pair| pair_cosine(angles, pair)).collect(),
            params,
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Same as [`fitness`], without recomputing the bearing cosines
    pub fn fitness(&self, radii: &RadiusVector) -> f64 {
        assert_eq!(
            radii.len(),
            self.angles.len(),
            "one radius per sensor expected"
        );
        residual_norm(radii, self.pairs.iter().zip(self.cosines.iter().copied()))
    }

    pub fn gradient(&self, radii: &RadiusVector, step: f64) -> RadiusVector {
        forward_difference(radii, step, |r| self.fitness(r))
    }

    /// Refine `initial` into a local minimum of the fitness
    pub fn solve(&self, initial: &RadiusVector) -> Solution {
        assert_eq!(
            initial.len(),
            self.angles.len(),
            "one radius per sensor expected"
        );
        assert!(
            initial.iter().all(|r| r.is_finite()),
            "initial guess must be finite"
        );

        let params = &self.params;
        let mut estimate = initial.clone();
        let mut best = self.fitness(&estimate);
        let mut g = params.initial_trust_radius;
        let mut iterations = 0;
        let mut accepted = 0;
        let mut history = Vec::new();

        // Without pairs there is nothing to descend on
        if self.pairs.is_empty() {
            return Solution {
                radii: estimate,
                fitness: best,
                iterations,
                accepted,
                trust_radius: g,
                history,
            };
        }

        while g > params.terminal_trust_radius && iterations < params.max_iterations {
            iterations += 1;

            let first = self.descent_step(&estimate, g);
            let p1 = &estimate + &first;
            let p2 = &p1 + self.descent_step(&p1, g);
            let p3 = &p2 + zigzag_correction(&p2, &first, g * params.correction_scale);

            let new_fitness = self.fitness(&p3);
            if new_fitness < best {
                tracing::trace!(iterations, g, fitness = new_fitness, "+");
                estimate = p3;
                best = new_fitness;
                accepted += 1;
            } else {
                tracing::trace!(iterations, g, fitness = new_fitness, "-");
                // Back off on the distance we jump
                g *= params.backoff_factor;
            }

            history.push(best);
            g *= params.decay_rate;
        }

        tracing::debug!(
            iterations,
            accepted,
            fitness = best,
            trust_radius = g,
            "descent finished"
        );

        Solution {
            radii: estimate,
            fitness: best,
            iterations,
            accepted,
            trust_radius: g,
            history,
        }
    }

    /// Run `starts` descents in parallel and return the best one.
    ///
    /// The first descent starts from `initial`, the others from `initial` with every component
    /// scaled by a random factor in `1 ± spread`.
    pub fn solve_multistart(
        &self,
        initial: &RadiusVector,
        starts: usize,
        spread: f64,
        seed: u64,
    ) -> Solution {
        let mut rng = SmallRng::seed_from_u64(seed);
        let guesses: Vec<RadiusVector> = (1..starts)
            .map(|_| initial.map(|r| r * (1.0 + rng.gen_range(-spread..=spread))))
            .collect();

        let (first, rest) = rayon::join(
            || self.solve(initial),
            || {
                guesses
                    .par_iter()
                    .map(|guess| self.solve(guess))
                    .min_by(|a, b| a.fitness.total_cmp(&b.fitness))
            },
        );

        match rest {
            Some(s) if s.fitness < first.fitness => s,
            _ => first,
        }
    }

    /// A step of length `g` down the gradient at `point`
    fn descent_step(&self, point: &RadiusVector, g: f64) -> RadiusVector {
        let grad = self.gradient(point, g * self.params.gradient_step_fraction);
        -rescaled(grad, g)
    }
}

/// The third step of an iteration: the second trial point with the first step taken back out,
/// scaled to `magnitude`
fn zigzag_correction(p2: &RadiusVector, first: &RadiusVector, magnitude: f64) -> RadiusVector {
    rescaled(p2 - first, magnitude)
}

/// Scale `v` to `magnitude`, keeping its direction. Zero (or broken) vectors become zero.
fn rescaled(mut v: RadiusVector, magnitude: f64) -> RadiusVector {
    let norm = v.norm();
    if norm > 0.0 && norm.is_finite() {
        v *= magnitude / norm;
    } else {
        v.fill(0.0);
    }
    v
}

/// Refine `initial_guess` with the default solver. See [`Solver::solve`].
pub fn optimize(
    initial_guess: &RadiusVector,
    angles: &[SensorAngles],
    pairs: &[PointPair],
    params: &Params,
) -> Solution {
    Solver::new(angles, pairs, *params).solve(initial_guess)
}

/// Refine `initial_guess` from `starts` starting points. See [`Solver::solve_multistart`].
pub fn optimize_multistart(
    initial_guess: &RadiusVector,
    angles: &[SensorAngles],
    pairs: &[PointPair],
    params: &Params,
    starts: usize,
    spread: f64,
    seed: u64,
) -> Solution {
    Solver::new(angles, pairs, *params).solve_multistart(initial_guess, starts, spread, seed)
}
