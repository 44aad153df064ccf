//! Some useful mathematical functions

use std::f64::consts::FRAC_PI_2;

use crate::constants::SWEEP_CENTER_TICKS;

/// Convert an average sweep timestamp to an angle in radians
pub fn ticks_to_angle(ticks: f64) -> f64 {
    (ticks - SWEEP_CENTER_TICKS) / SWEEP_CENTER_TICKS * FRAC_PI_2
}

/// Inverse of [`ticks_to_angle`]
pub fn angle_to_ticks(angle: f64) -> f64 {
    angle / FRAC_PI_2 * SWEEP_CENTER_TICKS + SWEEP_CENTER_TICKS
}

/// Cosine of the angle between two bearings given as (horizontal, vertical) pairs.
///
/// The horizontal angle plays the role of the polar angle and the vertical one of the azimuth,
/// so this is the spherical law of cosines.
#[inline]
pub fn cos_separation(h1: f64, v1: f64, h2: f64, v2: f64) -> f64 {
    h1.sin() * h2.sin() * (v1 - v2).cos() + h1.cos() * h2.cos()
}
