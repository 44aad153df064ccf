//! Basic structures such as Vec3

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::constants::DEGREE_SYM;

pub type Vec3 = nalgebra::Vector3<f64>;

pub type UnitVec3 = nalgebra::UnitVector3<f64>;

/// One sensor on the rigid body
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SensorPoint {
    /// Position in the body frame
    pub position: Vec3,
    /// Outward normal. Loaded for completeness, the solver does not use it.
    pub normal: Vec3,
}

/// The bearing from the base station to a sensor, in radians
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct SensorAngles {
    pub horizontal: f64,
    pub vertical: f64,
}

impl SensorAngles {
    pub fn new(horizontal: f64, vertical: f64) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Bearing pointing along `dir`. `dir` does not have to be normalized.
    pub fn from_direction(dir: Vec3) -> Self {
        let h = (dir.z / dir.norm()).clamp(-1.0, 1.0).acos();
        let v = f64::atan2(dir.y, dir.x);
        Self::new(h, v)
    }

    /// Unit vector of this bearing. The horizontal angle is measured from the z axis, the vertical
    /// one around it.
    pub fn direction(self) -> UnitVec3 {
        let (sin_h, cos_h) = self.horizontal.sin_cos();
        let (sin_v, cos_v) = self.vertical.sin_cos();
        UnitVec3::new_unchecked(Vec3::new(sin_h * cos_v, sin_h * sin_v, cos_h))
    }

    pub fn is_finite(self) -> bool {
        self.horizontal.is_finite() && self.vertical.is_finite()
    }
}

impl Display for SensorAngles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.3}{DEGREE_SYM}, {:.3}{DEGREE_SYM})",
            self.horizontal.to_degrees(),
            self.vertical.to_degrees()
        )
    }
}
