pub use nalgebra;
pub use rand;
pub use rand_distr;
pub use serde;

pub mod constants;
pub mod error;
pub mod geometry;
pub mod maths;
pub mod obs_data;
pub mod structs;
