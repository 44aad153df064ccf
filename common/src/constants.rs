//! Useful constants to have

/// Number of sensors on the headset
pub const PTS: usize = 32;

/// A sensor is trusted for a primary fix only if both of its sweeps were seen at least this many
/// times
pub const MIN_HITS_FOR_VALID: u32 = 10;

/// Sweep timestamp (in ticks) that corresponds to the zero angle.
///
/// One full quarter turn of the rotor is also `SWEEP_CENTER_TICKS` ticks long.
pub const SWEEP_CENTER_TICKS: f64 = 200_000.;

/// Device name of the headset in the measurement records
pub const DEFAULT_DEVICE: &str = "HMD";

/// Default file with sensor positions
pub const POINTS_FILE: &str = "HMD_points.csv";

/// Default file with sensor normals
pub const NORMALS_FILE: &str = "HMD_normals.csv";

/// Unicode's degree symbol
pub const DEGREE_SYM: char = '\u{00b0}';
