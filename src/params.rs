//! Tunable parameters of the gradient descent
//!
//! The values are somewhat magic and definitely tunable. They can be loaded from a TOML file,
//! missing keys take their default values.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Params {
    /// The biggest step the descent can take at first.
    ///
    /// Bigger values are faster when the initial guess is far off, but may jump out of the
    /// right minimum into another one and need a few rejected iterations to shrink to a useful
    /// size.
    pub initial_trust_radius: f64,
    /// The descent stops once the trust radius falls below this value. This is roughly how close
    /// to the local minimum we want to get.
    pub terminal_trust_radius: f64,
    /// The trust radius is multiplied by this after every iteration. Close to 1: more
    /// iterations, better precision.
    pub decay_rate: f64,
    /// Extra multiplier applied after a rejected step. Controls how fast the descent recovers
    /// from an overshoot.
    pub backoff_factor: f64,
    /// Length of the zigzag correction relative to the trust radius. Values between 1/10 and 1/3
    /// work well; controls convergence speed in narrow valleys.
    pub correction_scale: f64,
    /// Finite difference step relative to the trust radius
    pub gradient_step_fraction: f64,
    /// Hard limit on the number of iterations
    pub max_iterations: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            initial_trust_radius: 0.4,
            terminal_trust_radius: 0.01,
            decay_rate: 0.99,
            backoff_factor: 0.7,
            correction_scale: 0.25,
            gradient_step_fraction: 1e-3,
            max_iterations: 40_000,
        }
    }
}

impl Params {
    /// Slower decay and a finer final step.
    ///
    /// A compact constellation far from the base station (a headset a few meters away) sees all
    /// its sensors under a narrow cone, and the fitness is nearly flat along the common scale of
    /// the radii. The defaults stop a few percent short there; these settings reach well under
    /// one percent at the cost of a few times more iterations.
    pub fn precise() -> Self {
        Self {
            decay_rate: 0.995,
            terminal_trust_radius: 1e-4,
            ..Self::default()
        }
    }

    pub fn read_from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?;
        let params: Self = toml::from_str(&contents)
            .with_context(|| format!("could not parse {}", path.display()))?;
        params.validate()?;
        Ok(params)
    }

    /// Reject values for which the descent would never terminate or never move
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.initial_trust_radius > 0.0 && self.initial_trust_radius.is_finite(),
            "initial_trust_radius must be positive"
        );
        anyhow::ensure!(
            self.terminal_trust_radius > 0.0,
            "terminal_trust_radius must be positive"
        );
        anyhow::ensure!(
            self.decay_rate > 0.0 && self.decay_rate <= 1.0,
            "decay_rate must be in (0, 1]"
        );
        anyhow::ensure!(
            self.backoff_factor > 0.0 && self.backoff_factor < 1.0,
            "backoff_factor must be in (0, 1)"
        );
        anyhow::ensure!(
            self.correction_scale >= 0.0,
            "correction_scale must not be negative"
        );
        anyhow::ensure!(
            self.gradient_step_fraction > 0.0,
            "gradient_step_fraction must be positive"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        Params::default().validate().unwrap();
        Params::precise().validate().unwrap();
        assert_eq!(
            Params::precise().initial_trust_radius,
            Params::default().initial_trust_radius
        );
    }

    #[test]
    fn partial_toml() {
        let params: Params =
            toml::from_str("correction_scale = 0.1\nmax_iterations = 500").unwrap();
        assert_eq!(params.correction_scale, 0.1);
        assert_eq!(params.max_iterations, 500);
        assert_eq!(params.decay_rate, Params::default().decay_rate);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Params>("decay = 0.5").is_err());
    }

    #[test]
    fn from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backoff_factor = 0.5").unwrap();
        let params = Params::read_from_toml_file(file.path()).unwrap();
        assert_eq!(params.backoff_factor, 0.5);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backoff_factor = 1.5").unwrap();
        assert!(Params::read_from_toml_file(file.path()).is_err());
    }
}
