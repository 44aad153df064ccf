//! Estimate the distance from one lighthouse to every sensor of the headset.
//!
//! Run:
//! ```bash
//! $ lighthouse-radii -h
//! ```
//! to see which parameters of the implementation can be tweaked.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use yansi::Paint;

use common::constants::*;
use common::geometry::load_sensors;
use common::maths::cos_separation;
use common::obs_data::{AngleTable, Selector};
use common::structs::SensorAngles;
use radii::{build_pairs, Params, RadiusVector, Solver};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Which lighthouse to use (L or R)
    #[arg(value_parser = parse_camera)]
    camera: char,
    /// Processed measurement records
    datafile: PathBuf,
    /// Sensor positions
    #[arg(long, default_value = POINTS_FILE)]
    points: PathBuf,
    /// Sensor normals
    #[arg(long, default_value = NORMALS_FILE)]
    normals: PathBuf,
    /// Device name in the measurement records
    #[arg(long, default_value = DEFAULT_DEVICE)]
    device: String,
    /// Number of sensors on the device
    #[arg(long, default_value_t = PTS)]
    sensors: usize,
    /// Initial guess for every radius
    #[arg(long, default_value_t = 2.0)]
    initial_radius: f64,
    /// TOML file with the descent parameters
    #[arg(long)]
    config: Option<PathBuf>,
    /// Start from the slower, finer descent parameters meant for compact constellations
    #[arg(long, conflicts_with = "config")]
    precise: bool,
    /// Override the zigzag correction scale
    #[arg(long)]
    correction_scale: Option<f64>,
    /// Override the iteration limit
    #[arg(long)]
    max_iterations: Option<usize>,
    /// Number of independent descents to run
    #[arg(long, default_value_t = 1)]
    starts: usize,
    /// Relative spread of the additional starting points
    #[arg(long, default_value_t = 0.2)]
    spread: f64,
    /// Seed for the additional starting points
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Radii outside of this range are reported as implausible
    #[arg(long, default_value_t = 0.05)]
    min_radius: f64,
    #[arg(long, default_value_t = 50.0)]
    max_radius: f64,
    /// Write the solution to this file as JSON
    #[arg(long)]
    json: Option<PathBuf>,
    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_camera(s: &str) -> Result<char, String> {
    match s.chars().next() {
        Some(c @ ('L' | 'R')) => Ok(c),
        _ => Err(format!("camera must be L or R, got {s:?}")),
    }
}

#[derive(Serialize)]
struct Report {
    camera: char,
    best_sensor: usize,
    best_sensor_hits: u32,
    fitness: f64,
    iterations: usize,
    accepted: usize,
    /// `null` for sensors that were not seen by both sweeps
    radii: Vec<Option<f64>>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut params = match &args.config {
        Some(path) => Params::read_from_toml_file(path)?,
        None if args.precise => Params::precise(),
        None => Params::default(),
    };
    if let Some(correction_scale) = args.correction_scale {
        params.correction_scale = correction_scale;
    }
    if let Some(max_iterations) = args.max_iterations {
        params.max_iterations = max_iterations;
    }
    params.validate()?;

    let sensors = load_sensors(&args.points, &args.normals, args.sensors)
        .context("could not load the headset geometry")?;
    let table = AngleTable::read_from_file(
        &args.datafile,
        args.sensors,
        Selector {
            device: &args.device,
            camera: args.camera,
        },
    )
    .context("could not load the measurements")?;

    let Some((best_sensor, best_hits)) = table.best_sensor() else {
        bail!("Not enough data for a primary fix: no sensor was seen by both sweeps");
    };
    if best_hits < MIN_HITS_FOR_VALID {
        bail!(
            "Not enough data for a primary fix: best sensor {best_sensor} has {best_hits} hits, \
             {MIN_HITS_FOR_VALID} needed"
        );
    }
    tracing::info!("Best sensor: {best_sensor} ({best_hits} hits)");

    let valid = table.valid_mask();
    let pairs = build_pairs(&sensors, &valid);
    if pairs.is_empty() {
        bail!("Not enough data for a fix: fewer than two sensors were seen by both sweeps");
    }
    tracing::info!(
        "{} of {} sensors usable, {} pairs",
        valid.iter().filter(|v| **v).count(),
        valid.len(),
        pairs.len()
    );

    let extent = widest_separation(&table.angles, &valid);
    tracing::debug!(
        "Widest angle between usable sensors: {:.2}{DEGREE_SYM}",
        extent.to_degrees()
    );
    if extent < NARROW_CONSTELLATION && params == Params::default() {
        tracing::warn!(
            "All sensors are within {:.2}{DEGREE_SYM}; the default descent may stop a few percent \
             short of the minimum, consider --precise",
            extent.to_degrees()
        );
    }

    let initial = RadiusVector::from_element(args.sensors, args.initial_radius);
    let solver = Solver::new(&table.angles, &pairs, params);
    let solution = if args.starts > 1 {
        solver.solve_multistart(&initial, args.starts, args.spread, args.seed)
    } else {
        solver.solve(&initial)
    };

    println!(
        "Fitness: {:.6} ({} iterations, {} accepted)",
        solution.fitness, solution.iterations, solution.accepted
    );
    for (i, r) in solution.radii.iter().enumerate() {
        if !valid[i] {
            println!("{i:>3}: {}", Paint::new("-").dimmed());
        } else if (args.min_radius..=args.max_radius).contains(r) {
            println!(
                "{i:>3}: {} {}",
                Paint::green(format!("{r:.4}")),
                table.angles[i]
            );
        } else {
            println!(
                "{i:>3}: {} {}",
                Paint::red(format!("{r:.4}")),
                table.angles[i]
            );
        }
    }

    if !solution.is_plausible(args.min_radius, args.max_radius) {
        tracing::warn!(
            "Some radii are outside of [{}, {}], the fix is probably wrong",
            args.min_radius,
            args.max_radius
        );
    }

    if let Some(path) = &args.json {
        let report = Report {
            camera: args.camera,
            best_sensor,
            best_sensor_hits: best_hits,
            fitness: solution.fitness,
            iterations: solution.iterations,
            accepted: solution.accepted,
            radii: usable_radii(&solution.radii, &valid),
        };
        let file =
            File::create(path).with_context(|| format!("could not create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report)
            .context("could not serialize the solution")?;
        tracing::info!("Solution has been saved to {}", path.display());
    }

    Ok(())
}

/// Below this (in radians) the fitness is nearly flat along the common scale of the radii
const NARROW_CONSTELLATION: f64 = 0.2;

/// Largest angle between the bearings of two usable sensors
fn widest_separation(angles: &[SensorAngles], valid: &[bool]) -> f64 {
    let usable: Vec<&SensorAngles> = angles
        .iter()
        .zip(valid)
        .filter_map(|(a, &v)| v.then_some(a))
        .collect();
    let mut min_cos = 1f64;
    for (i, a) in usable.iter().enumerate() {
        for b in &usable[i + 1..] {
            min_cos = min_cos.min(cos_separation(
                a.horizontal,
                a.vertical,
                b.horizontal,
                b.vertical,
            ));
        }
    }
    min_cos.clamp(-1.0, 1.0).acos()
}

/// Radii of sensors that took part in the fit
fn usable_radii(radii: &RadiusVector, valid: &[bool]) -> Vec<Option<f64>> {
    radii
        .iter()
        .zip(valid)
        .map(|(&r, &v)| v.then_some(r))
        .collect()
}
