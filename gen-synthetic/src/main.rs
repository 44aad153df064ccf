//! Generate a random headset, its geometry files and the measurement records one lighthouse
//! would produce for it.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use common::constants::*;
use common::maths::angle_to_ticks;
use common::nalgebra::UnitQuaternion;
use common::rand::prelude::*;
use common::rand_distr::{Normal, StandardNormal};
use common::structs::{SensorAngles, SensorPoint, Vec3};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Where to put the generated files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    #[arg(long, default_value_t = PTS)]
    sensors: usize,
    /// Distance from the lighthouse to the center of the headset
    #[arg(long, default_value_t = 2.0)]
    distance: f64,
    /// Radius of the sphere the sensors are placed on
    #[arg(long, default_value_t = 0.5)]
    size: f64,
    /// Standard deviation of the angular noise (radians)
    #[arg(long, default_value_t = 0.0)]
    noise: f64,
    /// Sample count written for every sweep
    #[arg(long, default_value_t = 500)]
    hits: u32,
    /// Leave this many sensors unobserved
    #[arg(long, default_value_t = 0)]
    hidden: usize,
    #[arg(long, default_value_t = 'L')]
    camera: char,
    #[arg(long, default_value = DEFAULT_DEVICE)]
    device: String,
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Serialize)]
struct Truth {
    sensors: Vec<SensorPoint>,
    angles: Vec<SensorAngles>,
    radii: Vec<f64>,
    hidden: Vec<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let noise = Normal::new(0.0, args.noise).context("invalid noise")?;

    let sensors: Vec<SensorPoint> = (0..args.sensors)
        .map(|_| {
            let normal = random_unit(&mut rng);
            SensorPoint {
                position: normal * args.size,
                normal,
            }
        })
        .collect();

    // Place the headset in front of the lighthouse with a random orientation
    let angle = rng.gen_range(0.0..std::f64::consts::PI);
    let rotation = UnitQuaternion::new(random_unit(&mut rng) * angle);
    let center = Vec3::new(args.distance, 0.0, 0.0);
    let world: Vec<Vec3> = sensors
        .iter()
        .map(|s| center + rotation * s.position)
        .collect();

    let mut hidden: Vec<usize> = (0..args.sensors).collect();
    hidden.shuffle(&mut rng);
    hidden.truncate(args.hidden);
    hidden.sort_unstable();

    let angles: Vec<SensorAngles> = world
        .iter()
        .map(|&p| {
            let exact = SensorAngles::from_direction(p);
            SensorAngles::new(
                exact.horizontal + rng.sample(noise),
                exact.vertical + rng.sample(noise),
            )
        })
        .collect();

    write_vectors(&args.out_dir.join(POINTS_FILE), sensors.iter().map(|s| s.position))?;
    write_vectors(&args.out_dir.join(NORMALS_FILE), sensors.iter().map(|s| s.normal))?;

    let records_path = args.out_dir.join("processed_data.txt");
    let mut out = BufWriter::new(
        File::create(&records_path)
            .with_context(|| format!("could not create {}", records_path.display()))?,
    );
    let stddev_ticks = angle_to_ticks(args.noise) - SWEEP_CENTER_TICKS;
    for (id, a) in angles.iter().enumerate() {
        if hidden.binary_search(&id).is_ok() {
            continue;
        }
        for (axis, angle) in [('X', a.horizontal), ('Y', a.vertical)] {
            writeln!(
                out,
                "{} {}{} {} {} {:.6} {:.6} {:.6} {:.6}",
                args.device,
                args.camera,
                axis,
                id,
                args.hits,
                angle_to_ticks(angle),
                300.0,
                stddev_ticks,
                3.0
            )?;
        }
    }
    out.flush()?;

    let truth = Truth {
        radii: world.iter().map(|p| p.norm()).collect(),
        sensors,
        angles,
        hidden,
    };
    let truth_path = args.out_dir.join("truth.json");
    serde_json::to_writer_pretty(
        BufWriter::new(
            File::create(&truth_path)
                .with_context(|| format!("could not create {}", truth_path.display()))?,
        ),
        &truth,
    )?;

    eprintln!(
        "Generated {} sensors in {}",
        args.sensors,
        args.out_dir.display()
    );
    Ok(())
}

fn random_unit(rng: &mut impl Rng) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.sample(StandardNormal),
            rng.sample(StandardNormal),
            rng.sample(StandardNormal),
        );
        let norm = v.norm();
        if norm > 1e-6 {
            return v / norm;
        }
    }
}

fn write_vectors(path: &Path, vectors: impl Iterator<Item = Vec3>) -> Result<()> {
    let mut out = BufWriter::new(
        File::create(path).with_context(|| format!("could not create {}", path.display()))?,
    );
    for v in vectors {
        writeln!(out, "{:.9} {:.9} {:.9}", v.x, v.y, v.z)?;
    }
    out.flush()?;
    Ok(())
}
