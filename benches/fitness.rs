use criterion::{black_box, criterion_group, criterion_main, Criterion};

use common::constants::PTS;
use common::structs::{SensorAngles, SensorPoint, Vec3};
use radii::{build_pairs, fitness, gradient, optimize, Params, PointPair, RadiusVector};

/// A headset-sized constellation two meters in front of the lighthouse
fn headset() -> (RadiusVector, Vec<SensorAngles>, Vec<PointPair>) {
    let center = Vec3::new(2.0, 0.1, 0.0);
    let sensors: Vec<SensorPoint> = (0..PTS)
        .map(|i| {
            let t = i as f64 * 0.7;
            let normal = Vec3::new(t.cos(), t.sin(), (i as f64 / PTS as f64) - 0.5).normalize();
            SensorPoint {
                position: normal * 0.1,
                normal,
            }
        })
        .collect();
    let angles = sensors
        .iter()
        .map(|s| SensorAngles::from_direction(center + s.position))
        .collect();
    let pairs = build_pairs(&sensors, &[true; PTS]);
    (RadiusVector::from_element(PTS, 2.0), angles, pairs)
}

fn bench_fitness(c: &mut Criterion) {
    let (radii, angles, pairs) = headset();
    c.bench_function("fitness", |b| {
        b.iter(|| fitness(black_box(&radii), black_box(&angles), black_box(&pairs)))
    });
}

fn bench_gradient(c: &mut Criterion) {
    let (radii, angles, pairs) = headset();
    c.bench_function("gradient", |b| {
        b.iter(|| gradient(black_box(&angles), black_box(&radii), black_box(&pairs), 4e-4))
    });
}

fn bench_optimize(c: &mut Criterion) {
    let (radii, angles, pairs) = headset();
    let guess = &radii * 1.1;
    c.bench_function("optimize", |b| {
        b.iter(|| optimize(black_box(&guess), &angles, &pairs, &Params::default()))
    });
}

criterion_group!(benches, bench_fitness, bench_gradient, bench_optimize);
criterion_main!(benches);
