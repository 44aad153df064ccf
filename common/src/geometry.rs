//! Reading the fixed geometry of the tracked object

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::LoadError;
use crate::structs::{SensorPoint, Vec3};

/// Parse `x y z` lines. Fields may be separated by whitespace or commas; blank lines are ignored.
///
/// Reads at most `count` vectors and fails if there are fewer.
pub fn parse_vectors(
    reader: impl BufRead,
    count: usize,
    what: &'static str,
) -> Result<Vec<Vec3>, LoadError> {
    let mut out = Vec::with_capacity(count);
    for (lineno, line) in reader.lines().enumerate() {
        if out.len() == count {
            break;
        }
        let line = line.map_err(|source| LoadError::Read {
            path: what.into(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<f64> = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|f| !f.is_empty())
            .map_while(|f| f.parse().ok().filter(|x: &f64| x.is_finite()))
            .collect();
        let [x, y, z] = fields[..] else {
            return Err(LoadError::BadLine {
                what,
                line: lineno + 1,
            });
        };
        out.push(Vec3::new(x, y, z));
    }
    if out.len() < count {
        return Err(LoadError::TooFew {
            what,
            expected: count,
            found: out.len(),
        });
    }
    Ok(out)
}

/// Read `count` vectors from a file
pub fn read_vectors(
    path: impl AsRef<Path>,
    count: usize,
    what: &'static str,
) -> Result<Vec<Vec3>, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_owned(),
        source,
    })?;
    parse_vectors(BufReader::new(file), count, what).map_err(|e| match e {
        LoadError::Read { source, .. } => LoadError::Read {
            path: path.to_owned(),
            source,
        },
        e => e,
    })
}

/// Load sensor positions and normals
pub fn load_sensors(
    points: impl AsRef<Path>,
    normals: impl AsRef<Path>,
    count: usize,
) -> Result<Vec<SensorPoint>, LoadError> {
    let positions = read_vectors(points, count, "points")?;
    tracing::info!("Loaded {} points", positions.len());
    let normals = read_vectors(normals, count, "normals")?;
    tracing::info!("Loaded {} norms", normals.len());
    if positions.len() != normals.len() {
        return Err(LoadError::CountMismatch {
            points: positions.len(),
            normals: normals.len(),
        });
    }
    Ok(positions
        .into_iter()
        .zip(normals)
        .map(|(position, normal)| SensorPoint { position, normal })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_whitespace_and_commas() {
        let text = "0.1 0.2 0.3\n\n-1,2,  3e-2\n4 5 6\n";
        let v = parse_vectors(text.as_bytes(), 3, "points").unwrap();
        assert_eq!(v.len(), 3);
        assert_eq!(v[1], Vec3::new(-1.0, 2.0, 0.03));
    }

    #[test]
    fn extra_lines_are_ignored() {
        let text = "1 1 1\n2 2 2\ngarbage\n";
        let v = parse_vectors(text.as_bytes(), 2, "points").unwrap();
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn bad_line() {
        let text = "1 1 1\n2 2\n";
        let err = parse_vectors(text.as_bytes(), 2, "normals").unwrap_err();
        assert!(matches!(err, LoadError::BadLine { line: 2, .. }));
    }

    #[test]
    fn too_few() {
        let text = "1 1 1\n";
        let err = parse_vectors(text.as_bytes(), 32, "points").unwrap_err();
        assert!(matches!(
            err,
            LoadError::TooFew {
                expected: 32,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let points = dir.path().join("points.csv");
        let normals = dir.path().join("normals.csv");
        let mut p = File::create(&points).unwrap();
        let mut n = File::create(&normals).unwrap();
        for i in 0..4 {
            writeln!(p, "{} 0 0", i).unwrap();
            writeln!(n, "0 0 1").unwrap();
        }
        let sensors = load_sensors(&points, &normals, 4).unwrap();
        assert_eq!(sensors.len(), 4);
        assert_eq!(sensors[3].position, Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(sensors[0].normal, Vec3::z());

        let err = load_sensors(dir.path().join("missing"), &normals, 4).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
    }
}
