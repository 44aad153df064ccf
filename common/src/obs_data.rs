//! Measurement records produced by the lighthouse data processing step

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use crate::constants::MIN_HITS_FOR_VALID;
use crate::error::{LoadError, RecordError};
use crate::maths::ticks_to_angle;
use crate::structs::SensorAngles;

/// Which sweep an angle comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// One line of the processed data file, e.g.
///
/// ```text
/// HMD LX 0 3433 173656.227498 327.160210 36.342361 2.990936
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub device: String,
    /// Camera (`L`/`R`) followed by the sweep axis (`X`/`Y`)
    pub input: String,
    pub id: usize,
    pub sample_count: u32,
    pub avg_time: f64,
    pub avg_len: f64,
    pub stddev_time: f64,
    pub stddev_len: f64,
}

impl Record {
    pub fn camera(&self) -> Option<char> {
        self.input.chars().next()
    }

    pub fn axis(&self) -> Axis {
        match self.input.chars().nth(1) {
            Some('Y') => Axis::Vertical,
            _ => Axis::Horizontal,
        }
    }

    /// The mean angle of this sweep in radians
    pub fn angle(&self) -> f64 {
        ticks_to_angle(self.avg_time)
    }
}

impl FromStr for Record {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        let [device, input, id, sample_count, avg_time, avg_len, stddev_time, stddev_len] =
            fields[..]
        else {
            return Err(RecordError::FieldCount(fields.len()));
        };
        let record = Self {
            device: device.to_owned(),
            input: input.to_owned(),
            id: parse_field("id", id)?,
            sample_count: parse_field("sample count", sample_count)?,
            avg_time: parse_field("average time", avg_time)?,
            avg_len: parse_field("average length", avg_len)?,
            stddev_time: parse_field("time deviation", stddev_time)?,
            stddev_len: parse_field("length deviation", stddev_len)?,
        };
        if !record.avg_time.is_finite() {
            return Err(RecordError::NonFinite);
        }
        Ok(record)
    }
}

fn parse_field<T: FromStr>(field: &'static str, value: &str) -> Result<T, RecordError> {
    value.parse().map_err(|_| RecordError::BadField {
        field,
        value: value.to_owned(),
    })
}

/// Selects which records of the data file are used
#[derive(Debug, Clone, Copy)]
pub struct Selector<'a> {
    pub device: &'a str,
    pub camera: char,
}

impl Selector<'_> {
    pub fn matches(&self, record: &Record) -> bool {
        record.device == self.device && record.camera() == Some(self.camera)
    }
}

/// Bearings of every sensor as seen by one base station, together with how many samples back
/// each of them
#[derive(Debug, Clone, PartialEq)]
pub struct AngleTable {
    pub angles: Vec<SensorAngles>,
    /// `[horizontal, vertical]` hit counts per sensor
    pub hits: Vec<[u32; 2]>,
}

impl AngleTable {
    /// A table of `n` sensors, none of them observed
    pub fn new(n: usize) -> Self {
        Self {
            angles: vec![SensorAngles::default(); n],
            hits: vec![[0; 2]; n],
        }
    }

    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    /// Store a measurement. Later records for the same sensor and axis replace earlier ones.
    pub fn set(&mut self, id: usize, axis: Axis, angle: f64, hits: u32) {
        match axis {
            Axis::Horizontal => {
                self.angles[id].horizontal = angle;
                self.hits[id][0] = hits;
            }
            Axis::Vertical => {
                self.angles[id].vertical = angle;
                self.hits[id][1] = hits;
            }
        }
    }

    /// Number of samples backing both sweeps of a sensor
    pub fn min_hits(&self, id: usize) -> u32 {
        let [h, v] = self.hits[id];
        h.min(v)
    }

    /// The sensor seen best by both sweeps and its hit count. On ties the lowest index wins.
    /// Returns `None` if no sensor was seen by both sweeps.
    pub fn best_sensor(&self) -> Option<(usize, u32)> {
        let mut best = None;
        let mut max_hits = 0;
        for id in 0..self.len() {
            let hits = self.min_hits(id);
            if hits > max_hits {
                max_hits = hits;
                best = Some((id, hits));
            }
        }
        best
    }

    /// Whether there is enough data for a primary fix
    pub fn has_primary_fix(&self) -> bool {
        self.best_sensor()
            .map_or(false, |(_, hits)| hits >= MIN_HITS_FOR_VALID)
    }

    /// Sensors that have both of their angles
    pub fn valid_mask(&self) -> Vec<bool> {
        (0..self.len()).map(|id| self.min_hits(id) > 0).collect()
    }

    /// Build the table from the records of one camera. Malformed lines and out-of-range ids
    /// are logged and skipped.
    pub fn from_reader(
        reader: impl BufRead,
        n: usize,
        selector: Selector,
    ) -> Result<Self, LoadError> {
        let mut table = Self::new(n);
        for (lineno, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| LoadError::Read {
                path: "measurements".into(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let record = match line.parse::<Record>() {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!("Skipping line {} of processed data: {e}", lineno + 1);
                    continue;
                }
            };
            if !selector.matches(&record) {
                continue;
            }
            if record.id >= n {
                tracing::warn!(
                    "Sensor id {} on line {} is out of range (0..{n})",
                    record.id,
                    lineno + 1
                );
                continue;
            }
            table.set(record.id, record.axis(), record.angle(), record.sample_count);
        }
        Ok(table)
    }

    pub fn read_from_file(
        path: impl AsRef<Path>,
        n: usize,
        selector: Selector,
    ) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_owned(),
            source,
        })?;
        Self::from_reader(BufReader::new(file), n, selector).map_err(|e| match e {
            LoadError::Read { source, .. } => LoadError::Read {
                path: path.to_owned(),
                source,
            },
            e => e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::FRAC_PI_2;

    const SEL: Selector = Selector {
        device: "HMD",
        camera: 'L',
    };

    #[test]
    fn parse_record() {
        let r: Record = "HMD LX 0 3433 173656.227498 327.160210 36.342361 2.990936"
            .parse()
            .unwrap();
        assert_eq!(r.device, "HMD");
        assert_eq!(r.camera(), Some('L'));
        assert_eq!(r.axis(), Axis::Horizontal);
        assert_eq!(r.id, 0);
        assert_eq!(r.sample_count, 3433);
        assert_approx_eq!(
            r.angle(),
            (173656.227498 - 200000.0) / 200000.0 * FRAC_PI_2
        );

    }

    #[test]
    fn record_errors() {
        let parse = |s: &str| s.parse::<Record>().unwrap_err();
        assert_eq!(
            parse("HMD LX 0 3433 1.0 2.0 3.0"),
            RecordError::FieldCount(7)
        );
        assert_eq!(
            parse("HMD LX 0 3433 1.0 2.0 3.0 4.0 5.0"),
            RecordError::FieldCount(9)
        );
        assert_eq!(
            parse("HMD LX zero 3433 1.0 2.0 3.0 4.0"),
            RecordError::BadField {
                field: "id",
                value: "zero".into()
            }
        );
        assert_eq!(
            parse("HMD LX 0 -5 1.0 2.0 3.0 4.0"),
            RecordError::BadField {
                field: "sample count",
                value: "-5".into()
            }
        );
        assert_eq!(
            parse("HMD LX 0 3433 NaN 2.0 3.0 4.0"),
            RecordError::NonFinite
        );
        assert_eq!(
            parse("HMD LX 0 3433 inf 2.0 3.0 4.0").to_string(),
            "average time is not finite"
        );
    }

    #[test]
    fn table_from_records() {
        let text = "\
HMD LX 0 20 200000 1 1 1
HMD LY 0 15 300000 1 1 1
HMD RX 1 90 100000 1 1 1
WM0 LX 1 90 100000 1 1 1
this line is broken
HMD LX 1 40 100000 1 1 1
HMD LX 77 40 100000 1 1 1
";
        let table = AngleTable::from_reader(text.as_bytes(), 4, SEL).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.hits[0], [20, 15]);
        assert_approx_eq!(table.angles[0].horizontal, 0.0);
        assert_approx_eq!(table.angles[0].vertical, FRAC_PI_2 / 2.0);
        // Right camera and other devices are ignored
        assert_eq!(table.hits[1], [40, 0]);
        assert_eq!(table.valid_mask(), vec![true, false, false, false]);
        assert_eq!(table.best_sensor(), Some((0, 15)));
        assert!(table.has_primary_fix());
    }

    #[test]
    fn not_enough_for_a_fix() {
        let mut table = AngleTable::new(3);
        assert_eq!(table.best_sensor(), None);
        assert!(!table.has_primary_fix());

        table.set(2, Axis::Horizontal, 0.1, 500);
        table.set(2, Axis::Vertical, 0.1, 9);
        assert_eq!(table.best_sensor(), Some((2, 9)));
        assert!(!table.has_primary_fix());

        table.set(1, Axis::Horizontal, 0.1, 10);
        table.set(1, Axis::Vertical, 0.1, 10);
        assert_eq!(table.best_sensor(), Some((1, 10)));
        assert!(table.has_primary_fix());
    }
}
