//! Column-major telemetry table
//!
//! The cleaning stage works on a flat table rather than nested per-frame
//! records. Flattening follows dot-qualified naming: `starship.speed`,
//! `superheavy.fuel.lox.fullness`, `superheavy.engines.inner_ring`. The
//! mission clock becomes four `time.*` columns which the cleaning stage
//! drops in favour of `real_time_seconds`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::telemetry::FrameSample;

/// Video-time column, seconds since the start of the footage
pub const REAL_TIME_COLUMN: &str = "real_time_seconds";

/// Frame index column
pub const FRAME_NUMBER_COLUMN: &str = "frame_number";

/// One column of samples
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Numeric samples, `None` where nothing was read
    Float(Vec<Option<f64>>),
    /// Raw per-engine activation lists, `None` where detection yielded nothing
    Flags(Vec<Option<Vec<bool>>>),
}

impl Column {
    /// Number of rows in the column
    pub fn len(&self) -> usize {
        match self {
            Column::Float(values) => values.len(),
            Column::Flags(values) => values.len(),
        }
    }

    /// True when the column has no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A table of telemetry samples, one row per captured frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryTable {
    // column insertion order, drives header order on export
    order: Vec<String>,
    columns: HashMap<String, Column>,
    rows: usize,
}

impl TelemetryTable {
    /// An empty table
    pub fn new() -> Self {
        TelemetryTable::default()
    }

    /// Flatten per-frame records into dot-qualified columns.
    ///
    /// Tank and engine-group columns are the union over all frames, with
    /// `None` filled in where a frame lacked the key.
    pub fn from_samples(samples: &[FrameSample]) -> Self {
        let mut table = TelemetryTable::new();

        table.insert_float(
            FRAME_NUMBER_COLUMN,
            samples
                .iter()
                .map(|sample| Some(sample.frame_number as f64))
                .collect(),
        );
        table.insert_float(
            REAL_TIME_COLUMN,
            samples
                .iter()
                .map(|sample| Some(sample.real_time_seconds))
                .collect(),
        );

        table.insert_float(
            "time.sign",
            samples
                .iter()
                .map(|sample| sample.telemetry.time.map(|clock| clock.sign.signum()))
                .collect(),
        );
        for (name, component) in [
            ("time.hours", 0usize),
            ("time.minutes", 1),
            ("time.seconds", 2),
        ] {
            table.insert_float(
                name,
                samples
                    .iter()
                    .map(|sample| {
                        sample.telemetry.time.map(|clock| {
                            [clock.hours, clock.minutes, clock.seconds][component] as f64
                        })
                    })
                    .collect(),
            );
        }

        // union of vehicles, tanks and engine groups across the flight
        let mut layouts: BTreeMap<&str, (BTreeSet<&str>, BTreeSet<&str>)> = BTreeMap::new();
        for sample in samples {
            for (vehicle, telemetry) in &sample.telemetry.vehicles {
                let (tanks, groups) = layouts.entry(vehicle.as_str()).or_default();
                tanks.extend(telemetry.fuel.keys().map(String::as_str));
                groups.extend(telemetry.engines.keys().map(String::as_str));
            }
        }

        for (vehicle, (tanks, groups)) in &layouts {
            table.insert_float(
                format!("{vehicle}.speed"),
                samples
                    .iter()
                    .map(|sample| {
                        sample
                            .telemetry
                            .vehicles
                            .get(*vehicle)
                            .and_then(|telemetry| telemetry.speed)
                    })
                    .collect(),
            );
            table.insert_float(
                format!("{vehicle}.altitude"),
                samples
                    .iter()
                    .map(|sample| {
                        sample
                            .telemetry
                            .vehicles
                            .get(*vehicle)
                            .and_then(|telemetry| telemetry.altitude)
                    })
                    .collect(),
            );
            for tank in tanks {
                table.insert_float(
                    format!("{vehicle}.fuel.{tank}.fullness"),
                    samples
                        .iter()
                        .map(|sample| {
                            sample
                                .telemetry
                                .vehicles
                                .get(*vehicle)
                                .and_then(|telemetry| telemetry.fuel.get(*tank))
                                .map(|level| level.fullness)
                        })
                        .collect(),
                );
            }
            for group in groups {
                table.insert_flags(
                    format!("{vehicle}.engines.{group}"),
                    samples
                        .iter()
                        .map(|sample| {
                            sample
                                .telemetry
                                .vehicles
                                .get(*vehicle)
                                .and_then(|telemetry| telemetry.engines.get(*group))
                                .cloned()
                        })
                        .collect(),
                );
            }
        }

        table
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows
    }

    /// True when the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Column names in insertion order
    pub fn column_names(&self) -> &[String] {
        &self.order
    }

    /// True when a column with this name exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// A numeric column's values, `None` for missing or non-numeric columns
    pub fn float(&self, name: &str) -> Option<&[Option<f64>]> {
        match self.columns.get(name) {
            Some(Column::Float(values)) => Some(values),
            _ => None,
        }
    }

    /// Mutable access to a numeric column
    pub fn float_mut(&mut self, name: &str) -> Option<&mut Vec<Option<f64>>> {
        match self.columns.get_mut(name) {
            Some(Column::Float(values)) => Some(values),
            _ => None,
        }
    }

    /// A flags column's values, `None` for missing or numeric columns
    pub fn flags(&self, name: &str) -> Option<&[Option<Vec<bool>>]> {
        match self.columns.get(name) {
            Some(Column::Flags(values)) => Some(values),
            _ => None,
        }
    }

    /// Insert or replace a numeric column
    pub fn insert_float<S: Into<String>>(&mut self, name: S, values: Vec<Option<f64>>) {
        self.insert_column(name.into(), Column::Float(values));
    }

    /// Insert or replace a flags column
    pub fn insert_flags<S: Into<String>>(&mut self, name: S, values: Vec<Option<Vec<bool>>>) {
        self.insert_column(name.into(), Column::Flags(values));
    }

    fn insert_column(&mut self, name: String, column: Column) {
        if self.columns.is_empty() {
            self.rows = column.len();
        } else {
            debug_assert_eq!(column.len(), self.rows, "column {name} has wrong row count");
        }
        if !self.columns.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.columns.insert(name, column);
    }

    /// Remove a column, returning whether it existed
    pub fn drop_column(&mut self, name: &str) -> bool {
        if self.columns.remove(name).is_some() {
            self.order.retain(|existing| existing != name);
            true
        } else {
            false
        }
    }

    /// Sort all rows ascending by `real_time_seconds`.
    ///
    /// Stable, so frames sharing a timestamp keep their capture order. Rows
    /// without a timestamp sort to the end. No-op when the column is absent.
    pub fn sort_by_time(&mut self) {
        let keys = match self.float(REAL_TIME_COLUMN) {
            Some(values) => values.to_vec(),
            None => return,
        };
        let mut order: Vec<usize> = (0..self.rows).collect();
        order.sort_by(|&a, &b| match (keys[a], keys[b]) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        for column in self.columns.values_mut() {
            match column {
                Column::Float(values) => {
                    let reordered: Vec<_> = order.iter().map(|&i| values[i]).collect();
                    *values = reordered;
                }
                Column::Flags(values) => {
                    let reordered: Vec<_> = order.iter().map(|&i| values[i].clone()).collect();
                    *values = reordered;
                }
            }
        }
    }
}
