//! Telemetry Series Processing
//!
//! Everything that happens after extraction: the per-frame records are
//! flattened into a dot-qualified column table, cleaned (engine folding,
//! fuel reconciliation, outlier rejection), enriched with derived motion
//! channels and exported. All passes are vehicle-count-agnostic; the
//! vehicles are re-detected from column names so a one-vehicle flight never
//! trips over another vehicle's absent columns.

mod analysis;
mod cleaning;
mod engines;
mod export;
mod fuel;
mod table;

pub use analysis::{
    add_motion_channels, compute_acceleration, compute_g_force, DEFAULT_FRAME_DISTANCE,
    DEFAULT_MAX_ACCELERATION, G_FORCE_CONVERSION,
};
pub use cleaning::{clean_series, detect_vehicles, reject_outliers, CleaningConfig};
pub use engines::{aggregate_engines, EngineCatalog};
pub use export::{read_samples_json, save_csv, write_csv, write_samples_json};
pub use fuel::{normalize_fuel_columns, reconcile_fuel};
pub use table::{Column, TelemetryTable, FRAME_NUMBER_COLUMN, REAL_TIME_COLUMN};

use thiserror::Error;

/// Errors from reading or writing a telemetry series
#[derive(Debug, Error)]
pub enum SeriesError {
    /// Filesystem or stream access failed
    #[error("series I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The series JSON is malformed or does not match the record shape
    #[error("malformed series: {0}")]
    Json(#[from] serde_json::Error),

    /// An entry does not carry the universal per-frame record keys
    #[error("series entry {entry} has no \"{key}\" field")]
    Shape {
        /// Index of the first offending entry
        entry: usize,
        /// The universal key that is missing
        key: &'static str,
    },
}
