//! # LibreLaunch Core Library
//!
//! Core functionality for the LibreLaunch webcast telemetry toolkit.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Region-of-interest configuration (JSON files shared with the layout tool)
//! - Frame-by-frame telemetry extraction through pluggable decoder backends
//! - Mission clock tracking with lift-off latching
//! - Series cleaning: outlier rejection, engine aggregation, fuel reconciliation
//! - Derived channels (acceleration, g-force) and CSV/JSON export
//!
//! ## Supported webcast layouts
//!
//! - SpaceX Starship (ship + booster overlays)
//! - Blue Origin New Glenn
//! - Any layout describable as rectangles and engine point-groups
//!
//! ## Example
//!
//! ```rust,ignore
//! use librelaunch_core::prelude::*;
//!
//! // Load the region layout for this webcast
//! let manager = RoiManager::load("starship_flight_6.json")?;
//!
//! // Run extraction over the whole video
//! let mut recorder = FlightRecorder::new(manager, decoders);
//! recorder.record_all(&mut frames)?;
//!
//! // Flatten, clean and export
//! let mut table = TelemetryTable::from_samples(recorder.samples());
//! let vehicles = clean_series(&mut table, &CleaningConfig::default());
//! save_csv(&table, "flight.csv")?;
//! ```

pub mod demo;
pub mod extract;
pub mod roi;
pub mod series;
pub mod telemetry;
pub mod units;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::demo::DemoFlight;
    pub use crate::extract::{
        Decoders, EngineDetector, FlightRecorder, FrameExtractor, FrameSource, FuelDetector,
        TelemetryOcr,
    };
    pub use crate::roi::{Rect, Roi, RoiConfig, RoiGeometry, RoiManager, TimeUnit};
    pub use crate::series::{
        add_motion_channels, clean_series, read_samples_json, save_csv, write_samples_json,
        CleaningConfig, EngineCatalog, TelemetryTable,
    };
    pub use crate::telemetry::{
        FrameSample, FrameTelemetry, MissionClock, Sign, TankLevel, VehicleTelemetry,
    };
    pub use crate::units::{convert_measurement, Measurement};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
