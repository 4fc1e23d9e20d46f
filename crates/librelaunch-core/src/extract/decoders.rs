//! Decoder seams
//!
//! The pixel-classification work (character recognition, flame detection,
//! gauge reading) lives outside this crate. Extraction talks to it through
//! these traits so real backends and test doubles plug in interchangeably.
//!
//! A decoder distinguishes "nothing readable here" (`Ok(None)` or an empty
//! map, a normal per-frame occurrence) from an actual failure (`Err`), which
//! the dispatcher logs and treats as no value for that region only.

use std::collections::BTreeMap;

use thiserror::Error;

use super::frame::Frame;
use crate::roi::Point;
use crate::telemetry::TankMap;
use crate::units::Measurement;

/// Failure inside an external decoder backend
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The backend reported an error of its own
    #[error("decoder backend error: {0}")]
    Backend(String),

    /// The backend failed on I/O (model files, sidecar processes)
    #[error("decoder I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Abstraction for reading overlay text out of cropped regions
pub trait TelemetryOcr: Send + Sync {
    /// Read a numeric value from a cropped region.
    ///
    /// `Ok(None)` means the region held no readable number this frame.
    fn decode_value(
        &self,
        region: &Frame,
        measurement: Measurement,
    ) -> Result<Option<f64>, DecodeError>;

    /// Read the raw mission-clock text from a cropped region.
    ///
    /// The dispatcher parses the returned text against the region's clock
    /// pattern; implementations only need to recover the characters.
    fn decode_clock_text(&self, region: &Frame) -> Result<Option<String>, DecodeError>;
}

/// Abstraction for classifying engine ignition at configured positions
pub trait EngineDetector: Send + Sync {
    /// One boolean per declared point in each group, true meaning that
    /// engine position shows ignition. Receives the full frame because
    /// flame classification needs surrounding context, not just the point.
    fn detect(
        &self,
        point_groups: &BTreeMap<String, Vec<Point>>,
        frame: &Frame,
    ) -> Result<BTreeMap<String, Vec<bool>>, DecodeError>;
}

/// Abstraction for reading the shared propellant gauge cluster
pub trait FuelDetector: Send + Sync {
    /// Tank fullness per vehicle, read off the full frame. Vehicles the
    /// detector cannot see are simply absent from the map.
    fn detect(&self, frame: &Frame) -> Result<BTreeMap<String, TankMap>, DecodeError>;
}

/// The full decoder set the dispatcher runs against
pub struct Decoders {
    /// Overlay text reader for clock, speed and altitude regions
    pub ocr: Box<dyn TelemetryOcr>,
    /// Engine ignition classifier for point-group regions
    pub engines: Box<dyn EngineDetector>,
    /// Propellant gauge reader, invoked at most once per frame
    pub fuel: Box<dyn FuelDetector>,
}

impl Decoders {
    /// Bundle a decoder set
    pub fn new(
        ocr: Box<dyn TelemetryOcr>,
        engines: Box<dyn EngineDetector>,
        fuel: Box<dyn FuelDetector>,
    ) -> Self {
        Decoders { ocr, engines, fuel }
    }
}
