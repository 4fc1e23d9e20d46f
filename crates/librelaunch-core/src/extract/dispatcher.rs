//! Per-frame extraction dispatcher
//!
//! One [`FrameExtractor::extract`] call reads everything a single frame has
//! to offer: active regions are resolved through the
//! [`RoiManager`](crate::roi::RoiManager), rectangle regions are cropped and
//! decoded, point-group regions go to the engine detector with the full
//! frame. A decoder failure on one region is logged and costs only that
//! region's value; the rest of the frame still extracts.

use std::collections::HashMap;

use regex::Regex;
use thiserror::Error;

use super::decoders::Decoders;
use super::frame::{slice_region, Frame};
use crate::roi::{Roi, RoiGeometry, RoiManager};
use crate::telemetry::{default_tank_map, FrameTelemetry, MissionClock, DEFAULT_CLOCK_PATTERN};
use crate::units::{convert_measurement, Measurement, UnitError};

/// Errors that abort extraction of a frame.
///
/// Decoder failures never land here; they are caught per region. What does
/// abort a frame is a misconfiguration that would corrupt every frame the
/// same way, like a measurement unit the converter does not know.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A decoded reading declared a unit the converter does not recognize
    #[error(transparent)]
    Unit(#[from] UnitError),

    /// The frame source failed mid-flight
    #[error("frame source error: {0}")]
    Io(#[from] std::io::Error),
}

/// Routes active regions of a frame to the matching decoders
pub struct FrameExtractor {
    decoders: Decoders,
    // compiled clock patterns, keyed by their source string
    clock_patterns: HashMap<String, Regex>,
}

impl FrameExtractor {
    /// Build an extractor around a decoder set
    pub fn new(decoders: Decoders) -> Self {
        FrameExtractor {
            decoders,
            clock_patterns: HashMap::new(),
        }
    }

    /// Extract telemetry from a single frame.
    ///
    /// Every vehicle the configuration declares appears in the result even
    /// when none of its regions were active. `zero_time_latched` is owned by
    /// the caller and short-circuits clock OCR once lift-off has been seen;
    /// from then on the clock reads a latched T+0.
    pub fn extract(
        &mut self,
        frame: &Frame,
        frame_idx: u64,
        fps: f64,
        manager: &RoiManager,
        zero_time_latched: bool,
    ) -> Result<FrameTelemetry, ExtractError> {
        let mut record = FrameTelemetry::for_vehicles(manager.vehicles());
        // shared gauge cluster, read at most once per frame
        let mut fuel_extracted = false;

        for roi in manager.active_rois(frame_idx, fps) {
            let region = match &roi.geometry {
                RoiGeometry::Rectangle(rect) => match slice_region(frame, rect) {
                    Some(region) => Some(region),
                    // clamped to nothing, the region is off-frame
                    None => continue,
                },
                RoiGeometry::PointGroups(_) => None,
            };

            if roi.id == "time" {
                if let Some(region) = &region {
                    record.time = self.read_clock(region, roi, frame_idx, zero_time_latched);
                }
                continue;
            }

            let Some(vehicle) = roi.vehicle.as_deref() else {
                continue;
            };

            match roi.id.as_str() {
                "speed" => {
                    let Some(region) = &region else { continue };
                    let value =
                        self.read_measurement(region, Measurement::Speed, roi, frame_idx)?;
                    if let Some(telemetry) = record.vehicles.get_mut(vehicle) {
                        telemetry.speed = value;
                    }
                }
                "altitude" => {
                    let Some(region) = &region else { continue };
                    let value =
                        self.read_measurement(region, Measurement::Altitude, roi, frame_idx)?;
                    if let Some(telemetry) = record.vehicles.get_mut(vehicle) {
                        telemetry.altitude = value;
                    }
                }
                "engines" => {
                    let Some(groups) = roi.point_groups() else {
                        continue;
                    };
                    match self.decoders.engines.detect(groups, frame) {
                        Ok(flags) => {
                            if let Some(telemetry) = record.vehicles.get_mut(vehicle) {
                                telemetry.engines = flags;
                            }
                        }
                        Err(e) => tracing::warn!(
                            "engine detection failed for {vehicle} at frame {frame_idx}: {e}"
                        ),
                    }
                }
                "fuel" => {
                    if fuel_extracted {
                        continue;
                    }
                    match self.decoders.fuel.detect(frame) {
                        Ok(readings) => {
                            for (name, telemetry) in record.vehicles.iter_mut() {
                                telemetry.fuel = readings
                                    .get(name)
                                    .cloned()
                                    .unwrap_or_else(default_tank_map);
                            }
                            fuel_extracted = true;
                        }
                        Err(e) => {
                            tracing::warn!("fuel extraction failed at frame {frame_idx}: {e}")
                        }
                    }
                }
                // unknown region roles are ignored
                _ => {}
            }
        }

        Ok(record)
    }

    /// Read the mission clock from a cropped region
    fn read_clock(
        &mut self,
        region: &Frame,
        roi: &Roi,
        frame_idx: u64,
        zero_time_latched: bool,
    ) -> Option<MissionClock> {
        if zero_time_latched {
            return Some(MissionClock::zero());
        }

        let pattern = self.clock_pattern(&roi.measurement_unit)?;
        match self.decoders.ocr.decode_clock_text(region) {
            Ok(Some(text)) => MissionClock::from_display(&text, &pattern),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("time decode failed at frame {frame_idx}: {e}");
                None
            }
        }
    }

    /// Read one numeric overlay value and convert it to canonical units
    fn read_measurement(
        &self,
        region: &Frame,
        measurement: Measurement,
        roi: &Roi,
        frame_idx: u64,
    ) -> Result<Option<f64>, UnitError> {
        let value = match self.decoders.ocr.decode_value(region, measurement) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("{} decode failed at frame {frame_idx}: {e}", roi.id);
                return Ok(None);
            }
        };

        match value {
            Some(value) if roi.measurement_unit != measurement.canonical_unit() => {
                Ok(Some(convert_measurement(
                    value,
                    measurement,
                    &roi.measurement_unit,
                )?))
            }
            other => Ok(other),
        }
    }

    /// Compile (and cache) the clock pattern for a time region.
    ///
    /// An empty pattern falls back to [`DEFAULT_CLOCK_PATTERN`]; a pattern
    /// that does not compile is treated like a decoder failure for the
    /// region, so one bad config field cannot take the whole flight down.
    fn clock_pattern(&mut self, source: &str) -> Option<Regex> {
        let source = if source.is_empty() {
            DEFAULT_CLOCK_PATTERN
        } else {
            source
        };
        if let Some(pattern) = self.clock_patterns.get(source) {
            return Some(pattern.clone());
        }
        match Regex::new(source) {
            Ok(pattern) => {
                self.clock_patterns
                    .insert(source.to_string(), pattern.clone());
                Some(pattern)
            }
            Err(e) => {
                tracing::warn!("invalid clock pattern '{source}': {e}");
                None
            }
        }
    }
}
