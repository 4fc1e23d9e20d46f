//! Measurement Unit Conversion
//!
//! Converts webcast overlay units to the canonical analysis units:
//! - Speed: mph → km/h
//! - Altitude: mi / ft → km
//!
//! Broadcast overlays switch units between providers (and sometimes between
//! flights of the same provider), so every ROI declares the unit it is read
//! in and the extraction dispatcher converts to canonical units on the way
//! into the time series.

use thiserror::Error;

/// Kilometres per statute mile.
const KM_PER_MILE: f64 = 1.60934;

/// Kilometres per foot.
const KM_PER_FOOT: f64 = 0.0003048;

/// Errors for unit strings the converter does not recognize
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    /// The speed unit is not one of `km/h`, `mph`
    #[error("unsupported speed unit: {0}")]
    UnsupportedSpeedUnit(String),

    /// The altitude unit is not one of `km`, `mi`, `ft`
    #[error("unsupported altitude unit: {0}")]
    UnsupportedAltitudeUnit(String),
}

/// Measurement families the converter understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measurement {
    /// Vehicle speed, canonical unit km/h
    Speed,
    /// Vehicle altitude, canonical unit km
    Altitude,
}

impl Measurement {
    /// The canonical unit readings are converted into
    pub fn canonical_unit(&self) -> &'static str {
        match self {
            Measurement::Speed => "km/h",
            Measurement::Altitude => "km",
        }
    }
}

/// Convert a speed reading to km/h
pub fn convert_speed(value: f64, from_unit: &str) -> Result<f64, UnitError> {
    match from_unit {
        "km/h" => Ok(value),
        "mph" => Ok(value * KM_PER_MILE),
        other => Err(UnitError::UnsupportedSpeedUnit(other.to_string())),
    }
}

/// Convert an altitude reading to km
pub fn convert_altitude(value: f64, from_unit: &str) -> Result<f64, UnitError> {
    match from_unit {
        "km" => Ok(value),
        "mi" => Ok(value * KM_PER_MILE),
        "ft" => Ok(value * KM_PER_FOOT),
        other => Err(UnitError::UnsupportedAltitudeUnit(other.to_string())),
    }
}

/// Convert a reading to its canonical unit based on measurement family
pub fn convert_measurement(
    value: f64,
    measurement: Measurement,
    from_unit: &str,
) -> Result<f64, UnitError> {
    match measurement {
        Measurement::Speed => convert_speed(value, from_unit),
        Measurement::Altitude => convert_altitude(value, from_unit),
    }
}
