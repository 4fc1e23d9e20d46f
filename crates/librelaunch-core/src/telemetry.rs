//! Telemetry Record Types
//!
//! The per-frame record produced by extraction and consumed by the series
//! cleaning stage. A frame holds the broadcast mission clock (if one was
//! read) plus one [`VehicleTelemetry`] entry per configured vehicle.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Pattern a broadcast mission clock is matched with when the time ROI does
/// not declare its own, e.g. "T+00:01:23"
pub const DEFAULT_CLOCK_PATTERN: &str = r"[+-]\d{2}:\d{2}:\d{2}";

/// Tank names every vehicle starts out with
pub const DEFAULT_TANKS: [&str; 2] = ["lox", "ch4"];

/// Sign of the mission clock relative to lift-off
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sign {
    /// At or after lift-off (T+)
    #[default]
    #[serde(rename = "+")]
    Plus,
    /// Before lift-off (T-)
    #[serde(rename = "-")]
    Minus,
}

impl Sign {
    /// +1.0 or -1.0, for folding the sign into numeric columns
    pub fn signum(&self) -> f64 {
        match self {
            Sign::Plus => 1.0,
            Sign::Minus => -1.0,
        }
    }
}

/// A broadcast mission clock reading, e.g. T-00:00:10
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionClock {
    /// Whether the clock is counting down (T-) or up (T+)
    pub sign: Sign,
    /// Hours component of the display
    pub hours: u32,
    /// Minutes component of the display
    pub minutes: u32,
    /// Seconds component of the display
    pub seconds: u32,
}

impl MissionClock {
    /// The T+0 clock, returned for every frame once lift-off has been seen
    pub fn zero() -> Self {
        MissionClock {
            sign: Sign::Plus,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }

    /// True when all components read zero, regardless of sign
    pub fn is_zero(&self) -> bool {
        self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }

    /// Signed clock value in seconds
    pub fn total_seconds(&self) -> f64 {
        let magnitude = self.hours * 3600 + self.minutes * 60 + self.seconds;
        self.sign.signum() * magnitude as f64
    }

    /// Parse a clock out of decoded overlay text.
    ///
    /// `pattern` locates the clock inside the text; the matched span is then
    /// reduced to its digit runs, which must be exactly hours, minutes and
    /// seconds. A minus anywhere in the match marks a countdown clock.
    /// Returns `None` when the text holds no readable clock.
    pub fn from_display(text: &str, pattern: &Regex) -> Option<MissionClock> {
        let matched = pattern.find(text)?.as_str();
        let sign = if matched.contains('-') {
            Sign::Minus
        } else {
            Sign::Plus
        };
        let components: Vec<u32> = matched
            .split(|c: char| !c.is_ascii_digit())
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect::<Result<_, _>>()
            .ok()?;
        if components.len() != 3 {
            return None;
        }
        Some(MissionClock {
            sign,
            hours: components[0],
            minutes: components[1],
            seconds: components[2],
        })
    }
}

/// Fullness of a single propellant tank
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TankLevel {
    /// Fill fraction as read off the broadcast gauge, 0-100
    pub fullness: f64,
}

impl Default for TankLevel {
    fn default() -> Self {
        TankLevel { fullness: 0.0 }
    }
}

/// Tank fullness keyed by tank name
pub type TankMap = BTreeMap<String, TankLevel>;

/// The tank map every vehicle starts a frame with, all tanks empty
pub fn default_tank_map() -> TankMap {
    DEFAULT_TANKS
        .iter()
        .map(|tank| (tank.to_string(), TankLevel::default()))
        .collect()
}

/// Telemetry read for one vehicle on one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleTelemetry {
    /// Speed in the overlay's unit until converted, then km/h
    pub speed: Option<f64>,
    /// Altitude in the overlay's unit until converted, then km
    pub altitude: Option<f64>,
    /// Tank fullness by tank name
    pub fuel: TankMap,
    /// Per-group engine activity flags, one bool per engine point
    pub engines: BTreeMap<String, Vec<bool>>,
}

impl Default for VehicleTelemetry {
    fn default() -> Self {
        VehicleTelemetry {
            speed: None,
            altitude: None,
            fuel: default_tank_map(),
            engines: BTreeMap::new(),
        }
    }
}

/// Everything read off a single frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameTelemetry {
    /// Mission clock, `None` when the time ROI yielded nothing
    pub time: Option<MissionClock>,
    /// Per-vehicle readings, keyed by vehicle name
    pub vehicles: BTreeMap<String, VehicleTelemetry>,
}

impl FrameTelemetry {
    /// A record with one defaulted entry per named vehicle and no clock
    pub fn for_vehicles<I, S>(vehicles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let vehicles = vehicles
            .into_iter()
            .map(|name| (name.into(), VehicleTelemetry::default()))
            .collect();
        FrameTelemetry {
            time: None,
            vehicles,
        }
    }
}

/// A frame record stamped with its position in the video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSample {
    /// Zero-based index of the frame in the video
    pub frame_number: u64,
    /// Video time of the frame in seconds (frame number over fps)
    pub real_time_seconds: f64,
    /// The telemetry read from the frame
    #[serde(flatten)]
    pub telemetry: FrameTelemetry,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn default_pattern() -> Regex {
        Regex::new(DEFAULT_CLOCK_PATTERN).unwrap()
    }

    #[test]
    fn test_total_seconds_signed() {
        let up = MissionClock {
            sign: Sign::Plus,
            hours: 1,
            minutes: 2,
            seconds: 3,
        };
        assert_eq!(up.total_seconds(), 3723.0);

        let down = MissionClock {
            sign: Sign::Minus,
            ..up
        };
        assert_eq!(down.total_seconds(), -3723.0);
    }

    #[test]
    fn test_zero_detection_ignores_sign() {
        let minus_zero = MissionClock {
            sign: Sign::Minus,
            ..MissionClock::zero()
        };
        assert!(minus_zero.is_zero());
        assert!(!MissionClock {
            seconds: 1,
            ..MissionClock::zero()
        }
        .is_zero());
    }

    #[test]
    fn test_parse_countup_clock() {
        let clock = MissionClock::from_display("T+00:01:23", &default_pattern()).unwrap();
        assert_eq!(
            clock,
            MissionClock {
                sign: Sign::Plus,
                hours: 0,
                minutes: 1,
                seconds: 23,
            }
        );
    }

    #[test]
    fn test_parse_countdown_clock() {
        let clock = MissionClock::from_display("T-00:00:10", &default_pattern()).unwrap();
        assert_eq!(clock.sign, Sign::Minus);
        assert_eq!(clock.total_seconds(), -10.0);
    }

    #[test]
    fn test_parse_clock_embedded_in_noise() {
        let clock = MissionClock::from_display("LIVE  +01:02:03  STARSHIP", &default_pattern());
        assert_eq!(clock.unwrap().hours, 1);
    }

    #[test]
    fn test_parse_unreadable_text() {
        assert_eq!(
            MissionClock::from_display("LOADING...", &default_pattern()),
            None
        );
    }

    #[test]
    fn test_parse_custom_unsigned_pattern() {
        let pattern = Regex::new(r"\d{2}:\d{2}:\d{2}").unwrap();
        let clock = MissionClock::from_display("00:10:30", &pattern).unwrap();
        assert_eq!(clock.sign, Sign::Plus);
        assert_eq!(clock.total_seconds(), 630.0);
    }

    #[test]
    fn test_sign_serializes_as_symbol() {
        let json = serde_json::to_string(&MissionClock::zero()).unwrap();
        assert_eq!(json, r#"{"sign":"+","hours":0,"minutes":0,"seconds":0}"#);
    }

    #[test]
    fn test_default_vehicle_record_has_empty_tanks() {
        let vehicle = VehicleTelemetry::default();
        assert_eq!(vehicle.speed, None);
        assert_eq!(vehicle.altitude, None);
        assert_eq!(vehicle.fuel.len(), 2);
        assert_eq!(vehicle.fuel["lox"].fullness, 0.0);
        assert_eq!(vehicle.fuel["ch4"].fullness, 0.0);
        assert!(vehicle.engines.is_empty());
    }

    #[test]
    fn test_frame_sample_flattens_telemetry() {
        let sample = FrameSample {
            frame_number: 30,
            real_time_seconds: 1.0,
            telemetry: FrameTelemetry::for_vehicles(["starship"]),
        };
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["frame_number"], 30);
        assert_eq!(json["time"], serde_json::Value::Null);
        assert!(json["vehicles"]["starship"].is_object());
    }
}
