//! Demo Mode - Simulated launch data generator for testing
//!
//! Generates a plausible two-stage ascent without a real video or decoder
//! backend. The frame source hands out blank frames while the decoders
//! answer from a shared flight profile: countdown clock, speed and altitude
//! curves, staged engine ignition and draining propellant gauges, with a
//! little OCR-style noise mixed in.

use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::extract::{
    DecodeError, Decoders, EngineDetector, Frame, FrameSource, FuelDetector, TelemetryOcr,
};
use crate::roi::{Point, Rect, Roi, RoiConfig, RoiGeometry, TimeUnit};
use crate::telemetry::TankMap;
use crate::units::Measurement;

/// Seconds of countdown before lift-off
const COUNTDOWN_S: f64 = 10.0;
/// Mission time the booster engines cut off
const BOOSTER_CUTOFF_S: f64 = 162.0;
/// Mission time the ship engines light (hot staging)
const SHIP_IGNITION_S: f64 = 158.0;
/// Mission time the ship engines cut off
const SHIP_CUTOFF_S: f64 = 470.0;
/// Fixed seed so demo runs are repeatable
const DEMO_SEED: u64 = 0x6c61756e6368;

const FRAME_WIDTH: u32 = 1280;
const FRAME_HEIGHT: u32 = 720;

/// Ascent speed in km/h at mission time `t`
fn profile_speed_kmh(t: f64) -> f64 {
    if t <= 0.0 {
        0.0
    } else {
        9.5 * t + 0.025 * t * t
    }
}

/// Ascent altitude in km at mission time `t`
fn profile_altitude_km(t: f64) -> f64 {
    if t <= 0.0 {
        0.0
    } else {
        0.008 * t + 0.00042 * t * t
    }
}

/// Tank fullness percentages at mission time `t`
fn profile_fuel(vehicle: &str, t: f64) -> f64 {
    let level = match vehicle {
        "superheavy" => 100.0 - 0.55 * t.max(0.0),
        // the ship burns after staging
        _ => 100.0 - 0.24 * (t - 150.0).max(0.0),
    };
    level.clamp(2.0, 100.0)
}

/// Ignition window for an engine group, in mission time
fn group_window(group: &str) -> (f64, f64) {
    match group {
        "central_stack" | "inner_ring" | "outer_ring" => (-3.0, BOOSTER_CUTOFF_S),
        "rearth" | "rvac" => (SHIP_IGNITION_S, SHIP_CUTOFF_S),
        _ => (0.0, f64::INFINITY),
    }
}

/// Mission clock text the way a broadcast overlay renders it
fn clock_text(t: f64) -> String {
    let (sign, total) = if t < 0.0 {
        ('-', (-t).ceil() as u64)
    } else {
        ('+', t.floor() as u64)
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("T{sign}{hours:02}:{minutes:02}:{seconds:02}")
}

fn mission_time(cursor: &AtomicU64, fps: f64) -> f64 {
    cursor.load(Ordering::Relaxed) as f64 / fps - COUNTDOWN_S
}

/// Simulated launch wiring a frame source and decoder set together.
///
/// The source advances a shared frame cursor; the decoders read it to decide
/// what the current frame "shows". Run it against [`DemoFlight::config`]:
///
/// ```no_run
/// use librelaunch_core::demo::DemoFlight;
/// use librelaunch_core::extract::FlightRecorder;
/// use librelaunch_core::roi::RoiManager;
///
/// let demo = DemoFlight::new(30.0, 30.0);
/// let manager = RoiManager::from_config(DemoFlight::config()).unwrap();
/// let mut recorder = FlightRecorder::new(manager, demo.decoders());
/// recorder.record_all(&mut demo.source()).unwrap();
/// ```
pub struct DemoFlight {
    fps: f64,
    total_frames: u64,
    cursor: Arc<AtomicU64>,
}

impl DemoFlight {
    /// Set up a simulated flight covering `duration_s` seconds of video
    pub fn new(fps: f64, duration_s: f64) -> Self {
        DemoFlight {
            fps,
            total_frames: (duration_s * fps).round() as u64,
            cursor: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The frame source for this flight
    pub fn source(&self) -> DemoSource {
        DemoSource {
            fps: self.fps,
            total_frames: self.total_frames,
            next: 0,
            cursor: Arc::clone(&self.cursor),
        }
    }

    /// A decoder set answering from this flight's profile
    pub fn decoders(&self) -> Decoders {
        Decoders::new(
            Box::new(DemoOcr {
                fps: self.fps,
                cursor: Arc::clone(&self.cursor),
                noise: Mutex::new(StdRng::seed_from_u64(DEMO_SEED)),
            }),
            Box::new(DemoEngines {
                fps: self.fps,
                cursor: Arc::clone(&self.cursor),
            }),
            Box::new(DemoFuel {
                fps: self.fps,
                cursor: Arc::clone(&self.cursor),
            }),
        )
    }

    /// The region layout the demo decoders answer for
    pub fn config() -> RoiConfig {
        let rect_roi = |id: &str, vehicle: Option<&str>, rect: Rect, unit: &str| Roi {
            id: id.to_string(),
            vehicle: vehicle.map(str::to_string),
            label: String::new(),
            geometry: RoiGeometry::Rectangle(rect),
            start_time: None,
            end_time: None,
            measurement_unit: unit.to_string(),
        };
        let row = |count: u32, x0: u32, y: u32, step: u32| -> Vec<Point> {
            (0..count).map(|i| (x0 + i * step, y)).collect()
        };

        let mut booster_groups = BTreeMap::new();
        booster_groups.insert("central_stack".to_string(), row(3, 336, 684, 10));
        booster_groups.insert("inner_ring".to_string(), row(10, 300, 696, 8));
        booster_groups.insert("outer_ring".to_string(), row(20, 280, 708, 7));

        let mut ship_groups = BTreeMap::new();
        ship_groups.insert("rearth".to_string(), row(3, 950, 684, 10));
        ship_groups.insert("rvac".to_string(), row(3, 990, 696, 10));

        let mut booster_engines = rect_roi("engines", Some("superheavy"), Rect::default(), "");
        booster_engines.geometry = RoiGeometry::PointGroups(booster_groups);
        let mut ship_engines = rect_roi("engines", Some("starship"), Rect::default(), "");
        ship_engines.geometry = RoiGeometry::PointGroups(ship_groups);

        // booster overlay regions disappear shortly after staging
        let mut booster_speed = rect_roi(
            "speed",
            Some("superheavy"),
            Rect::new(160, 600, 120, 36),
            "km/h",
        );
        booster_speed.end_time = Some(COUNTDOWN_S + BOOSTER_CUTOFF_S + 20.0);
        let mut booster_altitude = rect_roi(
            "altitude",
            Some("superheavy"),
            Rect::new(160, 640, 120, 36),
            "km",
        );
        booster_altitude.end_time = booster_speed.end_time;

        RoiConfig {
            vehicles: vec!["starship".to_string(), "superheavy".to_string()],
            time_unit: TimeUnit::Seconds,
            rois: vec![
                rect_roi("time", None, Rect::new(540, 640, 200, 40), ""),
                rect_roi("speed", Some("starship"), Rect::new(1000, 600, 120, 36), "km/h"),
                rect_roi(
                    "altitude",
                    Some("starship"),
                    Rect::new(1000, 640, 120, 36),
                    "km",
                ),
                booster_speed,
                booster_altitude,
                booster_engines,
                ship_engines,
                rect_roi("fuel", Some("starship"), Rect::new(900, 680, 360, 30), ""),
            ],
            ..RoiConfig::default()
        }
    }
}

/// Frame source yielding blank frames and advancing the shared cursor
pub struct DemoSource {
    fps: f64,
    total_frames: u64,
    next: u64,
    cursor: Arc<AtomicU64>,
}

impl FrameSource for DemoSource {
    fn fps(&self) -> f64 {
        self.fps
    }

    fn next_frame(&mut self) -> io::Result<Option<(u64, Frame)>> {
        if self.next >= self.total_frames {
            return Ok(None);
        }
        let idx = self.next;
        self.cursor.store(idx, Ordering::Relaxed);
        self.next += 1;
        Ok(Some((idx, Frame::new(FRAME_WIDTH, FRAME_HEIGHT))))
    }
}

/// Overlay reader answering from the flight profile with OCR-style noise
struct DemoOcr {
    fps: f64,
    cursor: Arc<AtomicU64>,
    noise: Mutex<StdRng>,
}

impl TelemetryOcr for DemoOcr {
    fn decode_value(
        &self,
        _region: &Frame,
        measurement: Measurement,
    ) -> Result<Option<f64>, DecodeError> {
        let t = mission_time(&self.cursor, self.fps);
        let mut rng = self
            .noise
            .lock()
            .map_err(|_| DecodeError::Backend("demo noise generator poisoned".to_string()))?;

        // the overlay is unreadable now and then
        if rng.gen_ratio(1, 40) {
            return Ok(None);
        }

        let value = match measurement {
            Measurement::Speed => (profile_speed_kmh(t) + 2.0 * (t * 1.7).sin()).round(),
            Measurement::Altitude => {
                let exact = profile_altitude_km(t) + 0.05 * (t * 1.3).sin();
                (exact * 10.0).round() / 10.0
            }
        };
        // a rare digit misread, far enough off to be rejected downstream
        let value = if rng.gen_ratio(1, 150) {
            value * 2.5 + 120.0
        } else {
            value
        };
        Ok(Some(value.max(0.0)))
    }

    fn decode_clock_text(&self, _region: &Frame) -> Result<Option<String>, DecodeError> {
        let t = mission_time(&self.cursor, self.fps);
        Ok(Some(clock_text(t)))
    }
}

/// Engine classifier lighting groups on the staging schedule
struct DemoEngines {
    fps: f64,
    cursor: Arc<AtomicU64>,
}

impl EngineDetector for DemoEngines {
    fn detect(
        &self,
        point_groups: &BTreeMap<String, Vec<Point>>,
        _frame: &Frame,
    ) -> Result<BTreeMap<String, Vec<bool>>, DecodeError> {
        let t = mission_time(&self.cursor, self.fps);
        let flags = point_groups
            .iter()
            .map(|(group, points)| {
                let (start, end) = group_window(group);
                let flags = points
                    .iter()
                    .enumerate()
                    // engines light and shut down a beat apart
                    .map(|(i, _)| {
                        t >= start + 0.12 * i as f64 && t < end - 0.1 * i as f64
                    })
                    .collect();
                (group.clone(), flags)
            })
            .collect();
        Ok(flags)
    }
}

/// Gauge reader draining both vehicles' tanks on the profile
struct DemoFuel {
    fps: f64,
    cursor: Arc<AtomicU64>,
}

impl FuelDetector for DemoFuel {
    fn detect(&self, _frame: &Frame) -> Result<BTreeMap<String, TankMap>, DecodeError> {
        let t = mission_time(&self.cursor, self.fps);
        let readings = ["starship", "superheavy"]
            .into_iter()
            .map(|vehicle| {
                let level = profile_fuel(vehicle, t);
                let tanks: TankMap = [("lox", level), ("ch4", (level - 1.5).max(0.0))]
                    .into_iter()
                    .map(|(tank, fullness)| {
                        (
                            tank.to_string(),
                            crate::telemetry::TankLevel { fullness },
                        )
                    })
                    .collect();
                (vehicle.to_string(), tanks)
            })
            .collect();
        Ok(readings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_text_counts_down_then_up() {
        assert_eq!(clock_text(-9.97), "T-00:00:10");
        assert_eq!(clock_text(-0.03), "T-00:00:01");
        assert_eq!(clock_text(0.0), "T+00:00:00");
        assert_eq!(clock_text(83.2), "T+00:01:23");
        assert_eq!(clock_text(3671.0), "T+01:01:11");
    }

    #[test]
    fn test_profile_holds_before_liftoff() {
        assert_eq!(profile_speed_kmh(-5.0), 0.0);
        assert_eq!(profile_altitude_km(-5.0), 0.0);
        assert_eq!(profile_fuel("superheavy", -5.0), 100.0);
    }

    #[test]
    fn test_profile_climbs_after_liftoff() {
        assert!(profile_speed_kmh(60.0) > profile_speed_kmh(30.0));
        assert!(profile_altitude_km(60.0) > profile_altitude_km(30.0));
        assert!(profile_fuel("superheavy", 60.0) < 100.0);
        // the ship does not burn until staging
        assert_eq!(profile_fuel("starship", 60.0), 100.0);
    }

    #[test]
    fn test_engine_windows_follow_staging() {
        assert_eq!(group_window("inner_ring").1, BOOSTER_CUTOFF_S);
        assert_eq!(group_window("rvac").0, SHIP_IGNITION_S);
    }

    #[test]
    fn test_source_stops_at_duration() {
        let demo = DemoFlight::new(30.0, 1.0);
        let mut source = demo.source();

        let mut frames = 0;
        while let Some((idx, _)) = source.next_frame().unwrap() {
            assert_eq!(idx, frames);
            frames += 1;
        }
        assert_eq!(frames, 30);
    }

    #[test]
    fn test_demo_config_is_valid() {
        let config = DemoFlight::config();
        let manager = crate::roi::RoiManager::from_config(config).unwrap();
        assert_eq!(
            manager.vehicles(),
            vec!["starship".to_string(), "superheavy".to_string()]
        );
    }

    #[test]
    fn test_engines_light_staggered() {
        let demo = DemoFlight::new(30.0, 600.0);
        let decoders = demo.decoders();
        let frame = Frame::new(FRAME_WIDTH, FRAME_HEIGHT);
        let mut groups = BTreeMap::new();
        groups.insert("inner_ring".to_string(), vec![(0, 0); 10]);

        // t = -10: nothing lit yet
        demo.cursor.store(0, Ordering::Relaxed);
        let flags = decoders.engines.detect(&groups, &frame).unwrap();
        assert!(flags["inner_ring"].iter().all(|&lit| !lit));

        // t = 0: the whole ring is burning
        demo.cursor.store(300, Ordering::Relaxed);
        let flags = decoders.engines.detect(&groups, &frame).unwrap();
        assert_eq!(flags["inner_ring"].len(), 10);
        assert!(flags["inner_ring"].iter().all(|&lit| lit));
    }
}
