//! Active-ROI resolution
//!
//! Wraps a validated configuration and answers the one question extraction
//! asks every frame: which regions are live at frame N. Activation bounds
//! are inclusive on both ends; in `seconds` mode each bound is converted to
//! a frame index with `round(bound * fps)` before comparison, since the
//! frame rate belongs to the video rather than the configuration.

use std::collections::BTreeSet;
use std::path::Path;

use super::{ConfigError, Roi, RoiConfig, TimeUnit};

/// Query interface over a loaded ROI configuration
#[derive(Debug, Clone)]
pub struct RoiManager {
    config: RoiConfig,
}

impl RoiManager {
    /// Wrap an already-parsed configuration, validating it first
    pub fn from_config(config: RoiConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(RoiManager { config })
    }

    /// Load and validate a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Ok(RoiManager {
            config: RoiConfig::load(path)?,
        })
    }

    /// The wrapped configuration
    pub fn config(&self) -> &RoiConfig {
        &self.config
    }

    /// Declared vehicle names, de-duplicated with declaration order kept
    pub fn vehicles(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.config
            .vehicles
            .iter()
            .filter(|vehicle| seen.insert(vehicle.as_str()))
            .cloned()
            .collect()
    }

    /// Regions whose activation window contains `frame_idx`, in
    /// configuration order
    pub fn active_rois(&self, frame_idx: u64, fps: f64) -> Vec<&Roi> {
        self.config
            .rois
            .iter()
            .filter(|roi| self.is_active(roi, frame_idx, fps))
            .collect()
    }

    fn is_active(&self, roi: &Roi, frame_idx: u64, fps: f64) -> bool {
        let (start, end) = match self.config.time_unit {
            TimeUnit::Frames => (roi.start_time, roi.end_time),
            TimeUnit::Seconds => (
                roi.start_time.map(|bound| (bound * fps).round()),
                roi.end_time.map(|bound| (bound * fps).round()),
            ),
        };
        let idx = frame_idx as f64;
        start.map_or(true, |start| idx >= start) && end.map_or(true, |end| idx <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roi::{Rect, RoiGeometry};

    fn windowed_roi(id: &str, start: Option<f64>, end: Option<f64>) -> Roi {
        Roi {
            id: id.to_string(),
            vehicle: Some("starship".to_string()),
            label: String::new(),
            geometry: RoiGeometry::Rectangle(Rect::new(0, 0, 10, 10)),
            start_time: start,
            end_time: end,
            measurement_unit: String::new(),
        }
    }

    fn manager(time_unit: TimeUnit, rois: Vec<Roi>) -> RoiManager {
        RoiManager::from_config(RoiConfig {
            time_unit,
            vehicles: vec!["starship".to_string()],
            rois,
            ..RoiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_unbounded_roi_always_active() {
        let mgr = manager(TimeUnit::Frames, vec![windowed_roi("speed", None, None)]);
        for frame_idx in [0, 1, 17, 100_000] {
            assert_eq!(mgr.active_rois(frame_idx, 30.0).len(), 1);
        }
    }

    #[test]
    fn test_frame_bounds_inclusive() {
        let mgr = manager(
            TimeUnit::Frames,
            vec![windowed_roi("speed", Some(10.0), Some(20.0))],
        );
        assert!(mgr.active_rois(9, 30.0).is_empty());
        assert_eq!(mgr.active_rois(10, 30.0).len(), 1);
        assert_eq!(mgr.active_rois(20, 30.0).len(), 1);
        assert!(mgr.active_rois(21, 30.0).is_empty());
    }

    #[test]
    fn test_second_bounds_converted_with_fps() {
        let mgr = manager(
            TimeUnit::Seconds,
            vec![windowed_roi("speed", Some(1.0), Some(2.0))],
        );
        // 1.0s..2.0s at 10 fps is frames 10..=20
        assert!(mgr.active_rois(9, 10.0).is_empty());
        assert_eq!(mgr.active_rois(10, 10.0).len(), 1);
        assert_eq!(mgr.active_rois(15, 10.0).len(), 1);
        assert_eq!(mgr.active_rois(20, 10.0).len(), 1);
        assert!(mgr.active_rois(21, 10.0).is_empty());
    }

    #[test]
    fn test_half_open_windows() {
        let mgr = manager(
            TimeUnit::Frames,
            vec![
                windowed_roi("early", None, Some(100.0)),
                windowed_roi("late", Some(100.0), None),
            ],
        );
        let at_zero: Vec<_> = mgr.active_rois(0, 30.0).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(at_zero, vec!["early"]);

        let at_boundary: Vec<_> = mgr.active_rois(100, 30.0).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(at_boundary, vec!["early", "late"]);

        let after: Vec<_> = mgr.active_rois(500, 30.0).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(after, vec!["late"]);
    }

    #[test]
    fn test_configuration_order_preserved() {
        let mgr = manager(
            TimeUnit::Frames,
            vec![
                windowed_roi("altitude", None, None),
                windowed_roi("speed", None, None),
                windowed_roi("engines", None, None),
            ],
        );
        let ids: Vec<_> = mgr.active_rois(0, 30.0).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["altitude", "speed", "engines"]);
    }

    #[test]
    fn test_vehicles_deduplicated_in_order() {
        let mgr = RoiManager::from_config(RoiConfig {
            vehicles: vec![
                "superheavy".to_string(),
                "starship".to_string(),
                "superheavy".to_string(),
            ],
            ..RoiConfig::default()
        })
        .unwrap();
        assert_eq!(
            mgr.vehicles(),
            vec!["superheavy".to_string(), "starship".to_string()]
        );
    }

    #[test]
    fn test_from_config_validates() {
        let config = RoiConfig {
            vehicles: vec![],
            rois: vec![windowed_roi("speed", None, None)],
            ..RoiConfig::default()
        };
        assert!(RoiManager::from_config(config).is_err());
    }
}
