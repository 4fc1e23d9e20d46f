//! Region Of Interest Model
//!
//! Declarative description of where on the broadcast frame each telemetry
//! value lives. A region is either a pixel rectangle (overlay text that gets
//! cropped and decoded) or a set of named point-groups (engine flame
//! positions sampled from the full frame). Regions carry an activation
//! window so overlays that appear mid-flight are only read while visible.

mod config;
mod manager;

pub use config::{ConfigError, RoiConfig, TimeUnit, VideoSource};
pub use manager::RoiManager;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A pixel coordinate as stored in the configuration, `(x, y)`
pub type Point = (u32, u32);

/// An axis-aligned rectangle in source-frame pixel coordinates.
///
/// The origin may sit outside the frame (regions drawn against a different
/// resolution, or dragged past an edge); [`Rect::clamp`] intersects with the
/// actual frame before any cropping happens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in pixels
    pub w: u32,
    /// Height in pixels
    pub h: u32,
}

impl Rect {
    /// Create a rectangle
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Rect { x, y, w, h }
    }

    /// Intersect with a frame of the given dimensions.
    ///
    /// Returns `None` when the visible part of the rectangle is empty.
    pub fn clamp(&self, frame_w: u32, frame_h: u32) -> Option<Rect> {
        let x0 = i64::from(self.x).max(0);
        let y0 = i64::from(self.y).max(0);
        let x1 = (i64::from(self.x) + i64::from(self.w)).min(i64::from(frame_w));
        let y1 = (i64::from(self.y) + i64::from(self.h)).min(i64::from(frame_h));
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some(Rect {
            x: x0 as i32,
            y: y0 as i32,
            w: (x1 - x0) as u32,
            h: (y1 - y0) as u32,
        })
    }
}

/// Geometry of a region, exactly one of the two modes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoiGeometry {
    /// A rectangle to crop and hand to a text decoder
    Rectangle(Rect),
    /// Named point-groups, one point per expected engine position
    PointGroups(BTreeMap<String, Vec<Point>>),
}

/// One configured measurement region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRoi", into = "RawRoi")]
pub struct Roi {
    /// Semantic role: `time`, `speed`, `altitude`, `engines`, `fuel` or a
    /// custom id ignored by the dispatcher
    pub id: String,
    /// Owning vehicle, `None` for shared regions such as the mission clock
    pub vehicle: Option<String>,
    /// Display name for configuration tooling
    pub label: String,
    /// Where on the frame the region sits
    pub geometry: RoiGeometry,
    /// Inclusive lower activation bound in the config's time unit,
    /// `None` meaning active from the start
    pub start_time: Option<f64>,
    /// Inclusive upper activation bound, `None` meaning active indefinitely
    pub end_time: Option<f64>,
    /// Source unit the overlay displays (`mph`, `km`, ...); for the time
    /// region this field holds the clock regex pattern instead
    pub measurement_unit: String,
}

impl Roi {
    /// True when the region is a rectangle rather than point-groups
    pub fn is_rectangle(&self) -> bool {
        matches!(self.geometry, RoiGeometry::Rectangle(_))
    }

    /// The rectangle for rectangle regions, `None` for point-group regions
    pub fn rect(&self) -> Option<Rect> {
        match &self.geometry {
            RoiGeometry::Rectangle(rect) => Some(*rect),
            RoiGeometry::PointGroups(_) => None,
        }
    }

    /// The point-groups for engine regions, `None` for rectangles
    pub fn point_groups(&self) -> Option<&BTreeMap<String, Vec<Point>>> {
        match &self.geometry {
            RoiGeometry::Rectangle(_) => None,
            RoiGeometry::PointGroups(groups) => Some(groups),
        }
    }
}

/// Wire form of a region as persisted by the configuration tooling.
///
/// The file always carries the rectangle fields; a non-empty `points` map
/// switches the region into point-group mode and the rectangle fields are
/// ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawRoi {
    #[serde(default)]
    id: String,
    #[serde(default)]
    vehicle: Option<String>,
    #[serde(default)]
    label: String,
    #[serde(default)]
    x: i32,
    #[serde(default)]
    y: i32,
    #[serde(default)]
    w: u32,
    #[serde(default)]
    h: u32,
    #[serde(default)]
    start_time: Option<f64>,
    #[serde(default)]
    end_time: Option<f64>,
    #[serde(default)]
    measurement_unit: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    points: BTreeMap<String, Vec<Point>>,
}

impl From<RawRoi> for Roi {
    fn from(raw: RawRoi) -> Self {
        let geometry = if raw.points.is_empty() {
            RoiGeometry::Rectangle(Rect::new(raw.x, raw.y, raw.w, raw.h))
        } else {
            RoiGeometry::PointGroups(raw.points)
        };
        Roi {
            id: raw.id,
            vehicle: raw.vehicle,
            label: raw.label,
            geometry,
            start_time: raw.start_time,
            end_time: raw.end_time,
            measurement_unit: raw.measurement_unit,
        }
    }
}

impl From<Roi> for RawRoi {
    fn from(roi: Roi) -> Self {
        let (rect, points) = match roi.geometry {
            RoiGeometry::Rectangle(rect) => (rect, BTreeMap::new()),
            RoiGeometry::PointGroups(points) => (Rect::default(), points),
        };
        RawRoi {
            id: roi.id,
            vehicle: roi.vehicle,
            label: roi.label,
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
            start_time: roi.start_time,
            end_time: roi.end_time,
            measurement_unit: roi.measurement_unit,
            points,
        }
    }
}
