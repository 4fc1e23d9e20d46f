//! ROI configuration file handling
//!
//! The configuration is a JSON document authored by the region-editing GUI
//! and consumed read-only by extraction. Saving recomputes the vehicle list
//! from region ownership and bumps the version when overwriting an existing
//! file, so hand-maintained drift cannot creep in.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Roi;

/// Errors from loading, validating or saving an ROI configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem access failed
    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON or does not match the schema
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    /// A region names a vehicle the configuration does not declare
    #[error("ROI '{roi}' references undeclared vehicle '{vehicle}'")]
    UndeclaredVehicle {
        /// Id of the offending region
        roi: String,
        /// The vehicle name it referenced
        vehicle: String,
    },
}

/// How region activation bounds are expressed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Bounds are frame indices, compared directly
    #[default]
    Frames,
    /// Bounds are seconds of video time, converted via the frame rate
    Seconds,
}

/// Where the flight footage came from, informational only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSource {
    /// Hosting platform
    #[serde(rename = "type", default)]
    pub source_type: String,
    /// Source URL
    #[serde(default)]
    pub url: String,
}

impl Default for VideoSource {
    fn default() -> Self {
        VideoSource {
            source_type: "twitter/x".to_string(),
            url: String::new(),
        }
    }
}

/// A whole flight's declared regions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiConfig {
    /// Monotonically increasing revision, bumped on every overwriting save
    #[serde(default = "default_version")]
    pub version: u32,

    /// Where the footage came from
    #[serde(default)]
    pub video_source: VideoSource,

    /// Unit the activation bounds on every region are expressed in
    #[serde(default)]
    pub time_unit: TimeUnit,

    /// Distinct vehicles referenced by the regions, recomputed on save
    #[serde(default = "default_vehicles")]
    pub vehicles: Vec<String>,

    /// The regions, in authoring order
    #[serde(default)]
    pub rois: Vec<Roi>,
}

fn default_version() -> u32 {
    1
}

fn default_vehicles() -> Vec<String> {
    vec!["starship".to_string()]
}

impl Default for RoiConfig {
    fn default() -> Self {
        RoiConfig {
            version: default_version(),
            video_source: VideoSource::default(),
            time_unit: TimeUnit::default(),
            vehicles: default_vehicles(),
            rois: Vec::new(),
        }
    }
}

impl RoiConfig {
    /// Parse a configuration from a JSON string and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RoiConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        tracing::info!("loaded ROI config v{} from {}", config.version, path.display());
        Ok(config)
    }

    /// Check internal consistency: every region's vehicle must be declared
    pub fn validate(&self) -> Result<(), ConfigError> {
        for roi in &self.rois {
            if let Some(vehicle) = &roi.vehicle {
                if !self.vehicles.contains(vehicle) {
                    return Err(ConfigError::UndeclaredVehicle {
                        roi: roi.id.clone(),
                        vehicle: vehicle.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// The sorted set of vehicles actually referenced by the regions
    pub fn used_vehicles(&self) -> Vec<String> {
        let used: BTreeSet<&String> = self.rois.iter().filter_map(|roi| roi.vehicle.as_ref()).collect();
        used.into_iter().cloned().collect()
    }

    /// Save the configuration as pretty-printed JSON.
    ///
    /// The vehicle list is recomputed from region ownership and the version
    /// is bumped when the target file already exists.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        self.vehicles = self.used_vehicles();
        if path.exists() {
            self.version += 1;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        tracing::info!("saved ROI config v{} to {}", self.version, path.display());
        Ok(())
    }
}
