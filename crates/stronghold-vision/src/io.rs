//! JSON configuration and report helpers.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use stronghold_core::BoundingRect;

use crate::color::{ColorThresholds, ThresholdError};
use crate::geometry::CameraModel;
use crate::pipeline::TargetEstimate;
use crate::preprocess::PreprocessParams;
use crate::scoring::{ShapeProfile, TargetShape};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Threshold(#[from] ThresholdError),
}

fn default_boulder_diameter() -> f64 {
    10.0
}

/// Everything the vision pipeline can be tuned with.
///
/// Every field has a default, so a config file only needs the overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisionConfig {
    #[serde(default)]
    pub thresholds: ColorThresholds,
    /// Camera field of view and goal dimensions.
    #[serde(default)]
    pub camera: CameraModel,
    /// Boulder diameter in inches, used for boulder range estimates.
    #[serde(default = "default_boulder_diameter")]
    pub boulder_diameter: f64,
    #[serde(default = "ShapeProfile::goal")]
    pub goal: ShapeProfile,
    #[serde(default = "ShapeProfile::boulder")]
    pub boulder: ShapeProfile,
    /// Overrides the goal preset derived from `thresholds`.
    #[serde(default)]
    pub goal_preprocess: Option<PreprocessParams>,
    #[serde(default)]
    pub boulder_preprocess: Option<PreprocessParams>,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            thresholds: ColorThresholds::default(),
            camera: CameraModel::default(),
            boulder_diameter: default_boulder_diameter(),
            goal: ShapeProfile::goal(),
            boulder: ShapeProfile::boulder(),
            goal_preprocess: None,
            boulder_preprocess: None,
        }
    }
}

impl VisionConfig {
    /// Load and validate a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&raw)?;
        cfg.thresholds.validate()?;
        Ok(cfg)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn preprocess_params(&self, shape: TargetShape) -> PreprocessParams {
        match shape {
            TargetShape::Goal => self
                .goal_preprocess
                .unwrap_or_else(|| PreprocessParams::goal(&self.thresholds)),
            TargetShape::Boulder => self
                .boulder_preprocess
                .unwrap_or_else(PreprocessParams::boulder),
        }
    }

    pub fn profile(&self, shape: TargetShape) -> &ShapeProfile {
        match shape {
            TargetShape::Goal => &self.goal,
            TargetShape::Boulder => &self.boulder,
        }
    }

    /// Camera model with the physical size of `shape` plugged in.
    pub fn camera_for(&self, shape: TargetShape) -> CameraModel {
        match shape {
            TargetShape::Goal => self.camera,
            TargetShape::Boulder => CameraModel {
                target_width: self.boulder_diameter,
                target_height: self.boulder_diameter,
                ..self.camera
            },
        }
    }
}

/// Outcome of one detection run, as written by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionReport {
    pub image_path: String,
    pub target: TargetShape,
    pub width: u32,
    pub height: u32,
    pub found: bool,
    pub score: f64,
    #[serde(default)]
    pub bounds: Option<BoundingRect>,
    /// Inches.
    #[serde(default)]
    pub distance: Option<f64>,
    /// `[horizontal, vertical]` in degrees.
    #[serde(default)]
    pub angles_deg: Option<[f64; 2]>,
    pub contour_points: usize,
    #[serde(default)]
    pub error: Option<String>,
}

impl DetectionReport {
    pub fn new(image_path: impl Into<String>, target: TargetShape, width: u32, height: u32) -> Self {
        Self {
            image_path: image_path.into(),
            target,
            width,
            height,
            found: false,
            score: 0.0,
            bounds: None,
            distance: None,
            angles_deg: None,
            contour_points: 0,
            error: None,
        }
    }

    /// Populate the report from a pipeline result; `None` marks "not found".
    pub fn set_estimate(&mut self, estimate: Option<&TargetEstimate>) {
        match estimate {
            Some(est) => {
                self.found = true;
                self.score = est.scored.score;
                self.bounds = Some(est.bounds);
                self.distance = Some(est.distance);
                self.angles_deg = est.angles.map(|a| {
                    let (h, v) = a.to_degrees();
                    [h, v]
                });
                self.contour_points = est.scored.contour.len();
                self.error = None;
            }
            None => {
                self.found = false;
                self.error = Some(format!("no {} found", self.target));
            }
        }
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
