//! End-to-end target pipeline: frame → best contour → range and bearing.

use image::{GrayImage, RgbImage};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use stronghold_core::{BoundingRect, ScoredContour, Size};

use crate::geometry::{CameraModel, OffCenter};
use crate::io::VisionConfig;
use crate::preprocess::{preprocess, preprocess_stages, PreprocessParams, PreprocessStages};
use crate::scoring::{score_contours, ShapeProfile, TargetShape};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Distance reported by [`goal_pipeline_full`] when no goal was found.
pub const NO_TARGET_DISTANCE: f64 = -1.0;

/// What the pipeline knows about the best target in a frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetEstimate {
    pub shape: TargetShape,
    pub scored: ScoredContour,
    pub bounds: BoundingRect,
    /// Inches, from the bounding-box width.
    pub distance: f64,
    /// `None` when the contour has zero area.
    pub angles: Option<OffCenter>,
}

/// Preprocess, score and measure frames for one target shape.
#[derive(Clone, Debug)]
pub struct TargetPipeline {
    pub shape: TargetShape,
    pub preprocess: PreprocessParams,
    pub profile: ShapeProfile,
    pub camera: CameraModel,
    /// Log every candidate's per-rule scores.
    pub diagnostics: bool,
}

impl TargetPipeline {
    pub fn new(shape: TargetShape, config: &VisionConfig) -> Self {
        Self {
            shape,
            preprocess: config.preprocess_params(shape),
            profile: config.profile(shape).clone(),
            camera: config.camera_for(shape),
            diagnostics: false,
        }
    }

    pub fn goal(config: &VisionConfig) -> Self {
        Self::new(TargetShape::Goal, config)
    }

    pub fn boulder(config: &VisionConfig) -> Self {
        Self::new(TargetShape::Boulder, config)
    }

    pub fn with_diagnostics(mut self, diagnostics: bool) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn edges(&self, frame: &RgbImage) -> GrayImage {
        preprocess(frame, &self.preprocess)
    }

    pub fn stages(&self, frame: &RgbImage) -> PreprocessStages {
        preprocess_stages(frame, &self.preprocess)
    }

    /// Best-scoring contour, or [`ScoredContour::none`].
    pub fn best_contour(&self, frame: &RgbImage) -> ScoredContour {
        score_contours(&self.edges(frame), &self.profile, self.diagnostics)
    }

    /// Run the full pipeline on one frame.
    ///
    /// `None` when nothing passes the profile's area threshold.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, frame), fields(shape = %self.shape))
    )]
    pub fn estimate(&self, frame: &RgbImage) -> Option<TargetEstimate> {
        let scored = self.best_contour(frame);
        if !scored.is_found() {
            debug!("no {} in {}x{} frame", self.shape, frame.width(), frame.height());
            return None;
        }
        let bounds = scored.contour.bounding_rect()?;
        let frame_size = Size::new(frame.width(), frame.height());

        let distance = self.camera.distance(bounds.size(), frame_size);
        let angles = self
            .camera
            .relative_angle_off_center(&scored, frame_size, distance);

        if self.diagnostics {
            info!(
                "{}: score {:.2}, distance {:.1} in, bounds {}x{}@({},{})",
                self.shape, scored.score, distance, bounds.width, bounds.height, bounds.x, bounds.y
            );
        }

        Some(TargetEstimate {
            shape: self.shape,
            scored,
            bounds,
            distance,
            angles,
        })
    }
}

/// Distance to the goal in `frame`, or [`NO_TARGET_DISTANCE`].
pub fn goal_pipeline_full(frame: &RgbImage, config: &VisionConfig) -> f64 {
    TargetPipeline::goal(config)
        .estimate(frame)
        .map_or(NO_TARGET_DISTANCE, |est| est.distance)
}
