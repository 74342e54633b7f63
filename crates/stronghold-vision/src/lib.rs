//! Goal and boulder detection for FIRST Stronghold field elements.
//!
//! Frames go through a fixed chain:
//!
//! 1. [`preprocess`]: HSV thresholding, erosion and smoothing into a binary
//!    edge map, with a preset per [`TargetShape`].
//! 2. [`extract_contours`] + [`score_contours`]: every border is measured and
//!    scored against the shape's [`ShapeProfile`]; the best one wins.
//! 3. [`CameraModel`]: range from the apparent width, bearing from the
//!    contour position.
//!
//! [`TargetPipeline`] wires these together and [`VisionConfig`] carries every
//! tunable as JSON.
//!
//! ```no_run
//! use stronghold_vision::{goal_pipeline_full, VisionConfig};
//!
//! let frame = image::open("frame.png").unwrap().to_rgb8();
//! let distance = goal_pipeline_full(&frame, &VisionConfig::default());
//! println!("goal at {distance:.1} in");
//! ```

mod color;
mod contours;
mod geometry;
mod io;
mod pipeline;
mod preprocess;
mod render;
mod scoring;

pub use color::{rgb_to_hsv, rgb_to_hsv_pixel, ColorThresholds, HsvRange, ThresholdError, HUE_MAX};
pub use contours::{extract_contours, ContourMeasurements};
pub use geometry::{distance_from_extent, CameraModel, OffCenter};
pub use io::{ConfigError, DetectionReport, VisionConfig};
pub use pipeline::{goal_pipeline_full, TargetEstimate, TargetPipeline, NO_TARGET_DISTANCE};
pub use preprocess::{preprocess, preprocess_stages, PreprocessParams, PreprocessStages};
pub use render::{draw_contour_mut, render_contour};
pub use scoring::{
    score_candidates, score_contours, ScoreRule, ShapeProfile, TargetShape, UnknownShape,
};

pub use stronghold_core::{BoundingRect, Contour, Moments, ScoredContour, Size};
