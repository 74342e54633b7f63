use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;
use log::{debug, info};

use crate::core::{Size, Trajectory};
use crate::vision::{
    render_contour, ConfigError, DetectionReport, PreprocessStages, TargetEstimate,
    TargetPipeline, TargetShape, VisionConfig,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the file-level helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("failed to read image {path}: {source}")]
    ReadImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write image {path}: {source}")]
    WriteImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image {0} is empty")]
    EmptyImage(PathBuf),

    #[error("trajectory {0} has no points")]
    EmptyTrajectory(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Load an image from disk as an RGB frame.
pub fn load_frame(path: impl AsRef<Path>) -> Result<RgbImage, DetectError> {
    let path = path.as_ref();
    let frame = image::open(path)
        .map_err(|source| DetectError::ReadImage {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgb8();
    if frame.width() == 0 || frame.height() == 0 {
        return Err(DetectError::EmptyImage(path.to_path_buf()));
    }
    Ok(frame)
}

/// Config from `path`, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<VisionConfig, DetectError> {
    match path {
        Some(p) => {
            debug!("loading vision config from {}", p.display());
            Ok(VisionConfig::load_json(p)?)
        }
        None => Ok(VisionConfig::default()),
    }
}

/// Run one shape's pipeline on an image file.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(config)))]
pub fn detect_file(
    path: &Path,
    shape: TargetShape,
    config: &VisionConfig,
    diagnostics: bool,
) -> Result<(DetectionReport, Option<TargetEstimate>), DetectError> {
    let frame = load_frame(path)?;
    Ok(detect_frame(
        &frame,
        &path.display().to_string(),
        shape,
        config,
        diagnostics,
    ))
}

/// Run one shape's pipeline on an already decoded frame. `image` only
/// labels the report.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip(frame, config)))]
pub fn detect_frame(
    frame: &RgbImage,
    image: &str,
    shape: TargetShape,
    config: &VisionConfig,
    diagnostics: bool,
) -> (DetectionReport, Option<TargetEstimate>) {
    let estimate = TargetPipeline::new(shape, config)
        .with_diagnostics(diagnostics)
        .estimate(frame);

    let mut report = DetectionReport::new(image, shape, frame.width(), frame.height());
    report.set_estimate(estimate.as_ref());
    (report, estimate)
}

fn write_error(path: &Path) -> impl FnOnce(image::ImageError) -> DetectError + '_ {
    move |source| DetectError::WriteImage {
        path: path.to_path_buf(),
        source,
    }
}

/// Write the winning contour as a white-on-black PNG; a blank canvas when
/// nothing was found.
pub fn write_overlay(
    path: &Path,
    frame: Size,
    estimate: Option<&TargetEstimate>,
) -> Result<(), DetectError> {
    let img = match estimate {
        Some(est) => render_contour(frame, &est.scored.contour),
        None => RgbImage::new(frame.width, frame.height),
    };
    img.save(path).map_err(write_error(path))?;
    info!("wrote overlay to {}", path.display());
    Ok(())
}

/// Dump every preprocessing stage as PNG into `dir`.
pub fn write_stages(dir: &Path, stages: &PreprocessStages) -> Result<Vec<PathBuf>, DetectError> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(5);
    let hsv_path = dir.join("hsv.png");
    stages.hsv.save(&hsv_path).map_err(write_error(&hsv_path))?;
    written.push(hsv_path);

    for (name, img) in [
        ("mask.png", &stages.mask),
        ("eroded.png", &stages.eroded),
        ("smoothed.png", &stages.smoothed),
        ("edges.png", &stages.edges),
    ] {
        let path = dir.join(name);
        img.save(&path).map_err(write_error(&path))?;
        written.push(path);
    }
    info!("wrote {} stage images to {}", written.len(), dir.display());
    Ok(written)
}

/// Read a trajectory from a JSON list of `{ "time": t, "position": [x, y] }`.
pub fn load_trajectory(path: impl AsRef<Path>) -> Result<Trajectory, DetectError> {
    let raw = fs::read_to_string(path.as_ref())?;
    let trajectory: Trajectory = serde_json::from_str(&raw)?;
    if trajectory.is_empty() {
        return Err(DetectError::EmptyTrajectory(path.as_ref().to_path_buf()));
    }
    Ok(trajectory)
}
