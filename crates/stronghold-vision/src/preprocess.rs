//! Frame → binary edge map.
//!
//! HSV conversion → Gaussian blur → range mask → erosion → box blur →
//! Canny. The two target shapes have different optical signatures, so each
//! has its own [`PreprocessParams`] preset.

use image::{GrayImage, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::{box_filter, gaussian_blur_f32};
use imageproc::morphology::erode;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::color::{rgb_to_hsv, ColorThresholds, HsvRange};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Tunables of the preprocessing stage.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreprocessParams {
    /// HSV range kept by the mask.
    pub filter: HsvRange,
    /// Sigma of the Gaussian blur applied to the HSV image; 0 disables it.
    pub blur_sigma: f32,
    /// Erosion radius under the L∞ norm (radius 2 == 5×5 square kernel).
    pub erode_radius: u8,
    /// Box blur radius (radius 1 == 3×3 kernel); 0 disables it.
    pub box_radius: u32,
    /// Lower Canny hysteresis threshold.
    pub canny_low: f32,
    /// Upper Canny threshold is `canny_low + canny_span`.
    pub canny_span: f32,
}

const BLUR_SIGMA: f32 = 2.5;
const CANNY_LOW: f32 = 10.0;
const CANNY_SPAN: f32 = 10.0;

impl PreprocessParams {
    /// Goal preset: hue/value filter, small erosion, tight blur.
    pub fn goal(thresholds: &ColorThresholds) -> Self {
        Self {
            filter: thresholds.goal_range(),
            blur_sigma: BLUR_SIGMA,
            erode_radius: 2,
            box_radius: 1,
            canny_low: CANNY_LOW,
            canny_span: CANNY_SPAN,
        }
    }

    /// Boulder preset: bright, desaturated pixels; larger erosion and blur.
    pub fn boulder() -> Self {
        Self {
            filter: HsvRange::new([0, 0, 90], [180, 35, 255]),
            blur_sigma: BLUR_SIGMA,
            erode_radius: 3,
            box_radius: 4,
            canny_low: CANNY_LOW,
            canny_span: CANNY_SPAN,
        }
    }

    pub fn canny_high(&self) -> f32 {
        self.canny_low + self.canny_span
    }
}

/// Every intermediate image of one preprocessing run.
#[derive(Clone, Debug)]
pub struct PreprocessStages {
    pub hsv: RgbImage,
    pub mask: GrayImage,
    pub eroded: GrayImage,
    pub smoothed: GrayImage,
    pub edges: GrayImage,
}

/// Run the stage and return only the edge map.
pub fn preprocess(frame: &RgbImage, params: &PreprocessParams) -> GrayImage {
    preprocess_stages(frame, params).edges
}

/// Run the stage keeping every intermediate image (for stage dumps).
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(frame, params), fields(width = frame.width(), height = frame.height()))
)]
pub fn preprocess_stages(frame: &RgbImage, params: &PreprocessParams) -> PreprocessStages {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        let blank = GrayImage::new(width, height);
        return PreprocessStages {
            hsv: RgbImage::new(width, height),
            mask: blank.clone(),
            eroded: blank.clone(),
            smoothed: blank.clone(),
            edges: blank,
        };
    }

    let mut hsv = rgb_to_hsv(frame);
    if params.blur_sigma > 0.0 {
        hsv = gaussian_blur_f32(&hsv, params.blur_sigma);
    }

    let mask = params.filter.mask(&hsv);
    let eroded = if params.erode_radius > 0 {
        erode(&mask, Norm::LInf, params.erode_radius)
    } else {
        mask.clone()
    };
    let smoothed = if params.box_radius > 0 {
        box_filter(&eroded, params.box_radius, params.box_radius)
    } else {
        eroded.clone()
    };
    let edges = canny(&smoothed, params.canny_low, params.canny_high());

    debug!(
        "preprocess {}x{}: {} mask px, {} after erosion, {} edge px",
        width,
        height,
        count_set(&mask),
        count_set(&eroded),
        count_set(&edges)
    );

    PreprocessStages {
        hsv,
        mask,
        eroded,
        smoothed,
        edges,
    }
}

fn count_set(img: &GrayImage) -> usize {
    img.as_raw().iter().filter(|&&v| v > 0).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn frame_with_block(color: [u8; 3]) -> RgbImage {
        let mut frame = RgbImage::new(80, 60);
        for y in 15..45 {
            for x in 20..60 {
                frame.put_pixel(x, y, Rgb(color));
            }
        }
        frame
    }

    #[test]
    fn edges_outline_a_matching_block() {
        let frame = frame_with_block([0, 255, 170]);
        let params = PreprocessParams::goal(&ColorThresholds::default());
        let stages = preprocess_stages(&frame, &params);

        assert_eq!(stages.edges.dimensions(), (80, 60));
        assert_eq!(stages.mask.get_pixel(40, 30).0, [255]);
        assert_eq!(stages.mask.get_pixel(2, 2).0, [0]);
        assert!(count_set(&stages.eroded) < count_set(&stages.mask));
        // the block interior is flat, only its border produces edges
        assert_eq!(stages.edges.get_pixel(40, 30).0, [0]);
        assert!(count_set(&stages.edges) > 0);
    }

    #[test]
    fn non_matching_color_gives_blank_edges() {
        let frame = frame_with_block([255, 30, 30]);
        let edges = preprocess(&frame, &PreprocessParams::goal(&ColorThresholds::default()));
        assert_eq!(count_set(&edges), 0);
    }

    #[test]
    fn boulder_preset_keeps_grey_white() {
        let frame = frame_with_block([220, 220, 215]);
        let stages = preprocess_stages(&frame, &PreprocessParams::boulder());
        assert_eq!(stages.mask.get_pixel(40, 30).0, [255]);
        assert!(count_set(&stages.edges) > 0);
    }

    #[test]
    fn empty_frame_is_guarded() {
        let edges = preprocess(&RgbImage::new(0, 0), &PreprocessParams::boulder());
        assert_eq!(edges.dimensions(), (0, 0));
    }

    #[test]
    fn canny_high_is_low_plus_span() {
        let p = PreprocessParams::boulder();
        assert_eq!(p.canny_high(), 20.0);
    }
}
