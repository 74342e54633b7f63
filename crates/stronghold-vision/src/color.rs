//! HSV conversion, channel-range masks and the tunable color thresholds.
//!
//! HSV follows the 8-bit convention common to camera tooling: hue is halved
//! into `[0, 180)` so it fits a byte, saturation and value span `[0, 255]`.
//! HSV images are stored in an `RgbImage` with channels `(H, S, V)`.

use image::{GrayImage, Luma, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

/// Largest 8-bit hue value.
pub const HUE_MAX: u8 = 179;

/// Convert one RGB pixel to 8-bit `(H, S, V)`.
pub fn rgb_to_hsv_pixel([r, g, b]: [u8; 3]) -> [u8; 3] {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let v = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let diff = v - min;

    let s = if v > 0.0 { 255.0 * diff / v } else { 0.0 };

    let h_deg = if diff == 0.0 {
        0.0
    } else if v == rf {
        60.0 * (gf - bf) / diff
    } else if v == gf {
        120.0 + 60.0 * (bf - rf) / diff
    } else {
        240.0 + 60.0 * (rf - gf) / diff
    };
    let h_deg = if h_deg < 0.0 { h_deg + 360.0 } else { h_deg };

    let mut h = (h_deg / 2.0).round() as u16;
    if h >= 180 {
        h -= 180;
    }

    [h as u8, s.round() as u8, v as u8]
}

/// Convert an RGB frame to an HSV image (channels H, S, V).
pub fn rgb_to_hsv(frame: &RgbImage) -> RgbImage {
    let mut out = RgbImage::new(frame.width(), frame.height());
    for (src, dst) in frame.pixels().zip(out.pixels_mut()) {
        *dst = Rgb(rgb_to_hsv_pixel(src.0));
    }
    out
}

/// Inclusive per-channel bounds on an HSV image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    pub fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| self.lower[c] <= hsv[c] && hsv[c] <= self.upper[c])
    }

    /// Binary mask: 255 where the pixel lies inside the range, 0 elsewhere.
    pub fn mask(&self, hsv: &RgbImage) -> GrayImage {
        let mut mask = GrayImage::new(hsv.width(), hsv.height());
        for (src, dst) in hsv.pixels().zip(mask.pixels_mut()) {
            *dst = Luma([if self.contains(src.0) { 255 } else { 0 }]);
        }
        mask
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ThresholdError {
    #[error("{channel} range [{min}, {max}] exceeds the channel maximum {limit}")]
    OutOfRange {
        channel: &'static str,
        min: u8,
        max: u8,
        limit: u8,
    },
    #[error("{channel} range is inverted (min {min} > max {max})")]
    Inverted {
        channel: &'static str,
        min: u8,
        max: u8,
    },
}

/// Hue and value bounds of the goal filter.
///
/// These are the knobs a tuning UI adjusts while the pipeline runs; they are
/// passed into preprocessing explicitly, so whoever mutates them owns the
/// synchronization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorThresholds {
    /// `[min, max]` within `[0, 179]`.
    pub hue: [u8; 2],
    /// `[min, max]` within `[0, 255]`.
    pub value: [u8; 2],
}

impl Default for ColorThresholds {
    fn default() -> Self {
        // Ring-light green; the reference image peaks around hue 89.
        Self {
            hue: [70, 100],
            value: [128, 255],
        }
    }
}

impl ColorThresholds {
    pub fn set_hue(&mut self, min: u8, max: u8) -> Result<(), ThresholdError> {
        check_range("hue", min, max, HUE_MAX)?;
        self.hue = [min, max];
        Ok(())
    }

    pub fn set_value(&mut self, min: u8, max: u8) -> Result<(), ThresholdError> {
        check_range("value", min, max, u8::MAX)?;
        self.value = [min, max];
        Ok(())
    }

    /// Check a configuration that was built field-by-field (e.g. from JSON).
    pub fn validate(&self) -> Result<(), ThresholdError> {
        check_range("hue", self.hue[0], self.hue[1], HUE_MAX)?;
        check_range("value", self.value[0], self.value[1], u8::MAX)
    }

    /// Full HSV range for the goal filter: any saturation.
    pub fn goal_range(&self) -> HsvRange {
        HsvRange::new(
            [self.hue[0], 0, self.value[0]],
            [self.hue[1], 255, self.value[1]],
        )
    }
}

fn check_range(channel: &'static str, min: u8, max: u8, limit: u8) -> Result<(), ThresholdError> {
    if min > max {
        return Err(ThresholdError::Inverted { channel, min, max });
    }
    if max > limit {
        return Err(ThresholdError::OutOfRange {
            channel,
            min,
            max,
            limit,
        });
    }
    Ok(())
}
