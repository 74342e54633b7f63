//! Contour extraction and per-contour measurements.

use image::GrayImage;
use imageproc::contours::find_contours;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use stronghold_core::{BoundingRect, Contour, Moments};

/// Trace every border in a binary edge map.
///
/// Suzuki–Abe border following; outer and hole borders are both returned
/// as a flat list, nesting is ignored.
pub fn extract_contours(edges: &GrayImage) -> Vec<Contour> {
    find_contours::<i32>(edges)
        .into_iter()
        .map(|c| {
            c.points
                .into_iter()
                .map(|p| Point2::new(p.x, p.y))
                .collect::<Contour>()
        })
        .collect()
}

/// Geometry of one contour used by the score rules.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContourMeasurements {
    pub area: f64,
    pub perimeter: f64,
    pub bounds: BoundingRect,
    pub moments: Moments,
}

impl ContourMeasurements {
    /// `None` for an empty contour.
    pub fn of(contour: &Contour) -> Option<Self> {
        let bounds = contour.bounding_rect()?;
        let moments = contour.moments();
        Some(Self {
            area: moments.m00,
            perimeter: contour.perimeter(),
            bounds,
            moments,
        })
    }

    /// Contour area over bounding-rectangle area.
    pub fn coverage(&self) -> f64 {
        self.area / self.bounds.area()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::Luma;

    #[test]
    fn blank_map_has_no_contours() {
        assert!(extract_contours(&GrayImage::new(16, 16)).is_empty());
    }

    #[test]
    fn filled_block_yields_its_border() {
        let mut img = GrayImage::new(40, 30);
        for y in 5..25 {
            for x in 10..30 {
                img.put_pixel(x, y, Luma([255]));
            }
        }
        let contours = extract_contours(&img);
        assert_eq!(contours.len(), 1);

        let m = ContourMeasurements::of(&contours[0]).expect("non-empty");
        assert_eq!(
            m.bounds,
            BoundingRect {
                x: 10,
                y: 5,
                width: 20,
                height: 20
            }
        );
        // border through pixel centers encloses (20-1)^2
        assert_relative_eq!(m.area, 361.0);
        assert_relative_eq!(m.perimeter, 76.0);
        assert_relative_eq!(m.coverage(), 361.0 / 400.0);
    }

    #[test]
    fn empty_contour_has_no_measurements() {
        assert!(ContourMeasurements::of(&Contour::default()).is_none());
    }
}
