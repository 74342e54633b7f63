//! Pixel geometry → range and bearing.
//!
//! Pinhole relations between a target's known physical size, its apparent
//! size in pixels and the camera's field of view.

use serde::{Deserialize, Serialize};
use stronghold_core::{ScoredContour, Size};

/// Field of view (radians) and physical target size (inches).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraModel {
    pub fov_horiz: f64,
    pub fov_vert: f64,
    pub target_width: f64,
    pub target_height: f64,
}

impl Default for CameraModel {
    fn default() -> Self {
        Self {
            fov_horiz: 0.776417,
            fov_vert: 0.551077,
            target_width: 20.0,
            target_height: 14.0,
        }
    }
}

/// Angles of a target off the optical axis, radians.
///
/// Positive horizontal means left of center, positive vertical means above.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OffCenter {
    pub horizontal: f64,
    pub vertical: f64,
}

impl OffCenter {
    pub fn to_degrees(self) -> (f64, f64) {
        (self.horizontal.to_degrees(), self.vertical.to_degrees())
    }
}

/// Distance to a target of length `target_len` spanning `observed_px` of
/// a `frame_px` wide image, given the field of view along that axis.
pub fn distance_from_extent(observed_px: f64, target_len: f64, frame_px: f64, fov: f64) -> f64 {
    target_len * frame_px / (observed_px * fov.tan())
}

impl CameraModel {
    /// Distance (inches) from the target's apparent width.
    pub fn distance(&self, observed: Size, frame: Size) -> f64 {
        distance_from_extent(
            observed.width as f64,
            self.target_width,
            frame.width as f64,
            self.fov_horiz,
        )
    }

    /// Horizontal field of view implied by a target seen at a known distance.
    pub fn fov_angle_horiz(&self, observed: Size, frame: Size, distance: f64) -> f64 {
        (self.target_width * frame.width as f64).atan2(observed.width as f64 * distance)
    }

    /// Vertical field of view implied by a target seen at a known distance.
    pub fn fov_angle_vert(&self, observed: Size, frame: Size, distance: f64) -> f64 {
        (self.target_height * frame.height as f64).atan2(observed.height as f64 * distance)
    }

    /// Bearing of a scored contour relative to the frame center.
    ///
    /// The horizontal offset is measured from the contour centroid, the
    /// vertical one from the bottom edge of its bounding box; the sign of both
    /// follows the centroid. `None` for an empty or zero-area contour.
    pub fn relative_angle_off_center(
        &self,
        object: &ScoredContour,
        frame: Size,
        distance: f64,
    ) -> Option<OffCenter> {
        let centroid = object.contour.moments().centroid()?;
        let bounds = object.contour.bounding_rect()?;
        let center = frame.center();

        let mut horizontal = ((center.x - centroid.x).abs() / distance).asin();
        let mut vertical = ((center.y - bounds.bottom() as f64).abs() / distance).asin();

        if centroid.x > center.x {
            horizontal = -horizontal;
        }
        if centroid.y > center.y {
            vertical = -vertical;
        }

        Some(OffCenter {
            horizontal,
            vertical,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point2;
    use stronghold_core::Contour;

    fn square_at(cx: i32, cy: i32, half: i32) -> ScoredContour {
        ScoredContour::new(
            90.0,
            Contour::new(vec![
                Point2::new(cx - half, cy - half),
                Point2::new(cx + half, cy - half),
                Point2::new(cx + half, cy + half),
                Point2::new(cx - half, cy + half),
            ]),
        )
    }

    #[test]
    fn doubling_width_halves_distance() {
        let cam = CameraModel::default();
        let frame = Size::new(640, 480);
        let near = cam.distance(Size::new(200, 120), frame);
        let far = cam.distance(Size::new(100, 60), frame);
        assert_relative_eq!(far, 2.0 * near, epsilon = 1e-9);

        let mut last = f64::INFINITY;
        for w in [10, 20, 50, 100, 300, 640] {
            let d = cam.distance(Size::new(w, 10), frame);
            assert!(d < last);
            last = d;
        }
    }

    #[test]
    fn distance_matches_closed_form() {
        let cam = CameraModel::default();
        let d = cam.distance(Size::new(160, 96), Size::new(320, 240));
        assert_relative_eq!(d, 20.0 * 320.0 / (160.0 * 0.776417_f64.tan()), epsilon = 1e-9);
    }

    #[test]
    fn fov_angles_invert_distance() {
        let cam = CameraModel::default();
        let frame = Size::new(640, 480);
        let observed = Size::new(128, 90);

        let d = cam.distance(observed, frame);
        assert_relative_eq!(cam.fov_angle_horiz(observed, frame, d), cam.fov_horiz, epsilon = 1e-12);

        let d_vert = distance_from_extent(90.0, cam.target_height, 480.0, cam.fov_vert);
        assert_relative_eq!(
            cam.fov_angle_vert(observed, frame, d_vert),
            cam.fov_vert,
            epsilon = 1e-12
        );
    }

    #[test]
    fn off_center_signs_follow_the_centroid() {
        let cam = CameraModel::default();
        let frame = Size::new(320, 240);

        let centered = cam
            .relative_angle_off_center(&square_at(160, 110, 10), frame, 200.0)
            .expect("non-degenerate");
        assert_relative_eq!(centered.horizontal, 0.0, epsilon = 1e-12);

        let right_low = cam
            .relative_angle_off_center(&square_at(260, 200, 10), frame, 200.0)
            .expect("non-degenerate");
        assert!(right_low.horizontal < 0.0);
        assert!(right_low.vertical < 0.0);
        assert_relative_eq!(right_low.horizontal, -(100.0_f64 / 200.0).asin(), epsilon = 1e-9);
        // bottom edge of the inclusive box is y = 211
        assert_relative_eq!(right_low.vertical, -(91.0_f64 / 200.0).asin(), epsilon = 1e-9);

        let left_high = cam
            .relative_angle_off_center(&square_at(60, 40, 10), frame, 200.0)
            .expect("non-degenerate");
        assert!(left_high.horizontal > 0.0);
        assert!(left_high.vertical > 0.0);
    }

    #[test]
    fn degenerate_contour_has_no_bearing() {
        let cam = CameraModel::default();
        let frame = Size::new(320, 240);
        assert!(cam
            .relative_angle_off_center(&ScoredContour::none(), frame, 100.0)
            .is_none());
    }
}
