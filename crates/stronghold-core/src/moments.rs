//! Polygon image moments up to second order.
//!
//! Moments are integrated over the polygon interior with Green's theorem,
//! so a contour traced along pixel centers gives the same values a raster
//! integration over the enclosed region would (up to the half-pixel border).
//! Orientation of the vertex order does not matter: clockwise polygons are
//! flipped so `m00` is always the non-negative area.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Spatial (`m*`), central (`mu*`) and normalized central (`nu*`) moments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
    pub m20: f64,
    pub m11: f64,
    pub m02: f64,
    pub mu20: f64,
    pub mu11: f64,
    pub mu02: f64,
    pub nu20: f64,
    pub nu11: f64,
    pub nu02: f64,
}

const AREA_EPS: f64 = f32::EPSILON as f64;

impl Moments {
    /// Moments of the closed polygon through `points`.
    ///
    /// Degenerate polygons (fewer than three points, or zero area) yield all
    /// zeros.
    pub fn of_polygon(points: &[Point2<i32>]) -> Self {
        if points.len() < 3 {
            return Self::default();
        }

        let mut a00 = 0.0;
        let mut a10 = 0.0;
        let mut a01 = 0.0;
        let mut a20 = 0.0;
        let mut a11 = 0.0;
        let mut a02 = 0.0;

        let last = points[points.len() - 1];
        let (mut xp, mut yp) = (last.x as f64, last.y as f64);
        for p in points {
            let (x, y) = (p.x as f64, p.y as f64);
            let cross = xp * y - x * yp;
            let sx = xp + x;
            let sy = yp + y;

            a00 += cross;
            a10 += cross * sx;
            a01 += cross * sy;
            a20 += cross * (xp * sx + x * x);
            a11 += cross * (xp * (sy + yp) + x * (sy + y));
            a02 += cross * (yp * sy + y * y);

            xp = x;
            yp = y;
        }

        if a00.abs() <= AREA_EPS {
            return Self::default();
        }

        let sign = a00.signum();
        let m00 = sign * a00 / 2.0;
        let m10 = sign * a10 / 6.0;
        let m01 = sign * a01 / 6.0;
        let m20 = sign * a20 / 12.0;
        let m11 = sign * a11 / 24.0;
        let m02 = sign * a02 / 12.0;

        let cx = m10 / m00;
        let cy = m01 / m00;
        let mu20 = m20 - m10 * cx;
        let mu11 = m11 - m10 * cy;
        let mu02 = m02 - m01 * cy;

        // second order: mu / m00^(1 + 2/2)
        let norm = 1.0 / (m00 * m00);

        Self {
            m00,
            m10,
            m01,
            m20,
            m11,
            m02,
            mu20,
            mu11,
            mu02,
            nu20: mu20 * norm,
            nu11: mu11 * norm,
            nu02: mu02 * norm,
        }
    }

    /// Centroid `(m10 / m00, m01 / m00)`, `None` for a zero-area polygon.
    pub fn centroid(&self) -> Option<Point2<f64>> {
        (self.m00 != 0.0).then(|| Point2::new(self.m10 / self.m00, self.m01 / self.m00))
    }

    /// Principal-axis orientation in degrees, in `[-90, 90]`.
    ///
    /// Computed as `atan2(mu11, mu20 - mu02) * 90 / pi`, i.e. twice the usual
    /// half-angle, so a horizontal major axis reads 0 and a vertical one ±90.
    pub fn orientation_deg(&self) -> f64 {
        self.mu11.atan2(self.mu20 - self.mu02) * 90.0 / std::f64::consts::PI
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(x0: i32, y0: i32, w: i32, h: i32) -> Vec<Point2<i32>> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x0 + w, y0),
            Point2::new(x0 + w, y0 + h),
            Point2::new(x0, y0 + h),
        ]
    }

    #[test]
    fn rectangle_matches_closed_form() {
        let (w, h) = (40.0, 10.0);
        let m = Moments::of_polygon(&rect(10, 20, 40, 10));

        assert_relative_eq!(m.m00, w * h);
        let c = m.centroid().expect("non-degenerate");
        assert_relative_eq!(c.x, 30.0);
        assert_relative_eq!(c.y, 25.0);

        assert_relative_eq!(m.mu20, h * w.powi(3) / 12.0, epsilon = 1e-6);
        assert_relative_eq!(m.mu02, w * h.powi(3) / 12.0, epsilon = 1e-6);
        assert_relative_eq!(m.mu11, 0.0, epsilon = 1e-6);
        assert_relative_eq!(m.nu02, h / (12.0 * w), epsilon = 1e-9);
    }

    #[test]
    fn vertex_order_does_not_change_sign() {
        let ccw = rect(0, 0, 8, 6);
        let mut cw = ccw.clone();
        cw.reverse();

        let a = Moments::of_polygon(&ccw);
        let b = Moments::of_polygon(&cw);
        assert_relative_eq!(a.m00, 48.0);
        assert_relative_eq!(a.m00, b.m00);
        assert_relative_eq!(a.mu02, b.mu02, epsilon = 1e-9);
    }

    #[test]
    fn orientation_of_axis_aligned_shapes() {
        let wide = Moments::of_polygon(&rect(0, 0, 30, 10));
        let tall = Moments::of_polygon(&rect(0, 0, 10, 30));
        assert_relative_eq!(wide.orientation_deg(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(tall.orientation_deg().abs(), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_polygons_are_zero() {
        let line = [Point2::new(0, 0), Point2::new(5, 5), Point2::new(10, 10)];
        let m = Moments::of_polygon(&line);
        assert_eq!(m, Moments::default());
        assert!(m.centroid().is_none());
        assert_eq!(Moments::of_polygon(&[]), Moments::default());
    }
}
