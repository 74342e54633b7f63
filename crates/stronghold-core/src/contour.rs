use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::Moments;

/// Width/height pair in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Center of a frame of this size, in pixel units.
    pub fn center(&self) -> Point2<f64> {
        Point2::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }
}

/// Axis-aligned bounding rectangle of a point set.
///
/// `width`/`height` count pixels inclusively, so a single point has a
/// 1×1 rectangle. `right()`/`bottom()` are exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingRect {
    /// Smallest rectangle containing every point; `None` for an empty slice.
    pub fn of_points(points: &[Point2<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y) = (first.x, first.y);
        let (mut max_x, mut max_y) = (first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        })
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn size(&self) -> Size {
        Size::new(self.width.max(0) as u32, self.height.max(0) as u32)
    }
}

/// Closed boundary traced around a detected region.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<Point2<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point2<i32>>) -> Self {
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Enclosed area (shoelace formula), always non-negative.
    pub fn area(&self) -> f64 {
        self.moments().m00
    }

    /// Length of the closed polyline, including the closing segment.
    pub fn perimeter(&self) -> f64 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }
        let mut prev = self.points[n - 1];
        let mut total = 0.0;
        for &p in &self.points {
            let dx = (p.x - prev.x) as f64;
            let dy = (p.y - prev.y) as f64;
            total += dx.hypot(dy);
            prev = p;
        }
        total
    }

    pub fn bounding_rect(&self) -> Option<BoundingRect> {
        BoundingRect::of_points(&self.points)
    }

    pub fn moments(&self) -> Moments {
        Moments::of_polygon(&self.points)
    }
}

impl FromIterator<Point2<i32>> for Contour {
    fn from_iter<I: IntoIterator<Item = Point2<i32>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A contour paired with its fitness against a target-shape profile.
///
/// The "nothing found" value is `score == 0` with an empty contour; see
/// [`ScoredContour::none`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoredContour {
    pub score: f64,
    pub contour: Contour,
}

impl ScoredContour {
    pub fn new(score: f64, contour: Contour) -> Self {
        Self { score, contour }
    }

    /// The empty sentinel returned when no contour passes the filters.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_found(&self) -> bool {
        !self.contour.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(x0: i32, y0: i32, side: i32) -> Contour {
        Contour::new(vec![
            Point2::new(x0, y0),
            Point2::new(x0 + side, y0),
            Point2::new(x0 + side, y0 + side),
            Point2::new(x0, y0 + side),
        ])
    }

    #[test]
    fn bounding_rect_is_inclusive() {
        let c = square(5, 7, 10);
        let r = c.bounding_rect().expect("non-empty");
        assert_eq!(
            r,
            BoundingRect {
                x: 5,
                y: 7,
                width: 11,
                height: 11
            }
        );
        assert_eq!(r.right(), 16);
        assert_eq!(r.bottom(), 18);
        assert_eq!(r.size(), Size::new(11, 11));
        assert!(Contour::default().bounding_rect().is_none());
    }

    #[test]
    fn area_and_perimeter_of_square() {
        let c = square(0, 0, 10);
        assert_relative_eq!(c.area(), 100.0);
        assert_relative_eq!(c.perimeter(), 40.0);
        assert_relative_eq!(Contour::default().perimeter(), 0.0);
    }

    #[test]
    fn sentinel_is_not_found() {
        let none = ScoredContour::none();
        assert_eq!(none.score, 0.0);
        assert!(!none.is_found());
        assert!(ScoredContour::new(42.0, square(0, 0, 3)).is_found());
    }

    #[test]
    fn contour_serializes_as_point_pairs() {
        let c: Contour = [Point2::new(1, 2), Point2::new(3, 4)].into_iter().collect();
        let json = serde_json::to_string(&c).expect("serialize");
        assert_eq!(json, r#"{"points":[[1,2],[3,4]]}"#);
    }
}
