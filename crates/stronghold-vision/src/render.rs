//! Debug rendering of detected contours.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use stronghold_core::{Contour, Size};

const OUTLINE: Rgb<u8> = Rgb([255, 255, 255]);

/// Draw `contour` as a closed white outline on a black canvas of `size`.
///
/// Points outside the canvas are clipped.
pub fn render_contour(size: Size, contour: &Contour) -> RgbImage {
    let mut canvas = RgbImage::new(size.width, size.height);
    draw_contour_mut(&mut canvas, contour, OUTLINE);
    canvas
}

/// Draw `contour` onto an existing image, e.g. the source frame.
pub fn draw_contour_mut(canvas: &mut RgbImage, contour: &Contour, color: Rgb<u8>) {
    let pts = &contour.points;
    match pts.len() {
        0 => {}
        1 => {
            let (x, y) = (pts[0].x, pts[0].y);
            if x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height() {
                canvas.put_pixel(x as u32, y as u32, color);
            }
        }
        n => {
            for i in 0..n {
                let a = pts[i];
                let b = pts[(i + 1) % n];
                draw_line_segment_mut(
                    canvas,
                    (a.x as f32, a.y as f32),
                    (b.x as f32, b.y as f32),
                    color,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    #[test]
    fn outline_is_closed_and_hollow() {
        let contour = Contour::new(vec![
            Point2::new(2, 2),
            Point2::new(12, 2),
            Point2::new(12, 8),
            Point2::new(2, 8),
        ]);
        let img = render_contour(Size::new(16, 12), &contour);
        assert_eq!(img.dimensions(), (16, 12));
        assert_eq!(img.get_pixel(7, 2), &OUTLINE);
        assert_eq!(img.get_pixel(2, 5), &OUTLINE);
        assert_eq!(img.get_pixel(7, 5), &Rgb([0, 0, 0]));
        assert_eq!(img.get_pixel(0, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn empty_contour_leaves_canvas_black() {
        let img = render_contour(Size::new(8, 8), &Contour::default());
        assert!(img.as_raw().iter().all(|&v| v == 0));
    }

    #[test]
    fn off_canvas_points_are_clipped() {
        let contour = Contour::new(vec![Point2::new(-5, -5), Point2::new(100, 100)]);
        let img = render_contour(Size::new(10, 10), &contour);
        assert_eq!(img.get_pixel(5, 5), &OUTLINE);

        let single = render_contour(Size::new(4, 4), &Contour::new(vec![Point2::new(9, 9)]));
        assert!(single.as_raw().iter().all(|&v| v == 0));
    }
}
