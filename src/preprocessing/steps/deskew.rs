use crate::error::OcrError;
use image::{GrayImage, Luma};
use imageproc::geometric_transformations::{warp_with, Interpolation};
use imageproc::geometry::min_area_rect;
use imageproc::point::Point;

/// Deskew image by measuring the tilt of its foreground and rotating it back.
///
/// Returns the corrected image and the rotation applied in degrees, or `None`
/// when the image was left untouched (no foreground, or tilt within
/// `deadband_degrees`).
pub fn apply(image: GrayImage, deadband_degrees: f32) -> Result<(GrayImage, Option<f32>), OcrError> {
    let Some(angle) = detect_skew_angle(&image) else {
        return Ok((image, None));
    };

    if angle.abs() <= deadband_degrees {
        return Ok((image, None));
    }

    tracing::debug!("Deskewing by {:.2} degrees", angle);
    Ok((rotate_about_center(&image, angle), Some(angle)))
}

/// Detect skew angle in degrees from the minimum-area rectangle enclosing all
/// non-zero pixels. Result lies in [-45, 45).
pub fn detect_skew_angle(img: &GrayImage) -> Option<f32> {
    let outline = foreground_outline(img);
    if outline.is_empty() {
        return None;
    }

    let corners = min_area_rect(&outline);
    Some(correct_angle(rect_angle(&corners)))
}

/// Leftmost and rightmost foreground pixel of every row.
///
/// Every foreground pixel lies between the two extremes of its row, so these
/// points span the same convex hull as the full foreground set.
fn foreground_outline(img: &GrayImage) -> Vec<Point<i32>> {
    let (width, height) = img.dimensions();
    let mut points = Vec::new();

    for y in 0..height {
        let mut row = (0..width).filter(|&x| img.get_pixel(x, y).0[0] > 0);
        let Some(first) = row.next() else {
            continue;
        };
        let last = row.last().unwrap_or(first);

        points.push(Point::new(first as i32, y as i32));
        if last != first {
            points.push(Point::new(last as i32, y as i32));
        }
    }

    points
}

/// Angle of the rectangle's sides, folded into [-90, 0).
///
/// The sides of a rectangle are 90 degrees apart, so the angle is only
/// meaningful modulo 90.
fn rect_angle(corners: &[Point<i32>; 4]) -> f32 {
    let edge = |a: Point<i32>, b: Point<i32>| ((b.x - a.x) as f32, (b.y - a.y) as f32);

    let (mut dx, mut dy) = edge(corners[0], corners[1]);
    if dx == 0.0 && dy == 0.0 {
        (dx, dy) = edge(corners[1], corners[2]);
    }

    let angle = dy.atan2(dx).to_degrees();
    angle.rem_euclid(90.0) - 90.0
}

/// Map an angle in [-90, 0) to the smallest equivalent tilt
fn correct_angle(angle: f32) -> f32 {
    if angle < -45.0 {
        90.0 + angle
    } else {
        angle
    }
}

/// Rotate about the image centre so that an edge at `angle_degrees` becomes
/// horizontal. Keeps the canvas size; pixels sampled from outside the image
/// replicate the nearest edge pixel.
fn rotate_about_center(img: &GrayImage, angle_degrees: f32) -> GrayImage {
    let (width, height) = img.dimensions();
    let cx = (width / 2) as f32;
    let cy = (height / 2) as f32;
    let max_x = width.saturating_sub(1) as f32;
    let max_y = height.saturating_sub(1) as f32;
    let (sin, cos) = angle_degrees.to_radians().sin_cos();

    warp_with(
        img,
        move |x, y| {
            let dx = x - cx;
            let dy = y - cy;
            let src_x = cx + dx * cos - dy * sin;
            let src_y = cy + dx * sin + dy * cos;
            (src_x.clamp(0.0, max_x), src_y.clamp(0.0, max_y))
        },
        Interpolation::Bicubic,
        Luma([255u8]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Binarized page: white background with black horizontal "text" bars
    fn straight_page() -> GrayImage {
        let mut img = GrayImage::from_pixel(120, 80, Luma([255]));
        for y in [20u32, 21, 22, 40, 41, 42, 60, 61] {
            for x in 10..110 {
                img.put_pixel(x, y, Luma([0]));
            }
        }
        img
    }

    /// Black canvas with a white bar tilted by `degrees`
    fn tilted_bar(degrees: f32) -> GrayImage {
        let mut img = GrayImage::new(200, 200);
        let slope = degrees.to_radians().tan();
        for x in 20..180u32 {
            let center = 100.0 + (x as f32 - 100.0) * slope;
            for dy in -3..=3 {
                let y = (center.round() as i32 + dy) as u32;
                img.put_pixel(x, y, Luma([255]));
            }
        }
        img
    }

    #[test]
    fn test_deskew_detects_zero_angle_for_straight_image() {
        let angle = detect_skew_angle(&straight_page()).unwrap();
        assert!(angle.abs() < 0.1, "Expected zero angle, got {}", angle);
    }

    #[test]
    fn test_deskew_leaves_straight_image_untouched() {
        let img = straight_page();
        let (result, rotation) = apply(img.clone(), 0.1).unwrap();
        assert_eq!(rotation, None);
        assert_eq!(result, img);
    }

    #[test]
    fn test_deskew_skips_empty_image() {
        let img = GrayImage::new(100, 50);
        assert_eq!(detect_skew_angle(&img), None);

        let (result, rotation) = apply(img, 0.1).unwrap();
        assert_eq!(rotation, None);
        assert_eq!(result.dimensions(), (100, 50));
    }

    #[test]
    fn test_deskew_measures_tilted_foreground() {
        for degrees in [8.0f32, -8.0] {
            let angle = detect_skew_angle(&tilted_bar(degrees)).unwrap();
            assert!(
                (angle - degrees).abs() < 1.5,
                "Expected about {} degrees, got {}",
                degrees,
                angle
            );
        }
    }

    #[test]
    fn test_deskew_rotation_straightens_and_preserves_dimensions() {
        let (result, rotation) = apply(tilted_bar(8.0), 0.1).unwrap();
        assert!(rotation.is_some());
        assert_eq!(result.dimensions(), (200, 200));

        let residual = detect_skew_angle(&result).unwrap();
        assert!(residual.abs() < 2.0, "Residual tilt {} degrees", residual);
    }

    #[test]
    fn test_angle_correction_folds_rectangle_convention() {
        assert_eq!(correct_angle(-90.0), 0.0);
        assert_eq!(correct_angle(-80.0), 10.0);
        assert_eq!(correct_angle(-10.0), -10.0);
        assert_eq!(correct_angle(-45.0), -45.0);
    }

    #[test]
    fn test_rect_angle_of_axis_aligned_rectangle() {
        let corners = [
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 5),
            Point::new(0, 5),
        ];
        assert_eq!(correct_angle(rect_angle(&corners)), 0.0);
    }
}
